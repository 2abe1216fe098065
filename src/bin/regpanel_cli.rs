//! Command line front end for register panel configurations.
//!
//! Launch with `cargo run --features cli --bin regpanel_cli -- <command>`.

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The 'regpanel_cli' binary requires the 'cli' feature. \
Enable it with `cargo run --features cli --bin regpanel_cli`."
    );
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(feature = "cli")]
mod cli {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result, bail};
    use clap::{Parser, Subcommand, ValueEnum};
    use comfy_table::Table;

    use regpanel::loader::{self, Catalog};
    use regpanel::panel::codec::{self, AddressAdjust, Delimiter};
    use regpanel::panel::register::{Depiction, RegisterModel};
    use regpanel::panel::{ModuleBuild, ModulePanel, bits};

    #[derive(Parser)]
    #[command(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        about = "Register panel configuration tools",
        long_about = None
    )]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// List vendors, chips, and files under a configuration directory
        List {
            #[arg(value_name = "CONFIG_DIR")]
            dir: PathBuf,
        },
        /// Show the register tables of one module
        Show {
            #[arg(value_name = "FILE")]
            file: PathBuf,
            /// Module to display
            #[arg(long)]
            module: String,
            /// Limit output to one register key
            #[arg(long)]
            reg: Option<String>,
        },
        /// Load address-value text into a module, or emit text from it
        Convert {
            #[arg(value_name = "FILE")]
            file: PathBuf,
            /// Module to convert
            #[arg(long)]
            module: String,
            /// Address-value pairs to load; omit to emit text instead
            #[arg(long)]
            text: Option<String>,
            #[arg(long, value_enum, default_value = "braces")]
            delim: DelimiterArg,
            /// Address base adjustment, e.g. +0x1000 or -0x40
            #[arg(long)]
            base: Option<String>,
        },
    }

    #[derive(Clone, Copy, ValueEnum)]
    enum DelimiterArg {
        Braces,
        Brackets,
    }

    impl From<DelimiterArg> for Delimiter {
        fn from(arg: DelimiterArg) -> Self {
            match arg {
                DelimiterArg::Braces => Delimiter::Braces,
                DelimiterArg::Brackets => Delimiter::Brackets,
            }
        }
    }

    pub fn run() -> Result<()> {
        match Cli::parse().command {
            Commands::List { dir } => list(&dir),
            Commands::Show { file, module, reg } => show(&file, &module, reg.as_deref()),
            Commands::Convert {
                file,
                module,
                text,
                delim,
                base,
            } => convert(&file, &module, text.as_deref(), delim.into(), base.as_deref()),
        }
    }

    fn list(dir: &Path) -> Result<()> {
        let catalog = Catalog::scan(dir)
            .with_context(|| format!("scanning {}", dir.display()))?;
        for vendor in catalog.vendors() {
            println!("{}", vendor.name);
            for chip in &vendor.chips {
                println!("  {}", chip.name);
                for file in &chip.files {
                    println!("    {file}");
                }
            }
        }
        Ok(())
    }

    fn show(file: &Path, module: &str, reg: Option<&str>) -> Result<()> {
        let panel = build_panel(file, module)?;
        let mut shown = 0;
        for register in panel.registers() {
            if reg.is_some_and(|key| key != register.key()) {
                continue;
            }
            println!("register {}", register.key());
            println!("{}", register_table(register));
            shown += 1;
        }
        if shown == 0 {
            bail!("no register matched in module {module}");
        }
        Ok(())
    }

    fn convert(
        file: &Path,
        module: &str,
        text: Option<&str>,
        delimiter: Delimiter,
        base: Option<&str>,
    ) -> Result<()> {
        let mut panel = build_panel(file, module)?;
        let adjust = parse_base(base)?;
        match text {
            Some(text) => {
                let report = codec::apply_text(&mut panel, text, delimiter, adjust, &mut ());
                for diagnostic in &report.diagnostics {
                    eprintln!("{}", diagnostic.format_human());
                }
                if let Some(failure) = report.failure {
                    eprintln!("parse stopped: {failure}");
                }
                println!("loaded {} register(s)", report.applied);
                for register in panel.registers() {
                    println!("register {}", register.key());
                    println!("{}", register_table(register));
                }
            }
            None => println!("{}", codec::render_text(&panel, delimiter, adjust)),
        }
        Ok(())
    }

    fn build_panel(file: &Path, module: &str) -> Result<ModulePanel> {
        let doc = loader::load_document(file)
            .with_context(|| format!("loading {}", file.display()))?;
        let ModuleBuild { panel, diagnostics } = ModulePanel::build(&doc, module)?;
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic.format_human());
        }
        Ok(panel)
    }

    fn register_table(register: &RegisterModel) -> Table {
        let mut table = Table::new();
        table.set_header(["Bits", "Default", "Current", "Description"]);
        for slot in register.slots() {
            let descriptor = slot.descriptor();
            let range = descriptor.range();
            let default =
                bits::extract(register.default_value(), range.high(), range.low());
            let description = match slot.depiction() {
                Depiction::Label => descriptor.label_text().to_string(),
                Depiction::Digit => descriptor.title().unwrap_or_default().to_string(),
                Depiction::Choice { selected } => {
                    let label = selected
                        .and_then(|index| {
                            descriptor.enum_table().and_then(|t| t.label_at(index))
                        })
                        .unwrap_or("?");
                    format!("{}: {label}", descriptor.title().unwrap_or_default())
                }
            };
            table.add_row([
                range.to_string(),
                format!("{default:#x}"),
                format!("{:#x}", slot.value()),
                description,
            ]);
        }
        table
    }

    fn parse_base(raw: Option<&str>) -> Result<AddressAdjust> {
        let Some(raw) = raw else {
            return Ok(AddressAdjust::Ignore);
        };
        if !raw.starts_with(['+', '-']) {
            bail!("address base must start with '+' or '-'");
        }
        let (op, digits) = raw.split_at(1);
        let digits = digits.trim().trim_start_matches("0x");
        let value = u64::from_str_radix(digits, 16)
            .with_context(|| format!("address base '{raw}' is not hex"))?;
        match op {
            "+" => Ok(AddressAdjust::Add(value)),
            "-" => Ok(AddressAdjust::Subtract(value)),
            _ => bail!("address base must start with '+' or '-'"),
        }
    }
}
