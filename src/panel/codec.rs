//! Address-value text interchange.
//!
//! The textual side is a comma-separated list of delimiter-framed pairs,
//! e.g. `{ 0x0040, 0x0101 },`. Scanning is tolerant of junk between pairs
//! but aborts the remainder of the pass on a malformed item, keeping the
//! pairs already produced. Rendering zero-pads each number to the panel's
//! configured address/data width.

use std::fmt;

use crate::panel::diagnostic::{DiagnosticContext, DiagnosticPhase, PanelDiagnostic};
use crate::panel::module::ModulePanel;
use crate::panel::register::PanelObserver;

/// Which bracket pair frames each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Braces,
    Brackets,
}

impl Delimiter {
    pub fn open(&self) -> char {
        match self {
            Delimiter::Braces => '{',
            Delimiter::Brackets => '[',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Delimiter::Braces => '}',
            Delimiter::Brackets => ']',
        }
    }
}

/// Address base adjustment between textual addresses and register keys.
/// Parsing applies the adjustment; rendering reverses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressAdjust {
    Ignore,
    Add(u64),
    Subtract(u64),
}

impl AddressAdjust {
    pub fn apply(&self, address: u64) -> u64 {
        match self {
            AddressAdjust::Ignore => address,
            AddressAdjust::Add(base) => address.wrapping_add(*base),
            AddressAdjust::Subtract(base) => address.wrapping_sub(*base),
        }
    }

    pub fn unapply(&self, address: u64) -> u64 {
        match self {
            AddressAdjust::Ignore => address,
            AddressAdjust::Add(base) => address.wrapping_sub(*base),
            AddressAdjust::Subtract(base) => address.wrapping_add(*base),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressValue {
    pub address: u64,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    EmptyInput,
    MissingAddress,
    MissingValue,
    MissingClosingDelimiter,
}

/// Where and why a scan pass stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanFailure {
    /// 0-based index of the item that failed.
    pub item: usize,
    pub kind: ScanErrorKind,
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ScanErrorKind::EmptyInput => "no address-value pairs in input",
            ScanErrorKind::MissingAddress => "missing address",
            ScanErrorKind::MissingValue => "missing value",
            ScanErrorKind::MissingClosingDelimiter => "missing closing delimiter",
        };
        write!(f, "item[{}]: {}", self.item, what)
    }
}

/// Pairs produced before any failure, plus the failure itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub pairs: Vec<AddressValue>,
    pub failure: Option<ScanFailure>,
}

/// Scans the delimited pair list out of `text`.
pub fn scan_pairs(text: &str, delimiter: Delimiter) -> ScanOutcome {
    let open = delimiter.open() as u8;
    let close = delimiter.close() as u8;
    let bytes = text.as_bytes();
    let mut pairs = Vec::new();
    let mut pos = 0usize;
    let mut item = 0usize;

    let fail = |pairs: Vec<AddressValue>, item, kind| ScanOutcome {
        pairs,
        failure: Some(ScanFailure { item, kind }),
    };

    loop {
        // Seek the next opening delimiter; running out of input here ends
        // the pass.
        while pos < bytes.len() && bytes[pos] != open {
            pos += 1;
        }
        if pos >= bytes.len() {
            let failure = pairs.is_empty().then_some(ScanFailure {
                item: 0,
                kind: ScanErrorKind::EmptyInput,
            });
            return ScanOutcome { pairs, failure };
        }
        pos += 1;

        // Address: whitespace and a 0x prefix are fine, anything else in
        // front of the first digit is not.
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        skip_hex_prefix(bytes, &mut pos);
        if pos >= bytes.len() || !bytes[pos].is_ascii_hexdigit() {
            return fail(pairs, item, ScanErrorKind::MissingAddress);
        }
        let address = take_hex(bytes, &mut pos);

        // Value: skip separator junk up to the next digit; a delimiter or
        // the end of input first means the value never came.
        while pos < bytes.len()
            && !bytes[pos].is_ascii_hexdigit()
            && bytes[pos] != close
            && bytes[pos] != open
        {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] == close || bytes[pos] == open {
            return fail(pairs, item, ScanErrorKind::MissingValue);
        }
        skip_hex_prefix(bytes, &mut pos);
        let value = take_hex(bytes, &mut pos);

        // The frame has to close before the next one opens.
        while pos < bytes.len() && bytes[pos] != close && bytes[pos] != open {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] == open {
            return fail(pairs, item, ScanErrorKind::MissingClosingDelimiter);
        }
        pos += 1;

        pairs.push(AddressValue { address, value });
        item += 1;
    }
}

/// Renders pairs as `{ 0x…, 0x… },` rows joined by newlines, zero-padded to
/// the given bit widths.
pub fn render_pairs(
    pairs: &[AddressValue],
    delimiter: Delimiter,
    addr_bits: u8,
    data_bits: u8,
) -> String {
    let addr_width = (addr_bits / 4) as usize;
    let data_width = (data_bits / 4) as usize;
    pairs
        .iter()
        .map(|pair| {
            format!(
                "{open} 0x{addr:0addr_width$x}, 0x{value:0data_width$x} {close},",
                open = delimiter.open(),
                close = delimiter.close(),
                addr = pair.address,
                value = pair.value,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of pushing a text block into a panel.
#[derive(Debug)]
pub struct ApplyReport {
    /// Registers whose full value was loaded.
    pub applied: usize,
    /// Adjusted addresses with no matching register.
    pub skipped: Vec<u64>,
    pub failure: Option<ScanFailure>,
    pub diagnostics: Vec<PanelDiagnostic>,
}

/// Scans `text` and loads each pair's value into the register at its
/// (adjusted) address. Unknown addresses are skipped with a diagnostic.
pub fn apply_text(
    panel: &mut ModulePanel,
    text: &str,
    delimiter: Delimiter,
    adjust: AddressAdjust,
    observer: &mut dyn PanelObserver,
) -> ApplyReport {
    let outcome = scan_pairs(text, delimiter);
    let mut applied = 0;
    let mut skipped = Vec::new();
    let mut diagnostics = Vec::new();
    for pair in &outcome.pairs {
        let address = adjust.apply(pair.address);
        let index = panel.index_by_address(address);
        match index.and_then(|index| panel.register_mut(index)) {
            Some(register) => {
                register.load_full(pair.value, observer);
                applied += 1;
            }
            None => {
                diagnostics.push(PanelDiagnostic::warning(
                    DiagnosticPhase::Codec,
                    "unknown-address",
                    format!("no register at address {address:#x}"),
                    DiagnosticContext::register(format!("{:#x}", pair.address)),
                ));
                skipped.push(address);
            }
        }
    }
    ApplyReport {
        applied,
        skipped,
        failure: outcome.failure,
        diagnostics,
    }
}

/// Renders every addressable register row of the panel, most recently
/// loaded values included, reversing the address adjustment.
pub fn render_text(panel: &ModulePanel, delimiter: Delimiter, adjust: AddressAdjust) -> String {
    let pairs: Vec<AddressValue> = panel
        .registers()
        .iter()
        .filter_map(|register| {
            register.address().map(|address| AddressValue {
                address: adjust.unapply(address),
                value: register.full_value(),
            })
        })
        .collect();
    render_pairs(&pairs, delimiter, panel.addr_bits(), panel.data_bits())
}

/// Consumes `0x`/`0X` when a digit follows, so prefixed and bare hex read
/// the same way.
fn skip_hex_prefix(bytes: &[u8], pos: &mut usize) {
    if *pos + 2 < bytes.len()
        && bytes[*pos] == b'0'
        && (bytes[*pos + 1] == b'x' || bytes[*pos + 1] == b'X')
        && bytes[*pos + 2].is_ascii_hexdigit()
    {
        *pos += 2;
    }
}

/// Greedy hex digit run at the cursor; the caller has checked the first
/// digit exists. Saturates at `u64::MAX`.
fn take_hex(bytes: &[u8], pos: &mut usize) -> u64 {
    let mut value = 0u64;
    while *pos < bytes.len() && bytes[*pos].is_ascii_hexdigit() {
        let digit = (bytes[*pos] as char).to_digit(16).unwrap_or(0) as u64;
        value = value.saturating_mul(16).saturating_add(digit);
        *pos += 1;
    }
    value
}
