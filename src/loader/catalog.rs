//! Vendor/chip/file discovery under the configuration directory.
//!
//! The on-disk layout is `<config_dir>/<vendor>/<chip>/<file>`. Entries are
//! listed name-sorted. Empty or unreadable subtrees simply yield empty
//! lists; the only fatal cases are a missing root directory and a root with
//! no vendor directories at all, since then there is nothing to load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipItem {
    pub name: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorItem {
    pub name: String,
    pub chips: Vec<ChipItem>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    vendors: Vec<VendorItem>,
}

impl Catalog {
    pub fn scan<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let root = config_dir.as_ref();
        let vendor_names = list_entries(root, EntryKind::Dir)
            .map_err(|_| ConfigError::MissingDirectory(root.to_path_buf()))?;
        if vendor_names.is_empty() {
            return Err(ConfigError::NoVendors(root.to_path_buf()));
        }

        let mut vendors = Vec::with_capacity(vendor_names.len());
        for vendor_name in vendor_names {
            let vendor_dir = root.join(&vendor_name);
            let chip_names = list_entries(&vendor_dir, EntryKind::Dir).unwrap_or_default();
            let mut chips = Vec::with_capacity(chip_names.len());
            for chip_name in chip_names {
                let chip_dir = vendor_dir.join(&chip_name);
                let files = list_entries(&chip_dir, EntryKind::File).unwrap_or_default();
                chips.push(ChipItem {
                    name: chip_name,
                    files,
                });
            }
            vendors.push(VendorItem {
                name: vendor_name,
                chips,
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            vendors,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vendors(&self) -> &[VendorItem] {
        &self.vendors
    }

    /// Full path of one configuration file within the catalog.
    pub fn file_path(&self, vendor: &str, chip: &str, file: &str) -> PathBuf {
        self.root.join(vendor).join(chip).join(file)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

/// Name-sorted directory entries of one kind. Entries whose type cannot be
/// determined are left out rather than failing the listing.
fn list_entries(dir: &Path, kind: EntryKind) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let matches = match kind {
            EntryKind::Dir => file_type.is_dir(),
            EntryKind::File => file_type.is_file(),
        };
        if !matches {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"{}").expect("write file");
    }

    #[test]
    fn scans_sorted_vendor_chip_file_tree() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("nxp/imx8/")).expect("mkdir");
        fs::create_dir_all(root.join("allwinner/h3")).expect("mkdir");
        touch(&root.join("nxp/imx8/uart.json"));
        touch(&root.join("nxp/imx8/gpio.json"));

        let catalog = Catalog::scan(root).expect("scan");
        let vendors = catalog.vendors();
        assert_eq!(vendors.len(), 2);
        assert_eq!(vendors[0].name, "allwinner", "vendors are name-sorted");
        assert_eq!(vendors[1].name, "nxp");
        let imx8 = &vendors[1].chips[0];
        assert_eq!(imx8.files, ["gpio.json", "uart.json"], "files are name-sorted");
        assert_eq!(
            catalog.file_path("nxp", "imx8", "uart.json"),
            root.join("nxp/imx8/uart.json")
        );
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempdir().expect("tempdir");
        let gone = dir.path().join("nothing-here");
        assert!(matches!(
            Catalog::scan(&gone),
            Err(ConfigError::MissingDirectory(path)) if path == gone
        ));
    }

    #[test]
    fn root_without_vendor_dirs_is_fatal() {
        let dir = tempdir().expect("tempdir");
        touch(&dir.path().join("stray-file.json"));
        assert!(matches!(
            Catalog::scan(dir.path()),
            Err(ConfigError::NoVendors(_))
        ));
    }

    #[test]
    fn empty_subtrees_are_tolerated() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("vendor/chip")).expect("mkdir");
        let catalog = Catalog::scan(dir.path()).expect("scan");
        assert_eq!(catalog.vendors()[0].chips[0].files, Vec::<String>::new());
    }
}
