//! Discovery and loading of configuration files.

mod catalog;

pub use catalog::{Catalog, ChipItem, VendorItem};

use std::fs;
use std::path::Path;

use crate::config::{ConfigDocument, ConfigError};

/// Reads one configuration file and validates its document shape.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<ConfigDocument, ConfigError> {
    let text = fs::read_to_string(path)?;
    ConfigDocument::from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_a_valid_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("chip.json");
        fs::write(
            &path,
            r#"{ "__modules__": ["M"], "M": { "0x00": [] } }"#,
        )
        .expect("write file");
        let doc = load_document(&path).expect("load");
        assert_eq!(doc.modules(), ["M"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_document(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn syntax_error_is_a_json_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write file");
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
