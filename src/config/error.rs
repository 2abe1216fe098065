use std::fmt;
use std::path::PathBuf;

use super::tree::TreeError;

/// Failures while locating, reading, or validating configuration documents.
///
/// Only [`ConfigError::MissingDirectory`] and [`ConfigError::NoVendors`] are
/// treated as fatal by callers; everything else aborts the single document.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    MissingDirectory(PathBuf),
    NoVendors(PathBuf),
    Tree(TreeError),
    MissingModules,
    ModulesNotArray,
    EmptyModules,
    ModulesNotStrings,
    UnknownModule { name: String },
    ModuleNotObject { name: String },
    BadWidth { key: &'static str, value: u64 },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

impl From<TreeError> for ConfigError {
    fn from(err: TreeError) -> Self {
        ConfigError::Tree(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {err}"),
            ConfigError::Json(err) => write!(f, "JSON error: {err}"),
            ConfigError::MissingDirectory(path) => {
                write!(f, "non-existent or unreadable directory: {}", path.display())
            }
            ConfigError::NoVendors(path) => {
                write!(f, "no readable vendor directories within: {}", path.display())
            }
            ConfigError::Tree(err) => write!(f, "document shape error: {err}"),
            ConfigError::MissingModules => write!(f, "there is no __modules__ array"),
            ConfigError::ModulesNotArray => write!(f, "__modules__ is not an array"),
            ConfigError::EmptyModules => write!(f, "empty __modules__ array"),
            ConfigError::ModulesNotStrings => {
                write!(f, "__modules__ is not a pure string array")
            }
            ConfigError::UnknownModule { name } => {
                write!(f, "cannot find module: {name}")
            }
            ConfigError::ModuleNotObject { name } => {
                write!(f, "module[{name}] is not a dictionary")
            }
            ConfigError::BadWidth { key, value } => {
                write!(f, "{key} must be 8, 16, 32, or 64, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
