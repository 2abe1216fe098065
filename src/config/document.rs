//! Validated configuration document.

use serde_json::{Map, Value};

use super::error::ConfigError;
use super::tree::{self, TreeAccess, TreeError};

const MODULES_KEY: &str = "__modules__";
const ADDR_BITS_KEY: &str = "__addr_bits__";
const DATA_BITS_KEY: &str = "__data_bits__";

const DEFAULT_BITS: u8 = 32;

/// A parsed configuration file whose document-level shape has been checked:
/// `__modules__` is a non-empty string array and every named module exists
/// as an object. Per-register and per-field validation happens later and is
/// non-fatal, so a valid document is the coarsest loadable unit.
#[derive(Debug)]
pub struct ConfigDocument {
    root: Map<String, Value>,
    modules: Vec<String>,
    addr_bits: u8,
    data_bits: u8,
}

impl ConfigDocument {
    pub fn from_str(text: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(text)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, ConfigError> {
        let root = match root {
            Value::Object(map) => map,
            other => {
                return Err(TreeError::WrongType {
                    what: "document".to_string(),
                    expected: "object",
                    actual: tree::kind_name(&other),
                }
                .into());
            }
        };

        let modules_val = root.get(MODULES_KEY).ok_or(ConfigError::MissingModules)?;
        let modules_arr = modules_val
            .as_array()
            .ok_or(ConfigError::ModulesNotArray)?;
        if modules_arr.is_empty() {
            return Err(ConfigError::EmptyModules);
        }
        let mut modules = Vec::with_capacity(modules_arr.len());
        for entry in modules_arr {
            let name = entry.as_str().ok_or(ConfigError::ModulesNotStrings)?;
            let module_val = root
                .get(name)
                .ok_or_else(|| ConfigError::UnknownModule { name: name.to_string() })?;
            if !module_val.is_object() {
                return Err(ConfigError::ModuleNotObject { name: name.to_string() });
            }
            modules.push(name.to_string());
        }

        let addr_bits = width_of(&root, ADDR_BITS_KEY)?;
        let data_bits = width_of(&root, DATA_BITS_KEY)?;

        Ok(Self {
            root,
            modules,
            addr_bits,
            data_bits,
        })
    }

    /// Module names in declaration order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// The register dictionary of one module. Only names declared in
    /// `__modules__` resolve; other top-level keys are not modules.
    pub fn module(&self, name: &str) -> Result<&Map<String, Value>, ConfigError> {
        if !self.modules.iter().any(|m| m == name) {
            return Err(ConfigError::UnknownModule { name: name.to_string() });
        }
        let value = self
            .root
            .get(name)
            .ok_or_else(|| ConfigError::UnknownModule { name: name.to_string() })?;
        Ok(value.want_object(&format!("module[{name}]"))?)
    }

    pub fn addr_bits(&self) -> u8 {
        self.addr_bits
    }

    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }
}

fn width_of(root: &Map<String, Value>, key: &'static str) -> Result<u8, ConfigError> {
    let Some(value) = root.get(key) else {
        return Ok(DEFAULT_BITS);
    };
    let bits = value.want_u64(key)?;
    match bits {
        8 | 16 | 32 | 64 => Ok(bits as u8),
        other => Err(ConfigError::BadWidth { key, value: other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "__modules__": ["GPIO"],
            "GPIO": { "0x00": [] }
        })
    }

    #[test]
    fn accepts_minimal_document() {
        let doc = ConfigDocument::from_value(minimal()).expect("valid document");
        assert_eq!(doc.modules(), ["GPIO"]);
        assert_eq!(doc.addr_bits(), 32, "addr width defaults to 32");
        assert_eq!(doc.data_bits(), 32, "data width defaults to 32");
        assert!(doc.module("GPIO").expect("module").contains_key("0x00"));
    }

    #[test]
    fn rejects_missing_modules_array() {
        let err = ConfigDocument::from_value(json!({"GPIO": {}})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingModules));
    }

    #[test]
    fn rejects_non_array_modules() {
        let err = ConfigDocument::from_value(json!({"__modules__": "GPIO"})).unwrap_err();
        assert!(matches!(err, ConfigError::ModulesNotArray));
    }

    #[test]
    fn rejects_empty_modules() {
        let err = ConfigDocument::from_value(json!({"__modules__": []})).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyModules));
    }

    #[test]
    fn rejects_non_string_module_names() {
        let err = ConfigDocument::from_value(json!({"__modules__": [3]})).unwrap_err();
        assert!(matches!(err, ConfigError::ModulesNotStrings));
    }

    #[test]
    fn rejects_dangling_module_name() {
        let err = ConfigDocument::from_value(json!({"__modules__": ["GPIO"]})).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModule { name } if name == "GPIO"));
    }

    #[test]
    fn rejects_non_object_module() {
        let err =
            ConfigDocument::from_value(json!({"__modules__": ["GPIO"], "GPIO": 4})).unwrap_err();
        assert!(matches!(err, ConfigError::ModuleNotObject { name } if name == "GPIO"));
    }

    #[test]
    fn reads_and_validates_widths() {
        let doc = ConfigDocument::from_value(json!({
            "__modules__": ["M"],
            "M": {},
            "__addr_bits__": 16,
            "__data_bits__": 64
        }))
        .expect("valid");
        assert_eq!((doc.addr_bits(), doc.data_bits()), (16, 64));

        let err = ConfigDocument::from_value(json!({
            "__modules__": ["M"],
            "M": {},
            "__data_bits__": 12
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::BadWidth { value: 12, .. }));
    }

    #[test]
    fn module_lookup_misses_cleanly() {
        let doc = ConfigDocument::from_value(minimal()).expect("valid");
        assert!(matches!(
            doc.module("UART"),
            Err(ConfigError::UnknownModule { .. })
        ));
    }
}
