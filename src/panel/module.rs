//! Builds the register models of one module from a validated document.
//!
//! Per-register and per-field problems are collected as diagnostics and the
//! offending item is skipped; only a missing module aborts the build.

use ahash::AHashMap;
use serde_json::{Map, Value};
use smallvec::SmallVec;

use crate::config::{ConfigDocument, ConfigError};
use crate::panel::diagnostic::{DiagnosticContext, DiagnosticPhase, PanelDiagnostic};
use crate::panel::field::FieldDescriptor;
use crate::panel::literal::scan_hex_u64;
use crate::panel::register::RegisterModel;

const DEFAULTS_KEY: &str = "__defaults__";
const REF_KEY: &str = "ref";

/// All registers of one module plus the key/address indexes the codec and
/// presentation layers look rows up through.
pub struct ModulePanel {
    module: String,
    registers: Vec<RegisterModel>,
    by_key: AHashMap<String, usize>,
    by_address: AHashMap<u64, usize>,
    addr_bits: u8,
    data_bits: u8,
}

/// Build result: the panel plus everything worth telling the user about.
pub struct ModuleBuild {
    pub panel: ModulePanel,
    pub diagnostics: Vec<PanelDiagnostic>,
}

impl ModulePanel {
    pub fn build(doc: &ConfigDocument, module_name: &str) -> Result<ModuleBuild, ConfigError> {
        let map = doc.module(module_name)?;
        let mut diagnostics = Vec::new();

        let defaults = collect_defaults(map, &mut diagnostics);

        let mut registers = Vec::new();
        let mut by_key = AHashMap::new();
        let mut by_address: AHashMap<u64, usize> = AHashMap::new();

        for (key, value) in map {
            if key.starts_with("__") {
                continue;
            }
            let Some(layout) = resolve_layout(map, key, value, &mut diagnostics) else {
                continue;
            };

            let mut descriptors = Vec::with_capacity(layout.len());
            for (index, item) in layout.iter().enumerate() {
                match FieldDescriptor::from_config(item) {
                    Ok(descriptor) => {
                        if descriptor.enum_table().is_some_and(|t| t.sentinel_fallback()) {
                            diagnostics.push(PanelDiagnostic::warning(
                                DiagnosticPhase::Field,
                                "enum-sentinel-exhausted",
                                "no free 16-bit key for the bad-value slot; using 0xffff",
                                DiagnosticContext::field(key.clone(), index),
                            ));
                        }
                        descriptors.push(descriptor);
                    }
                    Err(err) => {
                        let mut context = DiagnosticContext::field(key.clone(), index);
                        if let Some(raw) = err.raw() {
                            context = context.with_raw(raw);
                        }
                        diagnostics.push(PanelDiagnostic::error(
                            DiagnosticPhase::Field,
                            "field-config",
                            err.to_string(),
                            context,
                        ));
                    }
                }
            }

            let default_value = defaults.get(key.as_str()).copied().unwrap_or(0);
            let address = scan_hex_u64(key);
            let index = registers.len();
            if let Some(addr) = address {
                if by_address.contains_key(&addr) {
                    diagnostics.push(PanelDiagnostic::warning(
                        DiagnosticPhase::Register,
                        "duplicate-address",
                        format!("address {addr:#x} already taken; keeping the earlier register"),
                        DiagnosticContext::register(key.clone()),
                    ));
                } else {
                    by_address.insert(addr, index);
                }
            }
            by_key.insert(key.clone(), index);
            registers.push(RegisterModel::new(key.clone(), address, descriptors, default_value));
        }

        for key in defaults.keys() {
            if !by_key.contains_key(*key) {
                diagnostics.push(PanelDiagnostic::warning(
                    DiagnosticPhase::Register,
                    "default-without-register",
                    "default value names a register that does not exist",
                    DiagnosticContext::register(key.to_string()),
                ));
            }
        }

        Ok(ModuleBuild {
            panel: ModulePanel {
                module: module_name.to_string(),
                registers,
                by_key,
                by_address,
                addr_bits: doc.addr_bits(),
                data_bits: doc.data_bits(),
            },
            diagnostics,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn registers(&self) -> &[RegisterModel] {
        &self.registers
    }

    pub fn register_mut(&mut self, index: usize) -> Option<&mut RegisterModel> {
        self.registers.get_mut(index)
    }

    pub fn index_by_key(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn index_by_address(&self, address: u64) -> Option<usize> {
        self.by_address.get(&address).copied()
    }

    pub fn addr_bits(&self) -> u8 {
        self.addr_bits
    }

    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }
}

/// Parses the `__defaults__` sub-map: register key to hex full value.
fn collect_defaults<'a>(
    map: &'a Map<String, Value>,
    diagnostics: &mut Vec<PanelDiagnostic>,
) -> AHashMap<&'a str, u64> {
    let mut defaults = AHashMap::new();
    let Some(value) = map.get(DEFAULTS_KEY) else {
        return defaults;
    };
    let Some(entries) = value.as_object() else {
        diagnostics.push(PanelDiagnostic::error(
            DiagnosticPhase::Register,
            "defaults-not-object",
            "__defaults__ is not a dictionary",
            DiagnosticContext::register(DEFAULTS_KEY),
        ));
        return defaults;
    };
    for (key, raw) in entries {
        let parsed = raw.as_str().and_then(scan_hex_u64);
        match parsed {
            Some(full) => {
                defaults.insert(key.as_str(), full);
            }
            None => {
                diagnostics.push(PanelDiagnostic::error(
                    DiagnosticPhase::Register,
                    "default-not-hex",
                    "default value is not a hex string",
                    DiagnosticContext::register(key.clone())
                        .with_raw(raw.as_str().unwrap_or_default()),
                ));
            }
        }
    }
    defaults
}

/// Resolves a register entry to its field-config array, following `ref`
/// redirects. A redirect is an array whose first element carries a `"ref"`
/// string naming another register whose layout is reused.
fn resolve_layout<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    value: &'a Value,
    diagnostics: &mut Vec<PanelDiagnostic>,
) -> Option<&'a [Value]> {
    let mut visited: SmallVec<[&str; 4]> = SmallVec::new();
    let mut current_key = key;
    let mut current = value;
    loop {
        let Some(layout) = current.as_array() else {
            diagnostics.push(PanelDiagnostic::error(
                DiagnosticPhase::Register,
                "register-not-array",
                format!("register value is not an array (via {current_key})"),
                DiagnosticContext::register(key),
            ));
            return None;
        };
        let redirect = layout
            .first()
            .and_then(Value::as_object)
            .and_then(|item| item.get(REF_KEY))
            .and_then(Value::as_str);
        let Some(target) = redirect else {
            return Some(layout);
        };
        visited.push(current_key);
        if visited.contains(&target) {
            diagnostics.push(PanelDiagnostic::error(
                DiagnosticPhase::Register,
                "ref-cycle",
                format!("reference cycle through {target}"),
                DiagnosticContext::register(key).with_raw(target),
            ));
            return None;
        }
        let Some(next) = map.get(target) else {
            diagnostics.push(PanelDiagnostic::error(
                DiagnosticPhase::Register,
                "ref-unknown",
                format!("reference to unknown register {target}"),
                DiagnosticContext::register(key).with_raw(target),
            ));
            return None;
        };
        current_key = target;
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::diagnostic::DiagnosticLevel;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigDocument {
        ConfigDocument::from_value(value).expect("test document is valid")
    }

    fn gpio_doc() -> ConfigDocument {
        document(json!({
            "__modules__": ["GPIO"],
            "GPIO": {
                "__defaults__": { "0x0040": "0x00000101" },
                "0x0040": [
                    {"attr": ["7:4", "RW", "hex", "High"]},
                    {"attr": ["3:0", "RO", "hex", "Low"]}
                ],
                "0x0044": [ {"ref": "0x0040"} ]
            }
        }))
    }

    #[test]
    fn builds_registers_in_document_order() {
        let build = ModulePanel::build(&gpio_doc(), "GPIO").expect("module exists");
        assert!(build.diagnostics.is_empty(), "{:?}", build.diagnostics);
        let panel = build.panel;
        assert_eq!(panel.module(), "GPIO");
        assert_eq!(panel.registers().len(), 2);
        assert_eq!(panel.registers()[0].key(), "0x0040");
        assert_eq!(panel.registers()[0].full_value(), 0x101);
        assert_eq!(panel.index_by_address(0x40), Some(0));
        assert_eq!(panel.index_by_key("0x0044"), Some(1));
    }

    #[test]
    fn ref_reuses_target_layout() {
        let build = ModulePanel::build(&gpio_doc(), "GPIO").expect("module exists");
        let panel = build.panel;
        let mirrored = &panel.registers()[1];
        assert_eq!(mirrored.slots().len(), 2, "layout comes from 0x0040");
        assert_eq!(mirrored.address(), Some(0x44), "address stays its own");
        assert_eq!(mirrored.default_value(), 0, "default stays its own");
    }

    #[test]
    fn ref_cycle_is_skipped_with_diagnostic() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": {
                "0x00": [ {"ref": "0x04"} ],
                "0x04": [ {"ref": "0x00"} ]
            }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert!(build.panel.registers().is_empty());
        assert_eq!(build.diagnostics.len(), 2);
        assert!(build.diagnostics.iter().all(|d| d.code == "ref-cycle"));
    }

    #[test]
    fn ref_to_unknown_register_is_skipped() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": { "0x00": [ {"ref": "0x99"} ] }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert!(build.panel.registers().is_empty());
        assert_eq!(build.diagnostics[0].code, "ref-unknown");
    }

    #[test]
    fn bad_field_is_skipped_register_survives() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": {
                "0x00": [
                    {"attr": ["3:0", "RW", "hex", "ok"]},
                    {"attr": ["9:4", "RW", "float", "bad kind"]},
                    {"attr": ["15:10", "RW", "hex", "also ok"]}
                ]
            }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert_eq!(build.panel.registers()[0].slots().len(), 2);
        let diag = &build.diagnostics[0];
        assert_eq!(diag.level, DiagnosticLevel::Error);
        let context = diag.context.as_ref().expect("field context");
        assert_eq!(context.register, "0x00");
        assert_eq!(context.field_index, Some(1));
        assert_eq!(context.raw.as_deref(), Some("float"));
    }

    #[test]
    fn non_array_register_is_skipped() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": { "CTRL": {"attr": []} }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert!(build.panel.registers().is_empty());
        assert_eq!(build.diagnostics[0].code, "register-not-array");
    }

    #[test]
    fn non_address_key_is_not_indexed() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": { "CTRL": [ {"attr": ["3:0", "RW", "hex", "n"]} ] }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        let panel = build.panel;
        assert_eq!(panel.registers().len(), 1);
        assert_eq!(panel.registers()[0].address(), None);
        assert_eq!(panel.index_by_key("CTRL"), Some(0));
    }

    #[test]
    fn malformed_default_reports_and_continues() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": {
                "__defaults__": { "0x00": "zz", "0x04": "0x7" },
                "0x00": [], "0x04": []
            }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert_eq!(build.diagnostics[0].code, "default-not-hex");
        assert_eq!(build.panel.registers()[1].full_value(), 7);
    }

    #[test]
    fn default_for_unknown_register_warns() {
        let doc = document(json!({
            "__modules__": ["M"],
            "M": {
                "__defaults__": { "0x99": "0x1" },
                "0x00": []
            }
        }));
        let build = ModulePanel::build(&doc, "M").expect("module exists");
        assert!(build
            .diagnostics
            .iter()
            .any(|d| d.code == "default-without-register"));
    }

    #[test]
    fn unknown_module_is_an_error() {
        assert!(matches!(
            ModulePanel::build(&gpio_doc(), "UART"),
            Err(ConfigError::UnknownModule { .. })
        ));
    }
}
