//! Field descriptors: the per-field slice of a register's configuration.
//!
//! A descriptor pins down one bit range, how its value is depicted
//! (label, digit editor, or enumerated choice), whether it accepts writes,
//! and the optional title/hint strings shown next to it. Descriptors are
//! built once per field config entry and never change afterwards; edits
//! mutate the runtime value, not the descriptor.

pub mod enums;

use std::fmt;

use bitflags::bitflags;
use serde_json::Value;

use crate::config::tree::TreeAccess;
use crate::panel::range::{BitRange, RangeParseError};

pub use enums::{EnumEntry, EnumTable};

/// Semantic kind of a field, classified from the third `attr` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Missing,
    Todo,
    Reserved,
    Enum,
    Bool,
    InvBool,
    Decimal,
    UnsignedDecimal,
    Hex,
}

impl FieldKind {
    /// Case-insensitive token classification; `None` is the "unknown" result
    /// that makes the caller reject the whole field config.
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token.to_ascii_lowercase().as_str() {
            "missing" => FieldKind::Missing,
            "todo" => FieldKind::Todo,
            "reserved" => FieldKind::Reserved,
            "enum" => FieldKind::Enum,
            "bool" => FieldKind::Bool,
            "invbool" => FieldKind::InvBool,
            "decimal" => FieldKind::Decimal,
            "udecimal" => FieldKind::UnsignedDecimal,
            "hex" => FieldKind::Hex,
            _ => return None,
        };
        Some(kind)
    }

    pub fn token(&self) -> &'static str {
        match self {
            FieldKind::Missing => "missing",
            FieldKind::Todo => "TODO",
            FieldKind::Reserved => "reserved",
            FieldKind::Enum => "enum",
            FieldKind::Bool => "bool",
            FieldKind::InvBool => "invbool",
            FieldKind::Decimal => "decimal",
            FieldKind::UnsignedDecimal => "udecimal",
            FieldKind::Hex => "hex",
        }
    }

    /// Kinds rendered as a static label row instead of an editor.
    pub fn is_label(&self) -> bool {
        matches!(self, FieldKind::Missing | FieldKind::Todo | FieldKind::Reserved)
    }

    /// Kinds backed by an enumeration table.
    pub fn is_enumerable(&self) -> bool {
        matches!(self, FieldKind::Enum | FieldKind::Bool | FieldKind::InvBool)
    }

    /// Every kind beyond the label rows must carry a title.
    pub fn needs_title(&self) -> bool {
        !self.is_label()
    }

    pub fn digit_style(&self) -> DigitStyle {
        match self {
            FieldKind::Decimal => DigitStyle::Decimal,
            FieldKind::UnsignedDecimal => DigitStyle::UnsignedDecimal,
            _ => DigitStyle::Hex,
        }
    }
}

/// Radix/signedness a digit editor presents its value in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitStyle {
    Hex,
    Decimal,
    UnsignedDecimal,
}

bitflags! {
    /// Access rights of one field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

impl Access {
    /// `"RO"` (any case) is read-only; every other token is read-write.
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("RO") {
            Access::READ
        } else {
            Access::READ | Access::WRITE
        }
    }

    pub fn is_read_only(&self) -> bool {
        !self.contains(Access::WRITE)
    }
}

/// Immutable description of one field of a register.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    range: BitRange,
    kind: FieldKind,
    access: Access,
    title: Option<String>,
    hint: Option<String>,
    enum_table: Option<EnumTable>,
}

impl FieldDescriptor {
    /// Builds a descriptor from one field config object:
    /// `{ "attr": [range, access, kind, title?, hint?], "desc": {...}? }`.
    ///
    /// Rejections name what was wrong; the register builder logs them and
    /// skips the field without failing the register.
    pub fn from_config(config: &Value) -> Result<Self, FieldConfigError> {
        let dict = config
            .want_object("item")
            .map_err(|_| FieldConfigError::NotAnObject)?;
        let attr_val = dict.get("attr").ok_or(FieldConfigError::MissingAttr)?;
        let attr = attr_val
            .want_array("item.attr")
            .map_err(|_| FieldConfigError::AttrNotArray)?;
        if attr.len() < 3 {
            return Err(FieldConfigError::TooFewAttrs { count: attr.len() });
        }

        let range_raw = attr[0].as_str().unwrap_or_default();
        let range = BitRange::parse(range_raw).map_err(|source| {
            FieldConfigError::InvalidBitRange {
                raw: range_raw.to_string(),
                source,
            }
        })?;

        let kind_raw = attr[2].as_str().unwrap_or_default();
        let kind = FieldKind::from_token(kind_raw).ok_or_else(|| {
            FieldConfigError::UnknownDescType {
                raw: kind_raw.to_string(),
            }
        })?;

        if kind.needs_title() && attr.len() < 4 {
            return Err(FieldConfigError::MissingTitle { kind });
        }

        let enum_table = match kind {
            FieldKind::Enum => {
                let desc_val = dict.get("desc").ok_or(FieldConfigError::MissingDesc)?;
                let desc = desc_val
                    .want_object("item.desc")
                    .map_err(|_| FieldConfigError::DescNotObject)?;
                if desc.is_empty() {
                    return Err(FieldConfigError::EmptyDesc);
                }
                Some(EnumTable::from_pairs(desc.iter().map(|(key, label)| {
                    (key.as_str(), label.as_str().unwrap_or("Invalid"))
                })))
            }
            FieldKind::Bool => Some(EnumTable::bool_table()),
            FieldKind::InvBool => Some(EnumTable::invbool_table()),
            _ => None,
        };

        let access = Access::from_token(attr[1].as_str().unwrap_or_default());
        let title = attr.get(3).and_then(Value::as_str).map(str::to_string);
        let hint = attr
            .get(4)
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        Ok(Self {
            range,
            kind,
            access,
            title,
            hint,
            enum_table,
        })
    }

    pub fn range(&self) -> BitRange {
        self.range
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_read_only(&self) -> bool {
        self.access.is_read_only()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn enum_table(&self) -> Option<&EnumTable> {
        self.enum_table.as_ref()
    }

    /// Largest value this field accepts.
    pub fn max_value(&self) -> u64 {
        self.range.max_value()
    }

    /// Text shown in the description cell for label rows.
    pub fn label_text(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.kind.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldConfigError {
    NotAnObject,
    MissingAttr,
    AttrNotArray,
    TooFewAttrs { count: usize },
    InvalidBitRange { raw: String, source: RangeParseError },
    UnknownDescType { raw: String },
    MissingTitle { kind: FieldKind },
    MissingDesc,
    DescNotObject,
    EmptyDesc,
}

impl FieldConfigError {
    /// Raw source text worth echoing in a diagnostic, when there is one.
    pub fn raw(&self) -> Option<&str> {
        match self {
            FieldConfigError::InvalidBitRange { raw, .. }
            | FieldConfigError::UnknownDescType { raw } => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for FieldConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldConfigError::NotAnObject => write!(f, "item is not a dictionary"),
            FieldConfigError::MissingAttr => {
                write!(f, "item does not contain an \"attr\" property")
            }
            FieldConfigError::AttrNotArray => {
                write!(f, "value of \"attr\" property is not an array")
            }
            FieldConfigError::TooFewAttrs { count } => {
                write!(f, "too few attr elements, just {count}")
            }
            FieldConfigError::InvalidBitRange { raw, source } => {
                write!(f, "invalid bits range '{raw}': {source}")
            }
            FieldConfigError::UnknownDescType { raw } => {
                write!(f, "invalid description type: {raw}")
            }
            FieldConfigError::MissingTitle { kind } => {
                write!(f, "missing title for description type[{}]", kind.token())
            }
            FieldConfigError::MissingDesc => {
                write!(f, "item does not contain a \"desc\" property")
            }
            FieldConfigError::DescNotObject => {
                write!(f, "value of \"desc\" property is not a dictionary")
            }
            FieldConfigError::EmptyDesc => write!(f, "\"desc\" dictionary is empty"),
        }
    }
}

impl std::error::Error for FieldConfigError {}
