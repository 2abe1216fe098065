//! The register panel value model.
//!
//! Everything a presentation layer needs to show and edit registers: bit
//! range parsing, field descriptors and enum tables, the per-register value
//! synchronizer, the per-module builder, and the address-value text codec.

pub mod bits;
pub mod codec;
pub mod diagnostic;
pub mod field;
pub mod literal;
pub mod module;
pub mod range;
pub mod register;

pub use codec::{AddressAdjust, AddressValue, Delimiter, ScanOutcome};
pub use field::{Access, DigitStyle, EnumTable, FieldDescriptor, FieldKind};
pub use module::{ModuleBuild, ModulePanel};
pub use range::BitRange;
pub use register::{EditOutcome, PanelObserver, RegisterModel, SyncEvent, SyncOrigin};
