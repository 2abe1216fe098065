//! Configuration document handling: typed access over the parsed JSON tree
//! and validation of the document shape described in the file format.

pub mod tree;

mod document;
mod error;

pub use document::ConfigDocument;
pub use error::ConfigError;
