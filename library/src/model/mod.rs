//! Timing document model
//!
//! Captured rows, the document that owns them, and the `.timing` file format.

mod document;
pub mod persistence;
mod row;
pub mod version;

pub use document::{DocumentHeader, PLUGIN_NAME, PLUGIN_VERSION, TimingDocument};
pub use persistence::{LoadReport, LoadWarning, TimingFile};
pub use row::TimingRow;
pub use version::PluginVersion;
