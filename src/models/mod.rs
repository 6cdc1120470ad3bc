//! Data models for the Workbench workspace.
//!
//! Wire names are camelCase to match the browser client's interfaces.

mod file_node;
mod project;
mod recent_file;
mod revision;

pub use file_node::*;
pub use project::*;
pub use recent_file::*;
pub use revision::*;
