//! Client-side session state: editor tabs, the open-file channel that feeds them, and
//! the per-user active project pointer.
//!
//! None of this is persisted in the database. A front-end binding owns one
//! [`TabManager`] and one [`OpenFileChannel`] per editor window; the server owns a
//! single [`ActiveProjectPointer`] for all users.

mod active_project;
mod channel;
mod tabs;

pub use active_project::*;
pub use channel::*;
pub use tabs::*;
