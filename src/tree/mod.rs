//! Pure algorithms over a project's flat node list.
//!
//! The database hands back nodes as rows; everything here works on an id-indexed
//! adjacency map built from those rows, so deep trees never recurse on the call stack.

mod cascade;
mod index;
mod paths;
mod reachability;

pub use cascade::*;
pub use index::*;
pub use paths::*;
pub use reachability::*;
