//! Directory indexing.
//!
//! Indexing runs in two phases:
//! 1. **Walk phase** (`fswalk`): builds a `Node` tree with children sorted by
//!    name, then flattens it into `DirectoryVisit`s in preorder
//! 2. **Drive phase** (`construct`): feeds the visits into a `Catalog`, which
//!    assigns ids, records closure edges, and registers directory paths
//!
//! ## Module Structure
//!
//! - `closure` - (ancestor, descendant, depth) edges over entry ids
//! - `construct` - `WalkDriver` and the visit types it consumes
//! - `data` - `Catalog`, the owner of entries, closure, and paths
//! - `fswalk` - Parallel filesystem walking that builds the `Node` tree
//! - `path` - Normalization of registry keys and FROM targets
//! - `registry` - Directory path to id lookup

mod closure;
mod construct;
mod data;
mod fswalk;
mod path;
mod registry;

pub use closure::{ClosureEdge, ClosureIndex};
pub use construct::{DirectoryNaming, DirectoryVisit, FileRecord, WalkDriver, WalkStats};
pub use data::Catalog;
pub use fswalk::{into_visits, walk_it, Node, WalkData};
pub use path::{normalize_absolute_path, normalize_relative_path, ROOT_PATH};
pub use registry::PathRegistry;
