//! Layer 0: snapshot primitives.
//!
//! Everything a mirror run reasons about is built from these: page ids,
//! parent pointers, snapshot trees, title maps, and version events.

pub mod event;
pub mod id;
pub mod path;
pub mod tree;

pub use event::{Author, History, VersionEvent};
pub use id::{PageId, Parent};
pub use tree::{PageTree, TitleMap, children_of, is_parent_in, roots, sanitize_title};

use thiserror::Error;

/// Structural invariant violations.
///
/// These indicate a broken snapshot (or a caller that skipped populating the
/// title map), not a recoverable runtime condition. Fail fast.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    #[error("no title recorded for page {0}")]
    MissingTitle(PageId),

    #[error("page {0} has no resolvable parent in either snapshot")]
    UnresolvableParent(PageId),

    #[error("parent chain of page {0} contains a cycle")]
    ParentCycle(PageId),
}
