use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque stable remote identifier of a page.
///
/// The remote assigns these; they survive moves and renames, which is what
/// makes identity recovery from disk possible at all.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Where a page hangs in a snapshot tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parent {
    /// Top level of the space.
    Root,
    Page(PageId),
}

impl Parent {
    /// The parent page id, if this is not a root.
    pub fn page(&self) -> Option<&PageId> {
        match self {
            Parent::Root => None,
            Parent::Page(id) => Some(id),
        }
    }
}
