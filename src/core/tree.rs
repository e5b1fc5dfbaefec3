//! Snapshot trees and title maps.

use std::collections::BTreeMap;

use super::id::{PageId, Parent};

/// Snapshot of the hierarchy at a point in time: page → parent.
///
/// Invariant: acyclic; every id resolves to a root in finitely many hops.
pub type PageTree = BTreeMap<PageId, Parent>;

/// Page → sanitized display name.
///
/// Invariant: a page's path is the ordered join of ancestor titles from the
/// root down to the page.
pub type TitleMap = BTreeMap<PageId, String>;

/// Sanitize a display name for use as a path segment.
///
/// Path separators are replaced; an empty title falls back to the id itself
/// so every page keeps a distinct, non-empty segment.
pub fn sanitize_title(raw: &str, id: &PageId) -> String {
    let cleaned = raw.trim().replace(['/', '\\'], "-");
    if cleaned.is_empty() {
        id.as_str().to_string()
    } else {
        cleaned
    }
}

/// Reverse adjacency of a snapshot: parent → children, children in id order.
pub fn children_of(tree: &PageTree) -> BTreeMap<PageId, Vec<PageId>> {
    let mut rev: BTreeMap<PageId, Vec<PageId>> = BTreeMap::new();
    for (id, parent) in tree {
        if let Parent::Page(p) = parent {
            rev.entry(p.clone()).or_default().push(id.clone());
        }
    }
    rev
}

/// Ids whose parent is the space root.
pub fn roots(tree: &PageTree) -> Vec<PageId> {
    tree.iter()
        .filter(|(_, parent)| matches!(parent, Parent::Root))
        .map(|(id, _)| id.clone())
        .collect()
}

/// True if `id` appears as a parent value anywhere in `tree`.
pub fn is_parent_in(tree: &PageTree, id: &PageId) -> bool {
    tree.values().any(|parent| parent.page() == Some(id))
}
