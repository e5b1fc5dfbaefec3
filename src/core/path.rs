//! Hierarchical path resolution over snapshot trees.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::CoreError;
use super::id::{PageId, Parent};
use super::tree::{PageTree, TitleMap};

/// Resolve the working-directory path of `id`: the join of ancestor titles
/// from the root down to the page.
///
/// Parent lookup prefers `tree` and falls back to `alt`, so a destination
/// path can be computed for a page whose ancestors have not all been
/// migrated into the primary snapshot yet.
///
/// Titles must be populated for every page on the chain; a missing title or
/// an unresolvable parent is a precondition violation, not a recoverable
/// condition. Cycles are detected with a visited set rather than trusted to
/// bounded recursion.
pub fn resolve(
    id: &PageId,
    tree: &PageTree,
    titles: &TitleMap,
    alt: Option<&PageTree>,
) -> Result<PathBuf, CoreError> {
    let mut segments: Vec<&str> = Vec::new();
    let mut seen: BTreeSet<PageId> = BTreeSet::new();
    let mut cur = id.clone();
    loop {
        if !seen.insert(cur.clone()) {
            return Err(CoreError::ParentCycle(id.clone()));
        }
        let title = titles
            .get(&cur)
            .ok_or_else(|| CoreError::MissingTitle(cur.clone()))?;
        segments.push(title);
        let parent = tree
            .get(&cur)
            .or_else(|| alt.and_then(|t| t.get(&cur)))
            .ok_or_else(|| CoreError::UnresolvableParent(cur.clone()))?;
        match parent {
            Parent::Root => break,
            Parent::Page(p) => cur = p.clone(),
        }
    }
    Ok(segments.into_iter().rev().collect())
}

/// The stored document for a page path: `a/b/C` → `a/b/C.md`.
///
/// Not `set_extension`: titles may legitimately contain dots.
pub fn doc_file(page_path: &Path) -> PathBuf {
    let mut name = page_path.as_os_str().to_os_string();
    name.push(".md");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PageId {
        PageId::from(s)
    }

    fn fixture() -> (PageTree, TitleMap) {
        let mut tree = PageTree::new();
        let mut titles = TitleMap::new();
        tree.insert(id("a"), Parent::Root);
        tree.insert(id("b"), Parent::Page(id("a")));
        tree.insert(id("c"), Parent::Page(id("b")));
        titles.insert(id("a"), "Alpha".into());
        titles.insert(id("b"), "Beta".into());
        titles.insert(id("c"), "Gamma".into());
        (tree, titles)
    }

    #[test]
    fn root_page_path_is_its_title() {
        let (tree, titles) = fixture();
        assert_eq!(
            resolve(&id("a"), &tree, &titles, None).unwrap(),
            PathBuf::from("Alpha")
        );
    }

    #[test]
    fn nested_path_joins_ancestor_titles() {
        let (tree, titles) = fixture();
        assert_eq!(
            resolve(&id("c"), &tree, &titles, None).unwrap(),
            PathBuf::from("Alpha/Beta/Gamma")
        );
    }

    #[test]
    fn alt_tree_supplies_missing_parents() {
        let (tree, mut titles) = fixture();
        // "d" is only known to the alternate snapshot.
        let mut alt = PageTree::new();
        alt.insert(id("d"), Parent::Page(id("b")));
        titles.insert(id("d"), "Delta".into());
        assert_eq!(
            resolve(&id("d"), &tree, &titles, Some(&alt)).unwrap(),
            PathBuf::from("Alpha/Beta/Delta")
        );
    }

    #[test]
    fn missing_title_fails_fast() {
        let (tree, mut titles) = fixture();
        titles.remove(&id("b"));
        assert!(matches!(
            resolve(&id("c"), &tree, &titles, None),
            Err(CoreError::MissingTitle(_))
        ));
    }

    #[test]
    fn cyclic_parent_chain_is_detected() {
        let mut tree = PageTree::new();
        let mut titles = TitleMap::new();
        tree.insert(id("a"), Parent::Page(id("b")));
        tree.insert(id("b"), Parent::Page(id("a")));
        titles.insert(id("a"), "A".into());
        titles.insert(id("b"), "B".into());
        assert!(matches!(
            resolve(&id("a"), &tree, &titles, None),
            Err(CoreError::ParentCycle(_))
        ));
    }

    #[test]
    fn doc_file_appends_extension_without_clobbering_dots() {
        assert_eq!(doc_file(Path::new("a/b/v1.2")), PathBuf::from("a/b/v1.2.md"));
    }
}
