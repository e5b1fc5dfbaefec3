//! Working-directory scanner: rebuilds the last-known snapshot from disk.
//!
//! Identity recovery is stateless. Each stored document carries one line
//! with its canonical source link ending in `/pages/<id>`; placement in the
//! directory tree supplies the parent. No sidecar index file exists or is
//! needed: whatever tree a run leaves on disk is the snapshot the next run
//! recovers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::core::{PageId, PageTree, Parent, TitleMap};

const DOC_EXT: &str = "md";
const LINK_MARKER: &str = "/pages/";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scan `root`, returning the recovered snapshot tree and title map.
pub fn scan_workdir(root: &Path) -> Result<(PageTree, TitleMap), ScanError> {
    let mut tree = PageTree::new();
    let mut titles = TitleMap::new();
    scan_dir(root, &Parent::Root, &mut tree, &mut titles)?;
    Ok((tree, titles))
}

fn scan_dir(
    dir: &Path,
    owner: &Parent,
    tree: &mut PageTree,
    titles: &mut TitleMap,
) -> Result<(), ScanError> {
    let read = |path: &Path, source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| read(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| read(dir, e))?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    // First pass: documents. Their ids anchor the subdirectory recursion.
    let mut docs: BTreeMap<String, PageId> = BTreeMap::new();
    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(DOC_EXT) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let text = fs::read_to_string(path).map_err(|e| read(path, e))?;
        match page_id_in(&text) {
            Some(id) => {
                tree.insert(id.clone(), owner.clone());
                titles.insert(id.clone(), stem.to_string());
                docs.insert(stem.to_string(), id);
            }
            None => warn!(path = %path.display(), "document carries no source link, skipping"),
        }
    }

    // Second pass: subdirectories anchor on their matching document.
    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !path.is_dir() {
            continue;
        }
        match docs.get(name) {
            Some(id) => scan_dir(path, &Parent::Page(id.clone()), tree, titles)?,
            None => warn!(path = %path.display(), "directory has no matching document, skipping"),
        }
    }

    Ok(())
}

/// Extract the page id from the embedded canonical source link, if present.
pub fn page_id_in(text: &str) -> Option<PageId> {
    for line in text.lines() {
        if let Some(idx) = line.rfind(LINK_MARKER) {
            let tail = &line[idx + LINK_MARKER.len()..];
            let id: String = tail
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if !id.is_empty() {
                return Some(PageId::new(id));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> String {
        format!("# Something\n\nbody\n\n[source](https://wiki.test/pages/{id})\n")
    }

    #[test]
    fn extracts_id_from_source_link() {
        assert_eq!(
            page_id_in("text\n[source](https://wiki.test/pages/123)\n"),
            Some(PageId::from("123"))
        );
        assert_eq!(page_id_in("no marker here"), None);
        assert_eq!(page_id_in("dangling /pages/"), None);
    }

    #[test]
    fn recovers_tree_and_titles_from_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("Alpha.md"), doc("1")).unwrap();
        fs::create_dir(root.join("Alpha")).unwrap();
        fs::write(root.join("Alpha/Beta.md"), doc("2")).unwrap();
        fs::create_dir(root.join("Alpha/Beta")).unwrap();
        fs::write(root.join("Alpha/Beta/Gamma.md"), doc("3")).unwrap();
        fs::write(root.join("Solo.md"), doc("4")).unwrap();
        // Hidden entries must never contribute.
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/Ghost.md"), doc("9")).unwrap();

        let (tree, titles) = scan_workdir(root).unwrap();

        assert_eq!(tree.get(&PageId::from("1")), Some(&Parent::Root));
        assert_eq!(
            tree.get(&PageId::from("2")),
            Some(&Parent::Page(PageId::from("1")))
        );
        assert_eq!(
            tree.get(&PageId::from("3")),
            Some(&Parent::Page(PageId::from("2")))
        );
        assert_eq!(tree.get(&PageId::from("4")), Some(&Parent::Root));
        assert!(!tree.contains_key(&PageId::from("9")));
        assert_eq!(titles.get(&PageId::from("2")).unwrap(), "Beta");
    }

    #[test]
    fn orphan_directory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("NoDoc")).unwrap();
        fs::write(root.join("NoDoc/Child.md"), doc("5")).unwrap();

        let (tree, _) = scan_workdir(root).unwrap();
        assert!(tree.is_empty());
    }
}
