//! Bottom-up snapshot reconciliation: deletions and deferrable moves.
//!
//! One pass walks the reverse adjacency of the old snapshot so every parent
//! is visited only after all of its old-snapshot children. Deletions apply
//! only to pages genuinely gone from the new snapshot; moves apply only
//! when the destination is already resolvable, and are otherwise deferred
//! to a later pass (triggered by history replay inserting the missing
//! destination).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::Result;
use crate::core::{self, PageId, PageTree, Parent, TitleMap, path as page_path};
use crate::git::{CommitIdentity, CommitWriter};

/// Message used for every housekeeping commit.
pub const HOUSEKEEPING_MESSAGE: &str = "Delete/Move articles";
const HOUSEKEEPING_NAME: &str = "wikigit";

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct PassOutcome {
    pub moved: usize,
    pub deleted: usize,
}

impl PassOutcome {
    pub fn mutated(&self) -> bool {
        self.moved > 0 || self.deleted > 0
    }
}

/// Run one full bottom-up pass, converting `old` toward `new`.
///
/// If anything moved or was deleted, a single housekeeping commit is
/// created, timestamped at the head it builds on so it never disturbs the
/// chronological ordering implied by real history. Deleted ids are purged
/// from `old` once the pass completes.
pub fn reconcile_pass(
    old: &mut PageTree,
    new: &PageTree,
    titles: &TitleMap,
    git: &CommitWriter,
    mail_domain: &str,
) -> Result<PassOutcome> {
    let mut outcome = PassOutcome::default();
    let mut deleted: BTreeSet<PageId> = BTreeSet::new();

    let children = core::children_of(old);
    let order = post_order(&core::roots(old), &children);

    for id in &order {
        visit(id, old, new, titles, git, &mut deleted, &mut outcome)?;
    }

    if outcome.mutated() {
        let identity = housekeeping_identity(mail_domain, git)?;
        git.commit(&identity, HOUSEKEEPING_MESSAGE)?;
        info!(
            moved = outcome.moved,
            deleted = outcome.deleted,
            "housekeeping commit created"
        );
    }

    for id in &deleted {
        old.remove(id);
    }
    Ok(outcome)
}

/// Synthetic identity for housekeeping commits, constructed per call from
/// run context. Timestamp: the current head's (the commit it will build
/// on), or now for a repository with no history.
fn housekeeping_identity(mail_domain: &str, git: &CommitWriter) -> Result<CommitIdentity> {
    let at = match git.head_info()? {
        Some(head) => head.at,
        None => time::OffsetDateTime::now_utc().unix_timestamp(),
    };
    Ok(CommitIdentity {
        name: HOUSEKEEPING_NAME.into(),
        email: format!("{HOUSEKEEPING_NAME}@{mail_domain}"),
        at,
    })
}

/// Children before parents, starting from every old-snapshot root.
fn post_order(roots: &[PageId], children: &BTreeMap<PageId, Vec<PageId>>) -> Vec<PageId> {
    let mut out = Vec::new();
    let mut stack: Vec<(PageId, bool)> =
        roots.iter().rev().map(|r| (r.clone(), false)).collect();
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            out.push(id);
            continue;
        }
        stack.push((id.clone(), true));
        if let Some(kids) = children.get(&id) {
            for kid in kids.iter().rev() {
                stack.push((kid.clone(), false));
            }
        }
    }
    out
}

fn visit(
    id: &PageId,
    old: &mut PageTree,
    new: &PageTree,
    titles: &TitleMap,
    git: &CommitWriter,
    deleted: &mut BTreeSet<PageId>,
    outcome: &mut PassOutcome,
) -> Result<()> {
    match new.get(id) {
        None => {
            // Genuinely gone, or merely undiscovered? A page still named as
            // someone's parent in the new snapshot is the latter.
            if !core::is_parent_in(new, id) {
                delete_page(id, old, titles, git)?;
                deleted.insert(id.clone());
                outcome.deleted += 1;
            }
        }
        Some(new_parent) => {
            let parent_changed = old.get(id) != Some(new_parent);
            if parent_changed && destination_resolvable(new_parent, old) {
                move_page(id, new_parent.clone(), old, new, titles, git)?;
                outcome.moved += 1;
            }
            // Otherwise deferred: the destination parent does not exist in
            // this run yet. A pass after its insertion will retry.
        }
    }
    Ok(())
}

fn destination_resolvable(parent: &Parent, old: &PageTree) -> bool {
    match parent {
        Parent::Root => true,
        Parent::Page(p) => old.contains_key(p),
    }
}

fn delete_page(
    id: &PageId,
    old: &PageTree,
    titles: &TitleMap,
    git: &CommitWriter,
) -> Result<()> {
    let workdir = git.workdir();
    let page_rel = page_path::resolve(id, old, titles, None)?;
    let doc_rel = page_path::doc_file(&page_rel);
    let doc_abs = workdir.join(&doc_rel);
    if doc_abs.exists() {
        fs::remove_file(&doc_abs)?;
    }
    git.stage_removal(&doc_rel)?;
    prune_empty_dirs(workdir, &page_rel)?;
    debug!(page = %id, path = %doc_rel.display(), "deleted");
    Ok(())
}

fn move_page(
    id: &PageId,
    new_parent: Parent,
    old: &mut PageTree,
    new: &PageTree,
    titles: &TitleMap,
    git: &CommitWriter,
) -> Result<()> {
    let workdir = git.workdir();
    let src_rel = page_path::resolve(id, old, titles, None)?;
    old.insert(id.clone(), new_parent);
    // Destination resolves against the updated pointer; ancestors not yet
    // migrated fall back to the new snapshot.
    let dst_rel = page_path::resolve(id, old, titles, Some(new))?;

    let src_doc = page_path::doc_file(&src_rel);
    let dst_doc = page_path::doc_file(&dst_rel);
    if let Some(dir) = dst_rel.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(workdir.join(dir))?;
    }
    fs::rename(workdir.join(&src_doc), workdir.join(&dst_doc))?;
    git.stage_removal(&src_doc)?;
    git.stage(&dst_doc)?;

    // The child subdirectory travels with the document.
    let src_dir = workdir.join(&src_rel);
    if src_dir.is_dir() {
        fs::rename(&src_dir, workdir.join(&dst_rel))?;
        git.stage_removal(&src_rel)?;
        git.stage_all(&dst_rel)?;
    }

    prune_empty_dirs(workdir, &src_rel)?;
    debug!(page = %id, from = %src_doc.display(), to = %dst_doc.display(), "moved");
    Ok(())
}

/// Remove now-empty directories walking up from `rel` toward the workdir
/// root (exclusive). Missing directories are skipped, not errors.
fn prune_empty_dirs(workdir: &Path, rel: &Path) -> std::io::Result<()> {
    let mut cur: PathBuf = rel.to_path_buf();
    loop {
        if cur.as_os_str().is_empty() {
            break;
        }
        let abs = workdir.join(&cur);
        if abs.is_dir() {
            if fs::read_dir(&abs)?.next().is_some() {
                break;
            }
            fs::remove_dir(&abs)?;
        }
        match cur.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => cur = parent.to_path_buf(),
            _ => break,
        }
    }
    Ok(())
}
