//! Staging and commit creation.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, IndexAddOption, Oid, Repository, Signature, Time};
use tracing::debug;

use super::error::GitError;

/// Safety snapshot of the head, written before a run mutates anything.
pub const BACKUP_REF: &str = "refs/wikigit/backup";

/// Author/committer identity with a fixed-offset timestamp (unix seconds).
#[derive(Clone, Debug)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
    pub at: i64,
}

/// Head author + timestamp; the timestamp is the replay checkpoint.
#[derive(Clone, Debug)]
pub struct HeadInfo {
    pub author_name: String,
    pub author_email: String,
    pub at: i64,
}

pub struct CommitWriter {
    repo: Repository,
    workdir: PathBuf,
}

impl CommitWriter {
    /// Open the repository at `path`, initializing a fresh one if absent.
    pub fn open_or_init(path: &Path) -> Result<Self, GitError> {
        let repo = match Repository::open(path) {
            Ok(repo) => repo,
            Err(_) => Repository::init(path).map_err(|e| GitError::Open(path.to_path_buf(), e))?,
        };
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::Bare(path.to_path_buf()))?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Author and timestamp of the current head, if any commit exists.
    pub fn head_info(&self) -> Result<Option<HeadInfo>, GitError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let commit = head.peel_to_commit()?;
        let author = commit.author();
        Ok(Some(HeadInfo {
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            at: commit.time().seconds(),
        }))
    }

    /// Snapshot the current head under a named safety ref.
    pub fn backup_head(&self) -> Result<(), GitError> {
        if let Ok(head) = self.repo.head()
            && let Some(oid) = head.target()
        {
            self.repo
                .reference(BACKUP_REF, oid, true, "pre-run safety snapshot")?;
            debug!(oid = %oid, "head snapshotted to {BACKUP_REF}");
        }
        Ok(())
    }

    fn rel<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.workdir).unwrap_or(path)
    }

    /// Stage one file.
    pub fn stage(&self, path: &Path) -> Result<(), GitError> {
        let rel = self.rel(path).to_path_buf();
        let mut index = self.repo.index()?;
        index.add_path(&rel).map_err(|e| GitError::Stage {
            path: rel.clone(),
            source: e,
        })?;
        index.write()?;
        Ok(())
    }

    /// Stage everything under a path (after a directory move).
    pub fn stage_all(&self, path: &Path) -> Result<(), GitError> {
        let rel = self.rel(path).to_path_buf();
        let mut index = self.repo.index()?;
        index
            .add_all([rel.as_path()], IndexAddOption::DEFAULT, None)
            .map_err(|e| GitError::Stage {
                path: rel.clone(),
                source: e,
            })?;
        index.write()?;
        Ok(())
    }

    /// Stage the removal of a path (file or whole directory tree).
    pub fn stage_removal(&self, path: &Path) -> Result<(), GitError> {
        let rel = self.rel(path).to_path_buf();
        let mut index = self.repo.index()?;
        index
            .remove_all([rel.as_path()], None)
            .map_err(|e| GitError::Stage {
            path: rel.clone(),
            source: e,
        })?;
        index.write()?;
        Ok(())
    }

    /// Commit the current index with the current head as sole parent (none
    /// for the first commit). Returns the new head id.
    pub fn commit(&self, identity: &CommitIdentity, message: &str) -> Result<Oid, GitError> {
        let sig = Signature::new(&identity.name, &identity.email, &Time::new(identity.at, 0))
            .map_err(|e| GitError::Signature {
                name: identity.name.clone(),
                email: identity.email.clone(),
                source: e,
            })?;
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(GitError::Commit)?;
        debug!(commit = %oid, message, "created commit");
        Ok(oid)
    }
}
