//! Git layer error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GitError {
    #[error("failed to open or init repository at {0}: {1}")]
    Open(PathBuf, #[source] git2::Error),

    #[error("repository at {0} has no working directory")]
    Bare(PathBuf),

    #[error("failed to stage {path}: {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("invalid signature for {name} <{email}>: {source}")]
    Signature {
        name: String,
        email: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to create commit: {0}")]
    Commit(#[source] git2::Error),

    #[error("git operation failed: {0}")]
    Git(#[from] git2::Error),
}
