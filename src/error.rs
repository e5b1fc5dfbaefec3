use thiserror::Error;

use crate::convert::ConvertError;
use crate::core::CoreError;
use crate::git::GitError;
use crate::remote::RemoteError;
use crate::scan::ScanError;

/// Whether retrying this operation may succeed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transience {
    /// Retry will never help without changing inputs/state.
    Permanent,
    /// Retry may help (transient contention/outage).
    Retryable,
}

impl Transience {
    pub fn is_retryable(self) -> bool {
        matches!(self, Transience::Retryable)
    }
}

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over the per-stage errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn transience(&self) -> Transience {
        match self {
            Error::Remote(e) => e.transience(),
            // Everything outside the network is local state: retrying
            // without changing inputs cannot succeed.
            Error::Core(_)
            | Error::Scan(_)
            | Error::Convert(_)
            | Error::Git(_)
            | Error::Config(_)
            | Error::Io(_) => Transience::Permanent,
        }
    }
}
