//! Remote content API collaborator.
//!
//! The engine only ever sees the `Remote` trait; `HttpRemote` is the
//! ureq-backed implementation speaking the wiki's REST dialect. Pagination,
//! authentication, and retries all live on this side of the seam.

mod http;
mod retry;
mod types;

pub use http::HttpRemote;
pub use retry::RetryPolicy;
pub use types::{PageContent, RemotePage, RemoteVersion, Space, VersionAuthor};

use thiserror::Error;

use crate::core::PageId;
use crate::error::Transience;

/// Errors that can occur talking to the remote API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("transport failure talking to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed timestamp {raw:?} on version {number} of page {page}: {source}")]
    Timestamp {
        page: PageId,
        number: u32,
        raw: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<RemoteError>,
    },
}

impl RemoteError {
    /// Whether retrying this fetch may succeed.
    pub fn transience(&self) -> Transience {
        match self {
            RemoteError::Transport { .. } => Transience::Retryable,
            RemoteError::Status { status, .. } if *status == 429 || *status >= 500 => {
                Transience::Retryable
            }
            RemoteError::Status { .. }
            | RemoteError::Decode { .. }
            | RemoteError::Timestamp { .. }
            | RemoteError::RetriesExhausted { .. } => Transience::Permanent,
        }
    }
}

/// Paginated remote endpoints the mirror needs.
///
/// Implementations must return versions oldest-first.
pub trait Remote {
    /// Top-level collections available to these credentials.
    fn spaces(&self) -> Result<Vec<Space>, RemoteError>;

    /// All pages currently in the space.
    fn pages(&self, space: &str) -> Result<Vec<RemotePage>, RemoteError>;

    /// Direct children of a page.
    fn children(&self, page: &PageId) -> Result<Vec<RemotePage>, RemoteError>;

    /// Full version history of a page, oldest first.
    fn versions(&self, page: &PageId) -> Result<Vec<RemoteVersion>, RemoteError>;

    /// Content exactly as of the given version number, not the live content.
    fn content_at(&self, page: &PageId, number: u32) -> Result<PageContent, RemoteError>;
}
