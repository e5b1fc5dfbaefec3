//! ureq-backed client for the wiki REST API.

use std::io::Read;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::PageId;

use super::types::{PageContent, Paged, RemotePage, RemoteVersion, Space};
use super::{Remote, RemoteError, RetryPolicy};

const PAGE_LIMIT: u32 = 25;

pub struct HttpRemote {
    agent: ureq::Agent,
    base: String,
    auth: String,
    retry: RetryPolicy,
}

impl HttpRemote {
    pub fn new(base: &str, user: &str, password: &str, retry: RetryPolicy) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        let auth = format!("Basic {}", BASE64.encode(format!("{user}:{password}")));
        Self {
            agent,
            base: base.trim_end_matches('/').to_string(),
            auth,
            retry,
        }
    }

    /// Base link of the wiki, used for canonical page URLs.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RemoteError> {
        self.retry.run(url, || {
            debug!(url, "GET");
            let resp = self
                .agent
                .get(url)
                .set("Authorization", &self.auth)
                .call()
                .map_err(|e| match e {
                    ureq::Error::Status(status, _) => RemoteError::Status {
                        url: url.to_string(),
                        status,
                    },
                    other => RemoteError::Transport {
                        url: url.to_string(),
                        source: Box::new(other),
                    },
                })?;
            let mut body = String::new();
            resp.into_reader()
                .read_to_string(&mut body)
                .map_err(|e| RemoteError::Decode {
                    url: url.to_string(),
                    source: e,
                })?;
            serde_json::from_str(&body).map_err(|e| RemoteError::Decode {
                url: url.to_string(),
                source: e.into(),
            })
        })
    }

    /// Follow offset+limit pagination while the response carries a next link.
    fn get_paged<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RemoteError> {
        let join = if path.contains('?') { '&' } else { '?' };
        let mut out = Vec::new();
        let mut start: u32 = 0;
        loop {
            let url = format!(
                "{}{path}{join}start={start}&limit={PAGE_LIMIT}",
                self.base
            );
            let page: Paged<T> = self.get_json(&url)?;
            out.extend(page.results);
            if page.links.next.is_none() {
                break;
            }
            start += PAGE_LIMIT;
        }
        Ok(out)
    }
}

impl Remote for HttpRemote {
    fn spaces(&self) -> Result<Vec<Space>, RemoteError> {
        self.get_paged("/rest/api/space")
    }

    fn pages(&self, space: &str) -> Result<Vec<RemotePage>, RemoteError> {
        self.get_paged(&format!("/rest/api/space/{space}/content/page"))
    }

    fn children(&self, page: &PageId) -> Result<Vec<RemotePage>, RemoteError> {
        self.get_paged(&format!("/rest/api/content/{page}/child/page"))
    }

    fn versions(&self, page: &PageId) -> Result<Vec<RemoteVersion>, RemoteError> {
        // The remote lists versions newest-first; normalize to oldest-first.
        let mut versions: Vec<RemoteVersion> =
            self.get_paged(&format!("/rest/api/content/{page}/version"))?;
        versions.sort_by_key(|v| v.number);
        Ok(versions)
    }

    fn content_at(&self, page: &PageId, number: u32) -> Result<PageContent, RemoteError> {
        let url = format!(
            "{}/rest/api/content/{page}?status=historical&version={number}&expand=body.storage",
            self.base
        );
        self.get_json(&url)
    }
}
