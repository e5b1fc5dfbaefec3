//! Shared fixtures: an in-memory remote and an identity converter.

use std::collections::BTreeMap;
use std::path::Path;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use wikigit::convert::{ConvertError, Converter};
use wikigit::core::PageId;
use wikigit::remote::{
    PageContent, Remote, RemoteError, RemotePage, RemoteVersion, Space, VersionAuthor,
};

/// In-memory `Remote`. Pages added at the top level stay roots; children
/// are discovered through the child listing, exactly like the wire API.
#[derive(Default)]
pub struct FakeRemote {
    pub spaces: Vec<Space>,
    pages: BTreeMap<String, Vec<RemotePage>>,
    children: BTreeMap<PageId, Vec<RemotePage>>,
    versions: BTreeMap<PageId, Vec<RemoteVersion>>,
    content: BTreeMap<(PageId, u32), PageContent>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, space: &str, id: &str, title: &str) {
        self.pages.entry(space.to_string()).or_default().push(RemotePage {
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    pub fn add_child(&mut self, parent: &str, id: &str, title: &str) {
        self.children
            .entry(PageId::from(parent))
            .or_default()
            .push(RemotePage {
                id: id.to_string(),
                title: title.to_string(),
            });
    }

    pub fn add_version(
        &mut self,
        id: &str,
        number: u32,
        at: i64,
        author: &str,
        message: &str,
        title: &str,
        markup: &str,
    ) {
        let page = PageId::from(id);
        self.versions.entry(page.clone()).or_default().push(RemoteVersion {
            number,
            when: rfc3339(at),
            message: Some(message.to_string()),
            by: VersionAuthor {
                display_name: author.to_string(),
                username: Some(author.to_lowercase()),
                email: None,
            },
        });
        self.content
            .insert((page, number), PageContent::new(id, title, markup));
    }
}

impl Remote for FakeRemote {
    fn spaces(&self) -> Result<Vec<Space>, RemoteError> {
        Ok(self.spaces.clone())
    }

    fn pages(&self, space: &str) -> Result<Vec<RemotePage>, RemoteError> {
        Ok(self.pages.get(space).cloned().unwrap_or_default())
    }

    fn children(&self, page: &PageId) -> Result<Vec<RemotePage>, RemoteError> {
        Ok(self.children.get(page).cloned().unwrap_or_default())
    }

    fn versions(&self, page: &PageId) -> Result<Vec<RemoteVersion>, RemoteError> {
        Ok(self.versions.get(page).cloned().unwrap_or_default())
    }

    fn content_at(&self, page: &PageId, number: u32) -> Result<PageContent, RemoteError> {
        self.content
            .get(&(page.clone(), number))
            .cloned()
            .ok_or_else(|| RemoteError::Status {
                url: format!("fake://{page}@{number}"),
                status: 404,
            })
    }
}

/// Converter that passes markup through untouched.
pub struct IdentityConvert;

impl Converter for IdentityConvert {
    fn convert(&self, markup: &str, _canonical_url: &str) -> Result<String, ConvertError> {
        Ok(markup.to_string())
    }
}

pub fn rfc3339(at: i64) -> String {
    OffsetDateTime::from_unix_timestamp(at)
        .unwrap()
        .format(&Rfc3339)
        .unwrap()
}

pub fn commit_count(repo_dir: &Path) -> usize {
    let repo = git2::Repository::open(repo_dir).unwrap();
    let mut walk = repo.revwalk().unwrap();
    walk.push_head().unwrap();
    walk.count()
}

/// (message, author name, unix seconds) of the head commit.
pub fn head_commit(repo_dir: &Path) -> (String, String, i64) {
    let repo = git2::Repository::open(repo_dir).unwrap();
    let commit = repo.head().unwrap().peel_to_commit().unwrap();
    (
        commit.message().unwrap_or("").to_string(),
        commit.author().name().unwrap_or("").to_string(),
        commit.time().seconds(),
    )
}
