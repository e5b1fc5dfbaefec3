//! Remote tree builder.
//!
//! Walks the space breadth-first from the page listing, growing the parent
//! map as children are discovered, and collects the filtered,
//! timestamp-grouped history of versions the run must replay.

use std::collections::{BTreeSet, VecDeque};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::core::{
    Author, History, PageId, PageTree, Parent, TitleMap, VersionEvent, sanitize_title,
};
use crate::remote::{Remote, RemoteError, RemoteVersion};

/// Everything a run needs to know about the remote side.
pub struct RemotePlan {
    /// Current hierarchy: page → parent.
    pub tree: PageTree,
    /// First-seen title per page, sanitized.
    pub titles: TitleMap,
    /// Versions to replay, grouped by timestamp.
    pub history: History,
}

/// Build the plan for `space`.
///
/// `old` is the snapshot recovered from disk and `checkpoint` the previous
/// run's last commit timestamp. A version is replayed iff its page is
/// brand-new to the run (backfill complete history for pages entering
/// scope) or it is strictly newer than the checkpoint (never re-emit
/// history a prior run already committed).
pub fn build(
    api: &dyn Remote,
    space: &str,
    old: &PageTree,
    checkpoint: Option<i64>,
    mail_domain: &str,
) -> Result<RemotePlan, crate::Error> {
    let mut tree = PageTree::new();
    let mut titles = TitleMap::new();
    let mut history = History::new();

    // Seed from the flat listing; pages stay roots until claimed as a child.
    let mut queue: VecDeque<PageId> = VecDeque::new();
    for page in api.pages(space)? {
        let id = PageId::new(page.id);
        titles
            .entry(id.clone())
            .or_insert_with(|| sanitize_title(&page.title, &id));
        tree.entry(id.clone()).or_insert(Parent::Root);
        queue.push_back(id);
    }

    let mut visited: BTreeSet<PageId> = BTreeSet::new();
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id.clone()) {
            continue;
        }

        for child in api.children(&id)? {
            let cid = PageId::new(child.id);
            titles
                .entry(cid.clone())
                .or_insert_with(|| sanitize_title(&child.title, &cid));
            tree.insert(cid.clone(), Parent::Page(id.clone()));
            queue.push_back(cid);
        }

        let known = old.contains_key(&id);
        for version in api.versions(&id)? {
            let event = to_event(&id, version, mail_domain)?;
            if !known || checkpoint.is_none_or(|cp| event.at > cp) {
                history.push(event);
            }
        }
    }

    info!(pages = tree.len(), events = history.len(), "remote plan built");
    Ok(RemotePlan {
        tree,
        titles,
        history,
    })
}

fn to_event(
    page: &PageId,
    version: RemoteVersion,
    mail_domain: &str,
) -> Result<VersionEvent, RemoteError> {
    let at = OffsetDateTime::parse(&version.when, &Rfc3339)
        .map_err(|e| RemoteError::Timestamp {
            page: page.clone(),
            number: version.number,
            raw: version.when.clone(),
            source: e,
        })?
        .unix_timestamp();
    let email = version.by.email.clone().unwrap_or_else(|| {
        let user = version
            .by
            .username
            .clone()
            .unwrap_or_else(|| mail_slug(&version.by.display_name));
        format!("{user}@{mail_domain}")
    });
    Ok(VersionEvent {
        page: page.clone(),
        number: version.number,
        author: Author {
            name: version.by.display_name,
            email,
        },
        at,
        message: version.message.unwrap_or_default(),
    })
}

fn mail_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '.'
            }
        })
        .collect();
    let slug = slug.trim_matches('.').to_string();
    if slug.is_empty() { "unknown".into() } else { slug }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mail_slug_squashes_non_alphanumerics() {
        assert_eq!(mail_slug("Jane Q. Doe"), "jane.q..doe");
        assert_eq!(mail_slug("  "), "unknown");
    }
}
