//! Version events and the timestamp-grouped history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::PageId;

/// Author identity attached to a version event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// One historical revision of a page, replayed as exactly one commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionEvent {
    pub page: PageId,
    pub number: u32,
    pub author: Author,
    /// Unix seconds at a fixed UTC offset. Second precision is all the
    /// remote guarantees.
    pub at: i64,
    pub message: String,
}

/// Version events grouped by timestamp, ascending.
///
/// Within one timestamp bucket the Vec preserves discovery order; the source
/// offers no finer total order and none is invented here.
#[derive(Debug, Default)]
pub struct History {
    groups: BTreeMap<i64, Vec<VersionEvent>>,
    len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: VersionEvent) {
        self.groups.entry(event.at).or_default().push(event);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ascending by timestamp, discovery order within one timestamp.
    pub fn iter(&self) -> impl Iterator<Item = &VersionEvent> {
        self.groups.values().flat_map(|group| group.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(page: &str, number: u32, at: i64) -> VersionEvent {
        VersionEvent {
            page: PageId::from(page),
            number,
            author: Author {
                name: "tester".into(),
                email: "tester@wiki.test".into(),
            },
            at,
            message: String::new(),
        }
    }

    #[test]
    fn iterates_ascending_with_discovery_order_ties() {
        let mut history = History::new();
        history.push(event("a", 2, 200));
        history.push(event("b", 1, 100));
        history.push(event("c", 1, 200));
        history.push(event("a", 1, 50));

        let order: Vec<(String, u32)> = history
            .iter()
            .map(|e| (e.page.as_str().to_string(), e.number))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".into(), 1),
                ("b".into(), 1),
                ("a".into(), 2), // pushed before c at the same timestamp
                ("c".into(), 1),
            ]
        );
        assert_eq!(history.len(), 4);
    }
}
