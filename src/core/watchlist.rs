//! The list of monitored funds.

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of fund ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Watchlist {
    ids: Vec<String>,
}

impl Watchlist {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Appends a fund id. Returns false for blank or already monitored ids.
    pub fn add(&mut self, fund_id: &str) -> bool {
        let id = fund_id.trim();
        if id.is_empty() || self.ids.iter().any(|existing| existing == id) {
            return false;
        }
        self.ids.push(id.to_string());
        true
    }

    /// Removes a fund id. Returns false when it was not monitored.
    pub fn remove(&mut self, fund_id: &str) -> bool {
        let id = fund_id.trim();
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        self.ids.len() != before
    }
}

impl From<Vec<String>> for Watchlist {
    fn from(ids: Vec<String>) -> Self {
        let mut list = Watchlist::default();
        for id in &ids {
            list.add(id);
        }
        list
    }
}

impl From<Watchlist> for Vec<String> {
    fn from(list: Watchlist) -> Self {
        list.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_order_and_rejects_duplicates() {
        let mut list = Watchlist::default();
        assert!(list.add("011102"));
        assert!(list.add(" 010434 "));
        assert!(!list.add("011102"));
        assert!(!list.add("   "));
        assert_eq!(list.ids(), ["011102", "010434"]);
    }

    #[test]
    fn test_remove() {
        let mut list = Watchlist::from(vec!["011102".to_string(), "010434".to_string()]);
        assert!(list.remove("011102"));
        assert!(!list.remove("011102"));
        assert_eq!(list.ids(), ["010434"]);
    }

    #[test]
    fn test_deserialization_normalizes_ids() {
        let list: Watchlist = serde_yaml::from_str("[\"011102\", \" 011102\", \"161725\"]").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.ids(), ["011102", "161725"]);
    }
}
