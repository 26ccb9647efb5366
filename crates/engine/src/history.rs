// Evaluation history - an in-memory, reverse-chronological log of
// successfully evaluated expressions. Entries are immutable once recorded;
// the log is cleared wholesale or not at all.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One evaluated expression/result pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: u64,
    pub expression: String,
    pub result: String,
    /// Milliseconds since the Unix epoch, taken at record time.
    pub timestamp_ms: u64,
}

/// Reverse-chronological history log. Newest entry first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct History {
    items: Vec<HistoryItem>,
    next_id: u64,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful evaluation. Prepends, so `items()[0]` is always
    /// the most recent entry.
    pub fn record(&mut self, expression: &str, result: &str) -> &HistoryItem {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            0,
            HistoryItem {
                id,
                expression: expression.to_string(),
                result: result.to_string(),
                timestamp_ms: now_ms(),
            },
        );
        &self.items[0]
    }

    /// Entries, newest first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop the oldest entries until at most `max` remain. A `max` of zero
    /// means unbounded.
    pub fn truncate(&mut self, max: usize) {
        if max > 0 && self.items.len() > max {
            self.items.truncate(max);
        }
    }

    /// Wholesale clear. Ids keep counting up so restored references stay
    /// unambiguous within a session.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_prepends() {
        let mut history = History::new();
        history.record("1+1", "2");
        history.record("2+2", "4");
        history.record("3+3", "6");

        let items = history.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].expression, "3+3");
        assert_eq!(items[1].expression, "2+2");
        assert_eq!(items[2].expression, "1+1");
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut history = History::new();
        let a = history.record("1", "1").id;
        let b = history.record("2", "2").id;
        assert!(b > a);
    }

    #[test]
    fn test_get_by_id() {
        let mut history = History::new();
        let id = history.record("6*7", "42").id;
        history.record("0", "0");

        let item = history.get(id).unwrap();
        assert_eq!(item.expression, "6*7");
        assert_eq!(item.result, "42");
        assert!(history.get(9999).is_none());
    }

    #[test]
    fn test_truncate_drops_oldest() {
        let mut history = History::new();
        for i in 0..5 {
            history.record(&format!("{}", i), &format!("{}", i));
        }
        history.truncate(3);
        assert_eq!(history.len(), 3);
        // Newest survive
        assert_eq!(history.items()[0].expression, "4");
        assert_eq!(history.items()[2].expression, "2");

        // Zero means unbounded
        history.truncate(0);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_clear_empties() {
        let mut history = History::new();
        history.record("1+1", "2");
        history.record("2+2", "4");
        assert!(!history.is_empty());

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_ids_keep_counting_after_clear() {
        let mut history = History::new();
        let first = history.record("1", "1").id;
        history.clear();
        let second = history.record("2", "2").id;
        assert!(second > first);
    }
}
