use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::models::Event;

pub const DEFAULT_AUDIT_CAPACITY: usize = 500;

/// Bounded, append-only event history.
///
/// Entries are stored oldest-first and evicted FIFO once `capacity` is
/// reached. Every read path (iteration and serialization) yields them
/// newest-first. Serialization is one-way: the wire form carries no
/// capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog {
    entries: VecDeque<Event>,
    capacity: usize,
}

impl AuditLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY)),
            capacity,
        }
    }

    pub fn append(&mut self, event: Event) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().rev()
    }

    pub fn recent(&self, limit: usize) -> Vec<Event> {
        self.iter().take(limit).cloned().collect()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AUDIT_CAPACITY)
    }
}

impl Serialize for AuditLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(log: &AuditLog) -> Vec<String> {
        log.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_reads_are_newest_first() {
        let mut log = AuditLog::with_capacity(10);
        for i in 0..3 {
            log.append(Event::info("test", format!("event-{}", i)));
        }
        assert_eq!(messages(&log), vec!["event-2", "event-1", "event-0"]);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("event-2"));
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut log = AuditLog::with_capacity(3);
        for i in 0..5 {
            log.append(Event::info("test", format!("event-{}", i)));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(messages(&log), vec!["event-4", "event-3", "event-2"]);
    }

    #[test]
    fn test_recent_respects_limit() {
        let mut log = AuditLog::with_capacity(10);
        for i in 0..4 {
            log.append(Event::info("test", format!("event-{}", i)));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "event-3");
        assert_eq!(recent[1].message, "event-2");
    }

    #[test]
    fn test_serializes_newest_first() {
        let mut log = AuditLog::with_capacity(2);
        for message in ["first", "second", "third"] {
            log.append(Event::info("test", message));
        }

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0]["message"], "third");
        assert_eq!(json[1]["message"], "second");
        assert_eq!(log.capacity(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut log = AuditLog::with_capacity(0);
        log.append(Event::info("test", "a"));
        log.append(Event::info("test", "b"));
        assert_eq!(messages(&log), vec!["b"]);
    }
}
