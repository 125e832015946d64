use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Local};

use crate::message::MessageRecord;

/// Cumulative counters. Survive `MessageBuffer::clear`; only a restart resets them.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_messages: u64,
    pub start_time: DateTime<Local>,
    pub by_routing_key: BTreeMap<String, u64>,
    pub by_vhost: BTreeMap<String, u64>,
}

impl Statistics {
    fn new() -> Self {
        Self {
            total_messages: 0,
            start_time: Local::now(),
            by_routing_key: BTreeMap::new(),
            by_vhost: BTreeMap::new(),
        }
    }

    fn record(&mut self, rec: &MessageRecord) {
        self.total_messages += 1;
        *self.by_routing_key.entry(rec.routing_key.clone()).or_insert(0) += 1;
        *self.by_vhost.entry(rec.vhost.clone()).or_insert(0) += 1;
    }

    /// Routing keys ordered by descending count, ties by name.
    pub fn top_routing_keys(&self, n: usize) -> Vec<(&str, u64)> {
        top_counts(&self.by_routing_key, n)
    }

    /// Vhosts ordered by descending count, ties by name.
    pub fn top_vhosts(&self, n: usize) -> Vec<(&str, u64)> {
        top_counts(&self.by_vhost, n)
    }
}

fn top_counts(counts: &BTreeMap<String, u64>, n: usize) -> Vec<(&str, u64)> {
    let mut top: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    top.truncate(n);
    top
}

/// Newest-first store of intercepted messages, capped at `max_messages`.
#[derive(Debug, Clone)]
pub struct MessageBuffer {
    messages: VecDeque<MessageRecord>,
    max_messages: usize,
    stats: Statistics,
}

impl MessageBuffer {
    pub fn new(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
            stats: Statistics::new(),
        }
    }

    pub fn append(&mut self, rec: MessageRecord) {
        self.messages.push_front(rec);
        self.messages.truncate(self.max_messages);
        if let Some(newest) = self.messages.front() {
            self.stats.record(newest);
        }
    }

    /// Drops the retained messages; counters are left alone.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessageRecord> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(key: &str) -> MessageRecord {
        MessageRecord::from_delivery("/", "amq.topic", key, key.as_bytes())
    }

    fn keys(buf: &MessageBuffer) -> Vec<String> {
        buf.messages().map(|m| m.routing_key.clone()).collect()
    }

    #[test]
    fn oldest_entry_is_evicted_first() {
        let mut buf = MessageBuffer::new(3);
        for k in ["r1", "r2", "r3", "r4"] {
            buf.append(rec(k));
        }
        assert_eq!(keys(&buf), vec!["r4", "r3", "r2"]);
        assert_eq!(buf.statistics().total_messages, 4);
    }

    #[test]
    fn length_never_exceeds_cap_and_order_is_newest_first() {
        let mut buf = MessageBuffer::new(5);
        for i in 0..37 {
            buf.append(rec(&format!("k{i}")));
            assert!(buf.len() <= 5);
            let expected: Vec<String> = (0..=i)
                .rev()
                .take(5)
                .map(|j| format!("k{j}"))
                .collect();
            assert_eq!(keys(&buf), expected);
        }
        assert_eq!(buf.statistics().total_messages, 37);
    }

    #[test]
    fn clear_keeps_cumulative_counters() {
        let mut buf = MessageBuffer::new(10);
        buf.append(rec("orders.created"));
        buf.append(rec("orders.created"));
        buf.append(rec("billing.paid"));
        buf.clear();
        assert!(buf.is_empty());
        let stats = buf.statistics();
        assert_eq!(stats.total_messages, 3);
        assert_eq!(stats.by_routing_key["orders.created"], 2);
        assert_eq!(stats.by_vhost["/"], 3);
        assert_eq!(
            stats.top_routing_keys(1),
            vec![("orders.created", 2)]
        );
    }

    #[test]
    fn vhost_counts_span_sessions() {
        let mut buf = MessageBuffer::new(10);
        buf.append(MessageRecord::from_delivery("/shop", "amq.topic", "a", b"1"));
        buf.clear();
        for _ in 0..2 {
            buf.append(MessageRecord::from_delivery("/billing", "amq.topic", "b", b"2"));
        }
        assert_eq!(
            buf.statistics().top_vhosts(5),
            vec![("/billing", 2), ("/shop", 1)]
        );
        assert_eq!(buf.statistics().top_vhosts(1), vec![("/billing", 2)]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buf = MessageBuffer::new(0);
        buf.append(rec("a"));
        buf.append(rec("b"));
        assert_eq!(keys(&buf), vec!["b"]);
    }
}
