use crate::session::Subscriber;
use std::collections::HashMap;
use std::sync::Arc;

/// The subscriber list for one topic. Membership is tested by handle
/// identity, not by name, mirroring the source's pointer-identity linked
/// list rather than a name-keyed set.
#[derive(Debug, Default)]
pub struct SubscriberSet(Vec<Subscriber>);

impl SubscriberSet {
    pub fn new(first: Subscriber) -> Self {
        SubscriberSet(vec![first])
    }

    pub fn add(&mut self, subscriber: Subscriber) {
        if !self.contains(&subscriber) {
            self.0.push(subscriber);
        }
    }

    /// Removes a subscriber by identity. Returns whether it was present.
    pub fn remove(&mut self, subscriber: &Subscriber) -> bool {
        let before = self.0.len();
        self.0.retain(|entry| !Arc::ptr_eq(entry, subscriber));
        self.0.len() != before
    }

    pub fn contains(&self, subscriber: &Subscriber) -> bool {
        self.0.iter().any(|entry| Arc::ptr_eq(entry, subscriber))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this set has exactly one member - the case in which
    /// removing that member deletes the topic entry entirely.
    pub fn is_singleton(&self) -> bool {
        self.0.len() == 1
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber> {
        self.0.iter()
    }
}

/// Maps topic name to its subscriber set. Lookups and mutations always
/// happen with the owning mutex already held; see `server.rs` for the
/// lock-ordering contract this type is used under.
#[derive(Debug, Default)]
pub struct TopicTable(HashMap<Vec<u8>, SubscriberSet>);

impl TopicTable {
    pub fn new() -> Self {
        TopicTable(HashMap::new())
    }

    pub fn lookup(&self, topic: &[u8]) -> Option<&SubscriberSet> {
        self.0.get(topic)
    }

    pub fn lookup_mut(&mut self, topic: &[u8]) -> Option<&mut SubscriberSet> {
        self.0.get_mut(topic)
    }

    /// Adds a subscriber, creating the topic's entry if this is its first.
    pub fn subscribe(&mut self, topic: &[u8], subscriber: Subscriber) {
        self.0
            .entry(topic.to_vec())
            .and_modify(|set| set.add(Arc::clone(&subscriber)))
            .or_insert_with(|| SubscriberSet::new(subscriber));
    }

    /// Removes a subscriber from a topic. Returns whether it was present;
    /// a topic whose set becomes empty is dropped from the table.
    pub fn unsubscribe(&mut self, topic: &[u8], subscriber: &Subscriber) -> bool {
        let Some(set) = self.0.get_mut(topic) else {
            return false;
        };
        let removed = set.remove(subscriber);
        if set.is_empty() {
            self.0.remove(topic);
        }
        removed
    }

    /// Removes a subscriber from every topic it belongs to, used when a
    /// session tears down. Snapshotting the keys first avoids mutating the
    /// map while iterating it.
    pub fn remove_everywhere(&mut self, subscriber: &Subscriber) {
        let topics: Vec<Vec<u8>> = self.0.keys().cloned().collect();
        for topic in topics {
            if let Some(set) = self.0.get_mut(&topic) {
                set.remove(subscriber);
                if set.is_empty() {
                    self.0.remove(&topic);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionHandle;
    use std::net::{TcpListener, TcpStream};
    use std::sync::Mutex;

    fn fake_subscriber(name: &str) -> Subscriber {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();
        Arc::new(SessionHandle::new(
            name.as_bytes().to_vec(),
            Arc::new(Mutex::new(stream)),
        ))
    }

    #[test]
    fn subscribe_then_lookup_finds_subscriber() {
        let mut table = TopicTable::new();
        let sub = fake_subscriber("alice");
        table.subscribe(b"weather", Arc::clone(&sub));
        let set = table.lookup(b"weather").unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&sub));
    }

    #[test]
    fn subscribing_twice_is_idempotent() {
        let mut table = TopicTable::new();
        let sub = fake_subscriber("alice");
        table.subscribe(b"weather", Arc::clone(&sub));
        table.subscribe(b"weather", Arc::clone(&sub));
        assert_eq!(table.lookup(b"weather").unwrap().len(), 1);
    }

    #[test]
    fn is_singleton_reflects_exactly_one_member() {
        let mut table = TopicTable::new();
        let a = fake_subscriber("alice");
        table.subscribe(b"weather", Arc::clone(&a));
        assert!(table.lookup(b"weather").unwrap().is_singleton());

        let b = fake_subscriber("bob");
        table.subscribe(b"weather", Arc::clone(&b));
        assert!(!table.lookup(b"weather").unwrap().is_singleton());
    }

    #[test]
    fn unsubscribe_drops_empty_topic() {
        let mut table = TopicTable::new();
        let sub = fake_subscriber("alice");
        table.subscribe(b"weather", Arc::clone(&sub));
        assert!(table.unsubscribe(b"weather", &sub));
        assert!(table.lookup(b"weather").is_none());
    }

    #[test]
    fn unsubscribe_not_present_returns_false() {
        let mut table = TopicTable::new();
        let sub = fake_subscriber("alice");
        assert!(!table.unsubscribe(b"weather", &sub));
    }

    #[test]
    fn remove_everywhere_clears_all_topics() {
        let mut table = TopicTable::new();
        let sub = fake_subscriber("alice");
        table.subscribe(b"weather", Arc::clone(&sub));
        table.subscribe(b"news", Arc::clone(&sub));
        table.remove_everywhere(&sub);
        assert!(table.lookup(b"weather").is_none());
        assert!(table.lookup(b"news").is_none());
    }

    #[test]
    fn distinct_handles_with_same_name_are_distinct_subscribers() {
        let mut table = TopicTable::new();
        let a = fake_subscriber("dup");
        let b = fake_subscriber("dup");
        table.subscribe(b"weather", Arc::clone(&a));
        table.subscribe(b"weather", Arc::clone(&b));
        assert_eq!(table.lookup(b"weather").unwrap().len(), 2);
        assert!(table.unsubscribe(b"weather", &a));
        assert_eq!(table.lookup(b"weather").unwrap().len(), 1);
    }
}
