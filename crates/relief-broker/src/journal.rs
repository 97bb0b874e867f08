//! Bounded in-memory record of accepted messages.
//!
//! The journal is an inspection aid for drivers and tests. It is not a
//! replay log: nothing is ever redelivered from it.

use std::collections::VecDeque;

use relief_types::{Message, Topic};

/// Ring buffer of the most recent accepted messages, oldest first.
#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<Message>,
    capacity: usize,
}

impl Journal {
    /// Create an empty journal holding at most `capacity` messages.
    ///
    /// A capacity of zero disables journaling.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a message, evicting the oldest one when full.
    pub fn push(&mut self, message: Message) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// Every retained message, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.entries.iter().cloned().collect()
    }

    /// Retained messages published on `topic`, oldest first.
    pub fn on_topic(&self, topic: &Topic) -> Vec<Message> {
        self.entries
            .iter()
            .filter(|m| m.topic() == topic)
            .cloned()
            .collect()
    }

    /// Number of retained messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
