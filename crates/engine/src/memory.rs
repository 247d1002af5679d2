//! Conversation memory: a bounded, chronological log of exchanges.

use chrono::{DateTime, Utc};
use lexguide_llm::ChatMessage;
use serde::Serialize;
use std::collections::VecDeque;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// Exchanges in insertion order. The oldest is dropped past `capacity`.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    exchanges: VecDeque<Exchange>,
    capacity: usize,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            exchanges: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        if self.exchanges.len() == self.capacity {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(Exchange {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        });
    }

    /// All exchanges, oldest first.
    pub fn history(&self) -> Vec<Exchange> {
        self.exchanges.iter().cloned().collect()
    }

    /// The last `exchanges` exchanges as alternating user/assistant messages.
    pub fn recent_messages(&self, exchanges: usize) -> Vec<ChatMessage> {
        let skip = self.exchanges.len().saturating_sub(exchanges);
        self.exchanges
            .iter()
            .skip(skip)
            .flat_map(|e| {
                [
                    ChatMessage::user(e.question.clone()),
                    ChatMessage::assistant(e.answer.clone()),
                ]
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn reset(&mut self) {
        self.exchanges.clear();
    }
}
