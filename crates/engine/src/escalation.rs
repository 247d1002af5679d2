//! Per-question escalation from clarification to general knowledge.

use moka::sync::Cache;
use std::fmt;

/// What to do after a question produced no usable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Ask the user for more detail; `attempt` is the new count.
    Clarify { attempt: u32 },
    /// Attempts exhausted; the count is back to zero.
    GeneralKnowledge,
}

/// Counts consecutive misses per normalized question.
///
/// Counts live in a bounded cache; once `capacity` questions are tracked,
/// the cache evicts entries by its own admission policy. A question with no
/// entry has count 0.
pub struct EscalationTracker {
    max_attempts: u32,
    capacity: u64,
    counts: Cache<String, u32>,
}

impl EscalationTracker {
    pub fn new(max_attempts: u32, capacity: usize) -> Self {
        let capacity = capacity.max(1) as u64;
        Self {
            max_attempts,
            capacity,
            counts: build_cache(capacity),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Current count for `question`.
    pub fn attempts(&self, question: &str) -> u32 {
        self.counts.get(&normalize_question(question)).unwrap_or(0)
    }

    /// Record a miss and decide the response.
    pub fn record_miss(&mut self, question: &str) -> Escalation {
        let key = normalize_question(question);
        let count = self.counts.get(&key).unwrap_or(0);

        if count < self.max_attempts {
            let attempt = count + 1;
            self.counts.insert(key, attempt);
            Escalation::Clarify { attempt }
        } else {
            self.counts.invalidate(&key);
            Escalation::GeneralKnowledge
        }
    }

    /// Record a successful retrieval; the count returns to zero.
    pub fn record_success(&mut self, question: &str) {
        self.counts.invalidate(&normalize_question(question));
    }

    pub fn clear(&mut self) {
        self.counts = build_cache(self.capacity);
    }

    /// Number of questions with a non-zero count.
    pub fn len(&self) -> usize {
        self.counts.run_pending_tasks();
        self.counts.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EscalationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscalationTracker")
            .field("max_attempts", &self.max_attempts)
            .field("capacity", &self.capacity)
            .field("entries", &self.counts.entry_count())
            .finish()
    }
}

fn build_cache(capacity: u64) -> Cache<String, u32> {
    Cache::builder().max_capacity(capacity).build()
}

/// Lowercase, collapse whitespace and drop trailing punctuation.
pub fn normalize_question(question: &str) -> String {
    let collapsed = question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    collapsed
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}
