//! Phrase frequency aggregation.

use std::collections::HashMap;

/// Index of a message in the analyzed input.
pub type MessageId = usize;

/// Running tally for one phrase key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateEntry {
    /// Normalized, prefixed phrase identity.
    pub key: String,
    /// Longest display form seen so far.
    pub display: String,
    /// Tokens spanned by the phrase.
    pub token_count: usize,
    /// Number of messages the phrase appeared in.
    pub count: usize,
    /// Messages the phrase appeared in, in input order.
    pub message_ids: Vec<MessageId>,
}

impl AggregateEntry {
    pub(crate) fn display_len(&self) -> usize {
        self.display.chars().count()
    }
}

/// Counts phrase occurrences across one analysis run.
///
/// Entries are kept in first-seen order so downstream selection is
/// deterministic for a given input.
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: Vec<AggregateEntry>,
    index: HashMap<String, usize>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `key` in message `message_id`.
    ///
    /// The stored display form is replaced only by a strictly longer one, so
    /// the first of several equally long variants wins.
    pub fn add_occurrence(
        &mut self,
        key: &str,
        display: &str,
        token_count: usize,
        message_id: MessageId,
    ) {
        if let Some(&slot) = self.index.get(key) {
            let entry = &mut self.entries[slot];
            entry.count += 1;
            if display.chars().count() > entry.display_len() {
                entry.display = display.to_string();
            }
            entry.message_ids.push(message_id);
            return;
        }

        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push(AggregateEntry {
            key: key.to_string(),
            display: display.to_string(),
            token_count,
            count: 1,
            message_ids: vec![message_id],
        });
    }

    /// Look up the tally for a key.
    pub fn get(&self, key: &str) -> Option<&AggregateEntry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the aggregator, yielding entries in first-seen order.
    pub fn into_entries(self) -> impl Iterator<Item = AggregateEntry> {
        self.entries.into_iter()
    }
}
