//! Bounded top-K selection.
//!
//! A year of chat can produce hundreds of thousands of distinct phrases,
//! almost all seen once. [`TopK`] keeps at most `capacity` of them in an
//! array-backed binary min-heap whose root is the weakest kept entry, so a
//! new entry only has to beat the root to get in.
//!
//! When more than `capacity` entries tie near the boundary, which of them
//! survive depends on arrival order. The result is an approximate top-N in
//! that case; exact selection would need memory proportional to the
//! vocabulary.

use std::cmp::Ordering;

use crate::aggregate::AggregateEntry;

/// Total order on entries: count, then token span, then display length.
fn rank(a: &AggregateEntry, b: &AggregateEntry) -> Ordering {
    a.count
        .cmp(&b.count)
        .then_with(|| a.token_count.cmp(&b.token_count))
        .then_with(|| a.display_len().cmp(&b.display_len()))
}

/// Whether `a` ranks strictly below `b`.
pub fn is_worse(a: &AggregateEntry, b: &AggregateEntry) -> bool {
    rank(a, b) == Ordering::Less
}

/// Fixed-capacity min-heap of the best entries offered so far.
#[derive(Debug)]
pub struct TopK {
    capacity: usize,
    heap: Vec<AggregateEntry>,
}

impl TopK {
    /// Create a selector that keeps at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            heap: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries currently kept.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no entry is kept.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// The weakest kept entry.
    pub fn peek_worst(&self) -> Option<&AggregateEntry> {
        self.heap.first()
    }

    /// Offer an entry; it is kept if there is room or it beats the root.
    pub fn offer(&mut self, entry: AggregateEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            self.sift_up(self.heap.len() - 1);
            return;
        }
        if is_worse(&self.heap[0], &entry) {
            self.heap[0] = entry;
            self.sift_down(0);
        }
    }

    /// Kept entries, best first, truncated to `top_n`.
    ///
    /// Entries that tie on every ranking criterion are ordered by display
    /// text so output is stable across runs.
    pub fn into_sorted(self, top_n: usize) -> Vec<AggregateEntry> {
        let mut entries = self.heap;
        entries.sort_by(|a, b| rank(b, a).then_with(|| a.display.cmp(&b.display)));
        entries.truncate(top_n);
        entries
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !is_worse(&self.heap[i], &self.heap[parent]) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && is_worse(&self.heap[left], &self.heap[smallest]) {
                smallest = left;
            }
            if right < len && is_worse(&self.heap[right], &self.heap[smallest]) {
                smallest = right;
            }
            if smallest == i {
                break;
            }
            self.heap.swap(i, smallest);
            i = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(display: &str, token_count: usize, count: usize) -> AggregateEntry {
        AggregateEntry {
            key: format!("t:{display}"),
            display: display.to_string(),
            token_count,
            count,
            message_ids: Vec::new(),
        }
    }

    #[test]
    fn is_worse_orders_by_count_then_tokens_then_length() {
        assert!(is_worse(&entry("ああ", 1, 1), &entry("ああ", 1, 2)));
        assert!(is_worse(&entry("ああああ", 1, 2), &entry("ああ", 2, 2)));
        assert!(is_worse(&entry("ああ", 2, 2), &entry("あああ", 2, 2)));
        assert!(!is_worse(&entry("ああ", 2, 2), &entry("いい", 2, 2)));
    }

    #[test]
    fn keeps_everything_under_capacity() {
        let mut topk = TopK::with_capacity(10);
        for i in 0..5 {
            topk.offer(entry(&format!("phrase{i}"), 1, i + 1));
        }
        assert_eq!(topk.len(), 5);
        let sorted = topk.into_sorted(30);
        let counts: Vec<_> = sorted.iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn never_grows_past_capacity() {
        let mut topk = TopK::with_capacity(600);
        for i in 0..5_000 {
            topk.offer(entry(&format!("phrase{i}"), 1, 1));
            assert!(topk.len() <= 600);
        }
        assert_eq!(topk.len(), 600);
    }

    #[test]
    fn root_is_weakest_and_better_entries_replace_it() {
        let mut topk = TopK::with_capacity(3);
        topk.offer(entry("a", 1, 5));
        topk.offer(entry("b", 1, 2));
        topk.offer(entry("c", 1, 9));
        assert_eq!(topk.peek_worst().unwrap().count, 2);

        topk.offer(entry("d", 1, 1));
        assert_eq!(topk.peek_worst().unwrap().count, 2);

        topk.offer(entry("e", 1, 7));
        assert_eq!(topk.peek_worst().unwrap().count, 5);

        let counts: Vec<_> = topk.into_sorted(30).iter().map(|e| e.count).collect();
        assert_eq!(counts, vec![9, 7, 5]);
    }

    #[test]
    fn equal_entries_do_not_replace_root() {
        let mut topk = TopK::with_capacity(1);
        topk.offer(entry("first", 1, 3));
        topk.offer(entry("other", 1, 3));
        assert_eq!(topk.into_sorted(1)[0].display, "first");
    }

    #[test]
    fn sorted_output_breaks_count_ties_by_token_span() {
        let mut topk = TopK::with_capacity(10);
        topk.offer(entry("短い", 1, 4));
        topk.offer(entry("長いフレーズ", 3, 4));
        topk.offer(entry("中くらい", 2, 4));
        let order: Vec<_> = topk
            .into_sorted(30)
            .into_iter()
            .map(|e| e.token_count)
            .collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn truncates_to_top_n() {
        let mut topk = TopK::with_capacity(100);
        for i in 0..50 {
            topk.offer(entry(&format!("p{i}"), 1, i));
        }
        let sorted = topk.into_sorted(30);
        assert_eq!(sorted.len(), 30);
        assert_eq!(sorted[0].count, 49);
        assert_eq!(sorted[29].count, 20);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut topk = TopK::with_capacity(0);
        topk.offer(entry("a", 1, 1));
        assert!(topk.is_empty());
    }
}
