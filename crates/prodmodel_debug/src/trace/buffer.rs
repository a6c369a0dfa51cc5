//! Ring buffer for trace records.
//!
//! Keeps the most recent records up to a fixed size and answers queries by
//! pass number and event type. Pass numbers can drop back after a rewind, so
//! records are not assumed to be sorted by pass.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::record::{TraceEvent, TraceRecord};

// =============================================================================
// Trace Buffer
// =============================================================================

/// A ring buffer for storing trace records.
///
/// Maintains a fixed maximum size, discarding oldest records when full.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    /// The records, oldest first.
    records: VecDeque<TraceRecord>,
    /// Maximum number of records to store.
    max_size: usize,
    /// Next record ID to assign.
    next_id: u64,
    /// Buffered record count per pass. Passes with no records are absent.
    per_pass: BTreeMap<u64, usize>,
}

impl TraceBuffer {
    /// Creates a new trace buffer with the given maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
            per_pass: BTreeMap::new(),
        }
    }

    /// Creates a buffer with default size (10000 records).
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(10_000)
    }

    /// Pushes a new event to the buffer.
    ///
    /// Returns the assigned record ID. IDs keep increasing even when old
    /// records are evicted or the buffer is cleared.
    pub fn push(&mut self, pass: u64, timestamp_ns: u64, event: TraceEvent) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.records
            .push_back(TraceRecord::new(id, pass, timestamp_ns, event));
        *self.per_pass.entry(pass).or_insert(0) += 1;
        while self.records.len() > self.max_size {
            self.evict_oldest();
        }

        id
    }

    fn evict_oldest(&mut self) {
        let Some(record) = self.records.pop_front() else {
            return;
        };
        if let Some(count) = self.per_pass.get_mut(&record.pass) {
            *count -= 1;
            if *count == 0 {
                self.per_pass.remove(&record.pass);
            }
        }
    }

    /// Returns the number of records in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the maximum number of records kept.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Clears all records from the buffer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.per_pass.clear();
    }

    /// Returns an iterator over all records.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the record with the given ID, if still buffered.
    ///
    /// Buffered IDs are contiguous, so this is an offset from the oldest.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&TraceRecord> {
        let oldest = self.records.front()?.id;
        let offset = usize::try_from(id.checked_sub(oldest)?).ok()?;
        self.records.get(offset)
    }

    /// Returns how many buffered records belong to `pass`.
    #[must_use]
    pub fn pass_len(&self, pass: u64) -> usize {
        self.per_pass.get(&pass).copied().unwrap_or(0)
    }

    /// Returns records for a specific pass.
    #[must_use]
    pub fn records_for_pass(&self, pass: u64) -> Vec<&TraceRecord> {
        if self.pass_len(pass) == 0 {
            return Vec::new();
        }
        self.filter(|r| r.pass == pass)
    }

    /// Returns records in a pass range (inclusive). Empty if `first > last`.
    #[must_use]
    pub fn records_in_range(&self, first: u64, last: u64) -> Vec<&TraceRecord> {
        if first > last || self.per_pass.range(first..=last).next().is_none() {
            return Vec::new();
        }
        self.filter(|r| (first..=last).contains(&r.pass))
    }

    /// Returns the most recent N records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records matching a predicate.
    pub fn filter<F>(&self, predicate: F) -> Vec<&TraceRecord>
    where
        F: Fn(&TraceRecord) -> bool,
    {
        self.records.iter().filter(|r| predicate(r)).collect()
    }

    /// Returns records of a specific event type.
    #[must_use]
    pub fn by_event_type(&self, event_type: &str) -> Vec<&TraceRecord> {
        self.filter(|r| r.event_type() == event_type)
    }

    /// Returns all distinct pass numbers in the buffer, ascending.
    #[must_use]
    pub fn passes(&self) -> Vec<u64> {
        self.per_pass.keys().copied().collect()
    }

    /// Returns statistics about the buffer.
    #[must_use]
    pub fn stats(&self) -> TraceBufferStats {
        let mut event_counts = HashMap::new();
        for record in &self.records {
            *event_counts.entry(record.event_type()).or_insert(0) += 1;
        }

        TraceBufferStats {
            record_count: self.records.len(),
            max_size: self.max_size,
            oldest_pass: self.per_pass.keys().next().copied(),
            newest_pass: self.per_pass.keys().next_back().copied(),
            pass_count: self.per_pass.len(),
            event_counts,
        }
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::default_size()
    }
}

// =============================================================================
// Buffer Statistics
// =============================================================================

/// Statistics about a trace buffer.
#[derive(Clone, Debug)]
pub struct TraceBufferStats {
    /// Number of records currently in buffer.
    pub record_count: usize,
    /// Maximum buffer size.
    pub max_size: usize,
    /// Lowest pass number in buffer.
    pub oldest_pass: Option<u64>,
    /// Highest pass number in buffer.
    pub newest_pass: Option<u64>,
    /// Number of distinct passes.
    pub pass_count: usize,
    /// Count of each event type.
    pub event_counts: HashMap<&'static str, usize>,
}

impl TraceBufferStats {
    /// Returns how many records of `event_type` are buffered.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.event_counts.get(event_type).copied().unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
