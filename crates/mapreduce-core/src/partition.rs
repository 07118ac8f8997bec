//! The sharded intermediate store: P partitions, each a mutex-guarded list
//! of key/value pairs kept in ascending key order, plus the single-reader
//! cursor used during the reduce phase.

use std::sync::Mutex;

use crate::hash::partitioner;

/// An owned intermediate key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

struct PartitionState {
    pairs: Vec<KeyValue>,
    /// Index into `pairs`; advanced only by `get_next` during reduce.
    cursor: usize,
}

struct Partition {
    state: Mutex<PartitionState>,
}

impl Partition {
    fn new() -> Self {
        Self { state: Mutex::new(PartitionState { pairs: Vec::new(), cursor: 0 }) }
    }

    /// Insert `(key, value)` in sorted position.
    ///
    /// Matches the reference `MR_Emit`'s asymmetric comparison: an empty
    /// list takes the pair as its head; a pair tying (or less than) the
    /// current head is prepended ahead of it; otherwise the list is walked
    /// while the current key is strictly less than the new key, and the
    /// pair spliced in there. Equal keys are therefore contiguous but not
    /// ordered by insertion time in any guaranteed way.
    fn emit(&self, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        let idx = if state.pairs.is_empty() || key <= state.pairs[0].key.as_str() {
            0
        } else {
            let mut i = 1;
            while i < state.pairs.len() && state.pairs[i].key.as_str() < key {
                i += 1;
            }
            i
        };
        state.pairs.insert(idx, KeyValue { key: key.to_string(), value: value.to_string() });
    }

    fn len(&self) -> usize {
        self.state.lock().unwrap().pairs.len()
    }

    fn reset_cursor(&self) {
        self.state.lock().unwrap().cursor = 0;
    }

    /// The key at the current cursor position, or `None` once exhausted.
    fn current_key(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.pairs.get(state.cursor).map(|kv| kv.key.clone())
    }

    /// Advance past the current pair if its key matches `key`, returning
    /// an owned copy of its value. Returns `None` without advancing the
    /// cursor if the current key differs (signals group exhaustion) or the
    /// partition is exhausted.
    fn get_next(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock().unwrap();
        match state.pairs.get(state.cursor) {
            Some(kv) if kv.key == key => {
                let value = kv.value.clone();
                state.cursor += 1;
                Some(value)
            }
            _ => None,
        }
    }

    /// A left-to-right snapshot of this partition's pairs, for tests and
    /// invariant checks; never called from map/reduce callback paths.
    fn snapshot(&self) -> Vec<KeyValue> {
        self.state.lock().unwrap().pairs.clone()
    }
}

/// The full array of P partitions for one `run()` call. Constructed fresh
/// per call and owned by the coordinator's stack frame (via `Arc`) rather
/// than kept as module-level state — see spec §9 / SPEC_FULL §5.
pub(crate) struct PartitionStore {
    partitions: Vec<Partition>,
}

impl PartitionStore {
    pub(crate) fn new(num_partitions: usize) -> Self {
        let partitions = (0..num_partitions).map(|_| Partition::new()).collect();
        Self { partitions }
    }

    pub(crate) fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Route `(key, value)` to `djb2(key) mod num_partitions` and insert it
    /// there, under that partition's lock only.
    pub(crate) fn emit(&self, key: &str, value: &str) {
        let idx = partitioner(key, self.partitions.len());
        self.partitions[idx].emit(key, value);
    }

    pub(crate) fn partition_len(&self, idx: usize) -> usize {
        self.partitions[idx].len()
    }

    pub(crate) fn get_next(&self, idx: usize, key: &str) -> Option<String> {
        self.partitions[idx].get_next(key)
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self, idx: usize) -> Vec<KeyValue> {
        self.partitions[idx].snapshot()
    }

    /// Drive one partition's reduce phase: reset its cursor to the head and
    /// invoke `reducer(key, partition_idx)` once per distinct key, relying
    /// on the reducer to drain same-key values via repeated `get_next`
    /// calls before returning.
    pub(crate) fn reduce_partition(&self, idx: usize, reducer: &(dyn Fn(&str, usize) + Send + Sync)) {
        self.partitions[idx].reset_cursor();
        while let Some(key) = self.partitions[idx].current_key() {
            reducer(&key, idx);
        }
    }
}
