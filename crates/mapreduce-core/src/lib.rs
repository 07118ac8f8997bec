//! An in-process MapReduce execution engine: a priority job queue, a fixed
//! worker pool, and a sharded intermediate key/value store, coordinated
//! through a two-phase map/reduce barrier.
//!
//! Callers provide a mapper and a reducer as plain closures; the engine
//! threads an explicit context handle (`EmitCtx`, `ReduceCtx`) through each
//! call instead of relying on global state, so a single process can run
//! more than one `run()` concurrently without interference.

mod error;
mod hash;
mod job;
mod partition;
mod pool;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use error::MapReduceError;
pub use hash::{djb2, partitioner};

use partition::PartitionStore;
use pool::WorkerPool;

/// Handle passed to a mapper: the only way to produce intermediate pairs.
pub struct EmitCtx<'a> {
    store: &'a PartitionStore,
}

impl EmitCtx<'_> {
    /// Route `(key, value)` to its partition and insert it in sorted order.
    pub fn emit(&self, key: &str, value: &str) {
        self.store.emit(key, value);
    }
}

/// Handle passed to a reducer: pulls successive values for the key the
/// reducer is currently grouping.
pub struct ReduceCtx<'a> {
    store: &'a PartitionStore,
    partition: usize,
}

impl ReduceCtx<'_> {
    /// Returns the next value for `key` in this reducer's partition, or
    /// `None` once every pair with that key has been consumed.
    pub fn get_next(&self, key: &str) -> Option<String> {
        self.store.get_next(self.partition, key)
    }

    /// The index of the partition this reduce job is draining, for
    /// reducers that key their output (e.g. per-partition result files) by
    /// partition number.
    pub fn partition(&self) -> usize {
        self.partition
    }
}

/// Run a full map/reduce job to completion.
///
/// `files` are mapped one job per file, ordered smallest-first by byte size.
/// `mapper` is invoked once per file with its path and an [`EmitCtx`].
/// After every map job has run and the pool has gone idle, one reduce job
/// per partition is submitted, ordered smallest-first by pair count;
/// `reducer` is invoked once per distinct key in its partition (grouping is
/// the reducer's responsibility via repeated `ReduceCtx::get_next` calls).
///
/// Returns once both phases have drained and the pool has shut down.
pub fn run<M, R>(
    files: &[PathBuf],
    mapper: M,
    reducer: R,
    num_workers: usize,
    num_partitions: usize,
) -> Result<(), MapReduceError>
where
    M: Fn(&Path, &EmitCtx) + Send + Sync + 'static,
    R: Fn(&str, &ReduceCtx) + Send + Sync + 'static,
{
    if num_workers == 0 {
        return Err(MapReduceError::NoWorkers);
    }
    if num_partitions == 0 {
        return Err(MapReduceError::NoPartitions);
    }

    let mut sized_files = Vec::with_capacity(files.len());
    for path in files {
        let meta = fs::metadata(path)
            .map_err(|source| MapReduceError::Stat { path: path.clone(), source })?;
        sized_files.push((path.clone(), meta.len()));
    }

    let store = Arc::new(PartitionStore::new(num_partitions));
    let mapper = Arc::new(mapper);
    let reducer = Arc::new(reducer);

    tracing::info!(
        num_files = sized_files.len(),
        num_workers,
        num_partitions,
        "map phase starting"
    );

    let pool = WorkerPool::new(num_workers);

    for (path, size) in sized_files {
        let store = Arc::clone(&store);
        let mapper = Arc::clone(&mapper);
        pool.add_job(size, move || {
            let ctx = EmitCtx { store: store.as_ref() };
            mapper(&path, &ctx);
        })?;
    }
    pool.check();
    tracing::info!("map phase complete, starting reduce phase");

    let mut partitions: Vec<usize> = (0..store.num_partitions()).collect();
    partitions.sort_by_key(|&idx| store.partition_len(idx));

    for idx in partitions {
        let store = Arc::clone(&store);
        let reducer = Arc::clone(&reducer);
        let length = store.partition_len(idx) as u64;
        pool.add_job(length, move || {
            store.reduce_partition(idx, &move |key, partition| {
                let ctx = ReduceCtx { store: store.as_ref(), partition };
                reducer(key, &ctx);
            });
        })?;
    }
    pool.check();
    tracing::info!("reduce phase complete");

    drop(pool);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn write_temp(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn word_count_single_file_single_partition() {
        let dir = tempfile_dir();
        let file = write_temp(&dir, "in.txt", "a b a c a b");

        let results: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let results_for_reduce = Arc::clone(&results);

        run(
            &[file],
            |path, ctx| {
                let text = fs::read_to_string(path).unwrap();
                for word in text.split_whitespace() {
                    ctx.emit(word, "1");
                }
            },
            move |key, ctx| {
                let mut count = 0;
                while ctx.get_next(key).is_some() {
                    count += 1;
                }
                results_for_reduce.lock().unwrap().push((key.to_string(), count));
            },
            1,
            1,
        )
        .unwrap();

        let mut got = results.lock().unwrap().clone();
        got.sort();
        assert_eq!(
            got,
            vec![("a".to_string(), 3), ("b".to_string(), 2), ("c".to_string(), 1)]
        );
    }

    #[test]
    fn rejects_zero_workers_and_zero_partitions() {
        assert!(matches!(
            run(&[], |_: &Path, _: &EmitCtx| {}, |_, _: &ReduceCtx| {}, 0, 1),
            Err(MapReduceError::NoWorkers)
        ));
        assert!(matches!(
            run(&[], |_: &Path, _: &EmitCtx| {}, |_, _: &ReduceCtx| {}, 1, 0),
            Err(MapReduceError::NoPartitions)
        ));
    }

    #[test]
    fn empty_file_list_completes_with_no_output() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        run(
            &[],
            |_: &Path, _: &EmitCtx| {},
            move |_, _: &ReduceCtx| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            },
            2,
            4,
        )
        .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_input_file_reports_stat_error() {
        let result = run(
            &[PathBuf::from("/nonexistent/path/does-not-exist.txt")],
            |_: &Path, _: &EmitCtx| {},
            |_, _: &ReduceCtx| {},
            1,
            1,
        );
        assert!(matches!(result, Err(MapReduceError::Stat { .. })));
    }

    fn tempfile_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "mapreduce-core-test-{:?}",
            std::thread::current().id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
