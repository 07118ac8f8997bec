use std::io;
use std::path::PathBuf;

/// Errors surfaced by the MapReduce engine.
///
/// The engine performs no retry and no partial-result salvage: any of these
/// variants means the run did not complete and no reducer output should be
/// trusted.
#[derive(Debug, thiserror::Error)]
pub enum MapReduceError {
    /// `run()` was called with `num_workers == 0`.
    #[error("at least one worker thread is required")]
    NoWorkers,

    /// `run()` was called with `num_partitions == 0`.
    #[error("at least one partition is required")]
    NoPartitions,

    /// Stat'ing an input file failed before any job was submitted.
    #[error("failed to stat input file {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A job was submitted to a worker pool that has already begun shutdown.
    #[error("job submitted after worker pool shutdown")]
    PoolShutDown,
}
