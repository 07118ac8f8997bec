//! Fixed-size worker pool: N threads pulling jobs off a shared, mutex-guarded
//! priority queue, with a busy-wait barrier the coordinator uses to detect
//! phase completion.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::MapReduceError;
use crate::job::{Job, JobQueue};

struct PoolState {
    queue: JobQueue,
    active: bool,
    idle_count: usize,
}

struct Shared {
    lock: Mutex<PoolState>,
    signal: Condvar,
    num_threads: usize,
}

/// A fixed pool of worker threads that run both map and reduce jobs; there
/// is no dedicated reducer pool.
pub(crate) struct WorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub(crate) fn new(num_threads: usize) -> Self {
        debug_assert!(num_threads > 0, "run() rejects zero workers before construction");

        let shared = Arc::new(Shared {
            lock: Mutex::new(PoolState {
                queue: JobQueue::new(),
                active: true,
                idle_count: 0,
            }),
            signal: Condvar::new(),
            num_threads,
        });

        let workers = (0..num_threads)
            .map(|id| {
                let shared = Arc::clone(&shared);
                thread::Builder::new()
                    .name(format!("mapreduce-worker-{id}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        tracing::debug!(num_threads, "worker pool started");
        Self { shared, workers }
    }

    /// Submit `task` with ordering key `length`. Fails if the pool has
    /// already begun shutdown.
    pub(crate) fn add_job(
        &self,
        length: u64,
        task: impl FnOnce() + Send + 'static,
    ) -> Result<(), MapReduceError> {
        let mut state = self.shared.lock.lock().unwrap();
        if !state.active {
            return Err(MapReduceError::PoolShutDown);
        }
        state.queue.push(Job { length, task: Box::new(task) });
        tracing::trace!(length, queue_len = state.queue.len(), "job submitted");
        self.shared.signal.notify_one();
        Ok(())
    }

    /// Busy-wait barrier: returns only once the queue is empty *and* every
    /// worker is idle. Both conditions must hold simultaneously, not just
    /// momentarily — see spec §4.2 for why a plain `size == 0` check is not
    /// enough (a worker may have popped the last job but not yet marked
    /// itself idle, or vice versa).
    pub(crate) fn check(&self) {
        loop {
            let state = self.shared.lock.lock().unwrap();
            if state.queue.is_empty() && state.idle_count == self.shared.num_threads {
                return;
            }
            drop(state);
            std::hint::spin_loop();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock.lock().unwrap();
            state.active = false;
            self.shared.signal.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        tracing::debug!("worker pool shut down");
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let mut state = shared.lock.lock().unwrap();
        while state.queue.is_empty() && state.active {
            state.idle_count += 1;
            state = shared.signal.wait(state).unwrap();
            state.idle_count -= 1;
        }
        let job = state.queue.pop_head();
        let active = state.active;
        drop(state);

        if let Some(job) = job {
            (job.task)();
        }
        if !active {
            return;
        }
    }
}
