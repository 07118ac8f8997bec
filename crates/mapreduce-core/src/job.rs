//! The priority job queue served by the worker pool.
//!
//! Ordering is driven by a caller-supplied `length`: smallest length is
//! always at the head. The asymmetric tie-breaking below (ties at the head
//! jump the queue; ties in the body fall in behind) is inherited from the
//! reference `ThreadPool_add_job` and kept intentionally — see spec §4.1.

/// A unit of work handed to the worker pool: an opaque task plus the
/// ordering key the queue sorts on.
pub(crate) struct Job {
    pub(crate) length: u64,
    pub(crate) task: Box<dyn FnOnce() + Send + 'static>,
}

/// A sorted (non-decreasing `length`) list of pending jobs.
#[derive(Default)]
pub(crate) struct JobQueue {
    jobs: Vec<Job>,
}

impl JobQueue {
    pub(crate) fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Insert `job` keeping the queue sorted by non-decreasing length.
    ///
    /// A new job whose length ties the current head is inserted *before*
    /// it; a new job whose length ties an entry further in is inserted
    /// *after* the run of equal-or-smaller lengths. This asymmetry matches
    /// the reference source and is flagged, not fixed, per spec §9.
    pub(crate) fn push(&mut self, job: Job) {
        if self.jobs.is_empty() || job.length <= self.jobs[0].length {
            self.jobs.insert(0, job);
            return;
        }
        let mut idx = 1;
        while idx < self.jobs.len() && self.jobs[idx].length < job.length {
            idx += 1;
        }
        self.jobs.insert(idx, job);
    }

    /// Remove and return the head job, or `None` if the queue is empty.
    pub(crate) fn pop_head(&mut self) -> Option<Job> {
        if self.jobs.is_empty() {
            None
        } else {
            Some(self.jobs.remove(0))
        }
    }
}
