use std::{
    any::Any,
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    panic::{self, AssertUnwindSafe},
};

use crossbeam_channel::bounded;
use indicatif::ProgressBar;
use log::{debug, warn};

mod cancel;
pub use cancel::CancelToken;

mod error;
pub use error::{JobError, PoolError};

/// Outcome of every job dispatched by a [`ParallelMap`], indexed by key.
pub type JobResults<K, V, E> = BTreeMap<K, Result<V, JobError<E>>>;

/// A parallel map over a set of independent keys.
/// 
/// Keys are deduplicated, sorted, and enqueued once within a bounded job queue (pre-sized to the number of keys),
/// which is then closed. A fixed number of workers, running on a dedicated rayon thread-pool, pull keys from this
/// queue until it is exhausted, and push their results onto a result channel. The caller is handed back exactly
/// one result per key:
/// - a job returning an error is reported as `JobError::Failed`.
/// - a panicking job is caught and reported as `JobError::Panicked`.
/// - keys left unprocessed after cancellation are reported as `JobError::Cancelled`.
pub struct ParallelMap {
    workers : usize,
    cancel  : CancelToken,
    progress: ProgressBar,
}

impl ParallelMap {
    /// Instantiate a new pool, running at most `workers` concurrent jobs (at least one).
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self { workers: workers.max(1), cancel: CancelToken::new(), progress: ProgressBar::hidden() }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Attach a progress bar, incremented once per completed job.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Apply `job` to every key, across `min(self.workers, n_keys)` workers.
    /// 
    /// # Errors
    /// - `PoolError::BuildThreadPool` if the rayon thread-pool cannot be built.
    /// - `PoolError::MissingResults` if the result channel closed before every key was accounted for.
    pub fn run<K, V, E, F>(&self, keys: impl IntoIterator<Item = K>, job: F) -> Result<JobResults<K, V, E>, PoolError>
    where
        K: Ord + Clone + Display + Send,
        V: Send,
        E: Send,
        F: Fn(&K) -> Result<V, E> + Sync,
    {
        let keys: BTreeSet<K> = keys.into_iter().collect();
        let expected = keys.len();
        if expected == 0 {
            return Ok(BTreeMap::new())
        }

        // ---- Fill and close the job queue.
        let (job_tx, job_rx) = bounded::<K>(expected);
        for key in &keys {
            if job_tx.send(key.clone()).is_err() {
                break
            }
        }
        drop(job_tx);

        // ---- Result channel is pre-sized: workers never block on send.
        let (result_tx, result_rx) = bounded::<(K, Result<V, JobError<E>>)>(expected);

        let workers = self.workers.min(expected);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dpsim-worker-{i}"))
            .build()?;

        debug!("Dispatching {expected} jobs across {workers} workers");
        let (job, cancel, progress) = (&job, &self.cancel, &self.progress);
        pool.scope(|scope| {
            for _ in 0..workers {
                let (job_rx, result_tx) = (job_rx.clone(), result_tx.clone());
                scope.spawn(move |_| {
                    for key in &job_rx {
                        let result = match cancel.is_cancelled() {
                            true  => Err(JobError::Cancelled),
                            false => Self::run_job(job, &key),
                        };
                        progress.inc(1);
                        if result_tx.send((key, result)).is_err() {
                            break
                        }
                    }
                });
            }
        });
        drop(result_tx);

        Self::collect_results(&keys, result_rx.iter().collect())
    }

    /// Fan in: every dispatched key must be accounted for. Last-resort check against a lost job.
    fn collect_results<K, V, E>(keys: &BTreeSet<K>, results: JobResults<K, V, E>) -> Result<JobResults<K, V, E>, PoolError>
    where
        K: Ord + Display,
    {
        if results.len() != keys.len() {
            let missing = keys.iter()
                .filter(|key| !results.contains_key(key))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PoolError::MissingResults { expected: keys.len(), received: results.len(), missing })
        }
        Ok(results)
    }

    fn run_job<K, V, E, F>(job: &F, key: &K) -> Result<V, JobError<E>>
    where
        K: Display,
        F: Fn(&K) -> Result<V, E>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| job(key))) {
            Ok(Ok(value))  => Ok(value),
            Ok(Err(e))     => Err(JobError::Failed(e)),
            Err(payload)   => {
                let message = panic_message(payload.as_ref());
                warn!("Job {key} panicked: {message}");
                Err(JobError::Panicked(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn one_result_per_key() -> Result<(), PoolError> {
        for workers in 1..=8 {
            let results = ParallelMap::new(workers).run(0..50u32, |key| Ok::<_, String>(key * 2))?;
            assert_eq!(results.len(), 50);
            for (key, value) in results {
                assert_eq!(value, Ok(key * 2));
            }
        }
        Ok(())
    }

    #[test]
    fn lost_results_are_reported() {
        let keys: BTreeSet<u32> = (0..5).collect();
        let mut results: JobResults<u32, u32, String> = keys.iter().map(|key| (*key, Ok(*key))).collect();
        results.remove(&1);
        results.remove(&3);

        match ParallelMap::collect_results(&keys, results) {
            Err(PoolError::MissingResults { expected, received, missing }) => {
                assert_eq!((expected, received), (5, 3));
                assert_eq!(missing, "1, 3");
            },
            other => panic!("Expected PoolError::MissingResults. Got {other:?}"),
        }
    }

    #[test]
    fn complete_results_are_returned() -> Result<(), PoolError> {
        let keys: BTreeSet<u32> = (0..5).collect();
        let results: JobResults<u32, u32, String> = keys.iter().map(|key| (*key, Ok(*key))).collect();
        let results = ParallelMap::collect_results(&keys, results)?;
        assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn duplicate_keys_run_once() -> Result<(), PoolError> {
        let calls = AtomicUsize::new(0);
        let results = ParallelMap::new(4).run([3, 1, 3, 2, 1], |key: &i32| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok::<_, String>(*key)
        })?;
        assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
        Ok(())
    }

    #[test]
    fn empty_key_set() -> Result<(), PoolError> {
        let results = ParallelMap::new(4).run(Vec::<u32>::new(), |_| Ok::<u32, String>(0))?;
        assert!(results.is_empty());
        Ok(())
    }

    #[test]
    fn failures_are_reported_under_their_key() -> Result<(), PoolError> {
        let results = ParallelMap::new(3).run(0..10u32, |key| match key % 3 {
            0 => Err(format!("{key} is a multiple of three")),
            _ => Ok(*key),
        })?;
        assert_eq!(results.len(), 10);
        assert_eq!(results[&3], Err(JobError::Failed("3 is a multiple of three".to_string())));
        assert_eq!(results[&4], Ok(4));
        Ok(())
    }

    #[test]
    fn panics_are_caught() -> Result<(), PoolError> {
        let results = ParallelMap::new(2).run(0..6u32, |key| {
            assert!(*key != 4, "key four is cursed");
            Ok::<_, String>(*key)
        })?;
        assert_eq!(results.len(), 6);
        assert_eq!(results[&4], Err(JobError::Panicked("key four is cursed".to_string())));
        assert_eq!(results[&5], Ok(5));
        Ok(())
    }

    #[test]
    fn cancelled_keys_are_reported() -> Result<(), PoolError> {
        let pool = ParallelMap::new(1);
        let token = pool.cancel_token().clone();
        let results = pool.run(0..20u32, |key| {
            if *key == 4 {
                token.cancel();
            }
            Ok::<_, String>(*key)
        })?;
        assert_eq!(results.len(), 20);
        // Single worker: keys are processed in ascending order.
        assert!(results.range(..=4).all(|(_, r)| r.is_ok()));
        assert!(results.range(5..).all(|(_, r)| *r == Err(JobError::Cancelled)));
        Ok(())
    }
}
