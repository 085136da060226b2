//! Fixed-size worker pool with a bounded job queue
//!
//! Jobs travel over a `sync_channel` of `queue_depth` slots to a fixed set of
//! threads. When every worker is busy and the queue is full, [`WorkerPool::submit`]
//! blocks until a slot frees. [`WorkerPool::join`] waits until every job
//! submitted so far has finished. A panicking job is caught on its worker
//! and counted; the worker keeps serving the queue.

use crate::config::PoolConfig;
use crate::error::{BatchError, BatchResult};
use parking_lot::{Condvar, Mutex};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Completion bookkeeping shared by the pool handle and its workers
#[derive(Default)]
struct PoolState {
    pending: Mutex<usize>,
    idle: Condvar,
    panicked: AtomicUsize,
    completed: AtomicUsize,
}

impl PoolState {
    fn begin(&self) {
        *self.pending.lock() += 1;
    }

    fn finish(&self) {
        let mut pending = self.pending.lock();
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Bounded pool of worker threads
pub struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
    state: Arc<PoolState>,
}

impl WorkerPool {
    /// Start `config.threads` workers behind a queue of `config.queue_depth`
    pub fn new(config: &PoolConfig) -> BatchResult<Self> {
        if config.threads == 0 {
            return Err(BatchError::NoThreads);
        }

        let (sender, receiver) = sync_channel::<Job>(config.queue_depth);
        let receiver = Arc::new(Mutex::new(receiver));
        let state = Arc::new(PoolState::default());

        let workers = (0..config.threads)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let state = Arc::clone(&state);
                thread::Builder::new()
                    .name(format!("ecl-worker-{id}"))
                    .spawn(move || worker_loop(id, &receiver, &state))
                    .map_err(BatchError::Spawn)
            })
            .collect::<BatchResult<Vec<_>>>()?;

        info!(
            "Started worker pool: {} threads, queue depth {}",
            config.threads, config.queue_depth
        );
        Ok(Self {
            sender: Some(sender),
            workers,
            state,
        })
    }

    /// Queue a job, blocking while every worker is busy and the queue is full
    ///
    /// A job must not submit to its own pool: with a full queue it would
    /// wait on itself.
    pub fn submit<F>(&self, job: F) -> BatchResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(BatchError::Closed)?;
        self.state.begin();
        if sender.send(Box::new(job)).is_err() {
            self.state.finish();
            return Err(BatchError::Closed);
        }
        Ok(())
    }

    /// Block until every submitted job has completed
    pub fn join(&self) {
        let mut pending = self.state.pending.lock();
        while *pending > 0 {
            self.state.idle.wait(&mut pending);
        }
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    /// Jobs submitted but not yet finished
    pub fn pending(&self) -> usize {
        *self.state.pending.lock()
    }

    /// Jobs that ran to completion without panicking
    pub fn completed_jobs(&self) -> usize {
        self.state.completed.load(Ordering::Acquire)
    }

    /// Jobs that panicked
    pub fn panicked_jobs(&self) -> usize {
        self.state.panicked.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.workers.len())
            .field("pending", &self.pending())
            .field("panicked", &self.panicked_jobs())
            .finish_non_exhaustive()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers leave their loop once the channel is closed and drained
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Worker thread terminated abnormally");
            }
        }
        debug!(
            "Worker pool shut down: {} completed, {} panicked",
            self.completed_jobs(),
            self.panicked_jobs()
        );
    }
}

fn worker_loop(id: usize, receiver: &Mutex<Receiver<Job>>, state: &PoolState) {
    loop {
        let job = receiver.lock().recv();
        let Ok(job) = job else {
            debug!("Worker {id} exiting");
            return;
        };
        if catch_unwind(AssertUnwindSafe(job)).is_ok() {
            state.completed.fetch_add(1, Ordering::AcqRel);
        } else {
            state.panicked.fetch_add(1, Ordering::AcqRel);
            warn!("Job panicked on worker {id}");
        }
        state.finish();
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::mpsc;
    use std::time::Duration;

    fn pool(threads: usize, queue_depth: usize) -> WorkerPool {
        WorkerPool::new(
            &PoolConfig::new()
                .with_threads(threads)
                .with_queue_depth(queue_depth),
        )
        .expect("Test operation should succeed")
    }

    #[test]
    fn test_join_waits_for_all_jobs() {
        let pool = pool(4, 2);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                thread::sleep(Duration::from_micros(100));
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.join();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.completed_jobs(), 100);
        assert_eq!(pool.threads(), 4);
    }

    #[test]
    fn test_join_without_jobs_returns() {
        let pool = pool(1, 0);
        pool.join();
        assert_eq!(pool.pending(), 0);
    }

    #[test]
    fn test_panics_are_counted_and_isolated() {
        let pool = pool(2, 4);
        let counter = Arc::new(AtomicUsize::new(0));
        for n in 0..10 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                assert!(n % 3 != 0, "job {n} fails");
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.join();
        assert_eq!(pool.panicked_jobs(), 4);
        assert_eq!(pool.completed_jobs(), 6);
        assert_eq!(counter.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = WorkerPool::new(&PoolConfig::new().with_threads(0)).unwrap_err();
        assert!(matches!(err, BatchError::NoThreads));
    }

    #[test]
    fn test_submit_blocks_when_full() {
        let pool = pool(1, 0);
        let (gate, gate_rx) = mpsc::channel::<()>();
        pool.submit(move || {
            gate_rx.recv().unwrap();
        })
        .unwrap();

        let submitted = AtomicBool::new(false);
        thread::scope(|s| {
            s.spawn(|| {
                pool.submit(|| {}).unwrap();
                submitted.store(true, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(50));
            assert!(!submitted.load(Ordering::SeqCst));
            gate.send(()).unwrap();
        });
        assert!(submitted.load(Ordering::SeqCst));
        pool.join();
        assert_eq!(pool.completed_jobs(), 2);
    }

    #[test]
    fn test_drop_finishes_queued_jobs() {
        let finished = Arc::new(AtomicUsize::new(0));
        {
            let pool = pool(2, 8);
            for _ in 0..8 {
                let finished = Arc::clone(&finished);
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(5));
                    finished.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
        }
        assert_eq!(finished.load(Ordering::SeqCst), 8);
    }
}
