// src/scheduler.rs

//! The work orchestrator: a fixed-size worker pool draining a FIFO task
//! queue, plus the registry of pending generated-input assertions and the
//! shared input-file cache.
//!
//! One scheduler is created per generation run and shared by handle. The
//! main thread runs the resolver and all resolved callbacks; workers only
//! execute queued tasks (file parses, rule writing) and never mutate the
//! graph. Pushing a task onto the queue is the happens-before edge from
//! "target fully resolved" to "worker reads target fields".

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use tracing::{debug, warn};

use crate::desc::InputFileCache;
use crate::graph::target::Target;
use crate::path::SourceFile;

type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    queue: VecDeque<Task>,
    running: usize,
}

pub struct Scheduler {
    state: Mutex<QueueState>,
    /// Signaled when a task is pushed.
    work_available: Condvar,
    /// Signaled when the queue is empty and every worker is idle.
    all_idle: Condvar,
    input_file_cache: Arc<InputFileCache>,
    /// Files claimed as sources/inputs that matched no known output at
    /// resolution time, with every claiming target.
    unknown_generated_inputs: Mutex<BTreeMap<SourceFile, Vec<Arc<Target>>>>,
    worker_count: usize,
}

impl Scheduler {
    /// Start a scheduler with `worker_count` threads, defaulting to the
    /// available hardware parallelism. Workers are detached; they park on
    /// the queue condvar when idle and are reclaimed at process exit.
    pub fn new(worker_count: Option<usize>) -> Arc<Self> {
        let worker_count = worker_count.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        });

        let scheduler = Arc::new(Self {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                running: 0,
            }),
            work_available: Condvar::new(),
            all_idle: Condvar::new(),
            input_file_cache: Arc::new(InputFileCache::new()),
            unknown_generated_inputs: Mutex::new(BTreeMap::new()),
            worker_count,
        });

        for i in 0..worker_count {
            let scheduler = Arc::clone(&scheduler);
            thread::Builder::new()
                .name(format!("worker-{i}"))
                .spawn(move || scheduler.worker_loop())
                .expect("spawning worker thread");
        }

        debug!(workers = worker_count, "scheduler started");
        scheduler
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Enqueue a task for execution on some worker thread. No ordering is
    /// guaranteed between tasks.
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        let mut state = self.lock_state();
        state.queue.push_back(Box::new(task));
        self.work_available.notify_one();
    }

    /// Block until the task queue is drained and every worker is idle.
    pub fn wait_for_all_work(&self) {
        let mut state = self.lock_state();
        while !(state.queue.is_empty() && state.running == 0) {
            state = match self.all_idle.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => {
                    warn!("scheduler queue poisoned while draining; continuing");
                    poisoned.into_inner()
                }
            };
        }
    }

    /// The shared description-file cache.
    pub fn input_file_cache(&self) -> &Arc<InputFileCache> {
        &self.input_file_cache
    }

    /// Record that `target` consumes `file` but no reachable dependency
    /// produces it. Thread-safe; multiple targets may claim one file.
    pub fn add_unknown_generated_input(&self, file: SourceFile, target: Arc<Target>) {
        self.lock_unknown_inputs().entry(file).or_default().push(target);
    }

    /// Snapshot of the unknown-generated-input map. Only meaningful once no
    /// tasks are in flight.
    pub fn unknown_generated_inputs(&self) -> BTreeMap<SourceFile, Vec<Arc<Target>>> {
        self.lock_unknown_inputs().clone()
    }

    /// Queue mutations are single push/pop statements, so the state behind
    /// a poisoned lock is still consistent; recover and keep going.
    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("scheduler queue poisoned; continuing with current queue");
                poisoned.into_inner()
            }
        }
    }

    fn lock_unknown_inputs(&self) -> MutexGuard<'_, BTreeMap<SourceFile, Vec<Arc<Target>>>> {
        match self.unknown_generated_inputs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("unknown input map poisoned; continuing with recorded entries");
                poisoned.into_inner()
            }
        }
    }

    fn worker_loop(&self) {
        loop {
            let task = {
                let mut state = self.lock_state();
                loop {
                    if let Some(task) = state.queue.pop_front() {
                        state.running += 1;
                        break task;
                    }
                    state = match self.work_available.wait(state) {
                        Ok(guard) => guard,
                        Err(poisoned) => {
                            warn!("scheduler queue poisoned while waiting for work; continuing");
                            poisoned.into_inner()
                        }
                    };
                }
            };

            task();

            let mut state = self.lock_state();
            state.running -= 1;
            if state.queue.is_empty() && state.running == 0 {
                self.all_idle.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn wait_for_all_work_drains_the_queue() {
        let scheduler = Scheduler::new(Some(4));
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = Arc::clone(&counter);
            scheduler.schedule(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        scheduler.wait_for_all_work();
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn wait_with_empty_queue_returns_immediately() {
        let scheduler = Scheduler::new(Some(2));
        scheduler.wait_for_all_work();
    }
}
