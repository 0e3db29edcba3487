// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Parallel driver.
//!
//! One task per layer-2 candidate, each owning its own [`Searcher`];
//! tasks share nothing while running, so the pool is a plain queue of
//! work: insert every task up front, spawn one worker per hardware
//! thread, let each worker pull tasks until the queue is empty, join,
//! then fold the per-task counters into a process-wide report.
//!
//! Candidate counts exceed worker counts by an order of magnitude for
//! interesting widths, so static partitioning by candidate balances
//! well enough despite uneven subtree sizes.

use crate::search::Searcher;
use crate::stats::Statistics;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// One unit of work: a searcher bound to a layer-2 candidate.
pub struct SearchTask {
    searcher: Searcher,

    /// Wall-clock time this task spent searching.
    busy: Duration,
}

impl SearchTask {
    pub fn new(searcher: Searcher) -> Self {
        Self {
            searcher,
            busy: Duration::ZERO,
        }
    }

    /// Run the task's search to exhaustion.
    fn perform(&mut self) {
        let started = Instant::now();
        self.searcher.backtrack();
        self.busy = started.elapsed();

        debug!(
            level2_index = self.searcher.level2_index(),
            found = self.searcher.count(),
            busy_ms = self.busy.as_millis() as u64,
            "task finished"
        );
    }

    /// Number of sorting networks this task found.
    pub fn count(&self) -> u64 {
        self.searcher.count()
    }
}

/// Aggregated results of one pool run.
#[derive(Debug, Default, Clone)]
pub struct PoolReport {
    /// Total sorting networks found across tasks.
    pub found: u64,

    /// Number of tasks executed.
    pub tasks: usize,

    /// Number of worker threads used.
    pub workers: usize,

    /// Summed per-task busy time, the portable stand-in for process
    /// CPU time.
    pub cpu_time: Duration,

    /// Merged per-task counters.
    pub statistics: Statistics,
}

/// A queue-backed worker pool with an insert/spawn/wait/process
/// lifecycle.
pub struct TaskPool {
    workers: usize,
    queue: Arc<Mutex<VecDeque<SearchTask>>>,
    finished: Arc<Mutex<Vec<SearchTask>>>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskPool {
    /// A pool with one worker per hardware thread.
    pub fn new() -> Self {
        Self::with_workers(num_cpus::get())
    }

    /// A pool with an explicit worker count.
    pub fn with_workers(workers: usize) -> Self {
        assert!(workers > 0);
        Self {
            workers,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            finished: Arc::new(Mutex::new(Vec::new())),
            handles: Vec::new(),
        }
    }

    /// Number of worker threads this pool will spawn.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queue a task. Only valid before [`TaskPool::spawn`].
    pub fn insert(&mut self, task: SearchTask) {
        self.queue.lock().unwrap().push_back(task);
    }

    /// Start the workers. Each pulls tasks until the queue is empty.
    pub fn spawn(&mut self) -> std::io::Result<()> {
        for index in 0..self.workers {
            let queue = Arc::clone(&self.queue);
            let finished = Arc::clone(&self.finished);

            let handle = thread::Builder::new()
                .name(format!("search-{index}"))
                .spawn(move || loop {
                    let task = queue.lock().unwrap().pop_front();
                    match task {
                        Some(mut task) => {
                            task.perform();
                            finished.lock().unwrap().push(task);
                        }
                        None => break,
                    }
                })?;

            self.handles.push(handle);
        }
        Ok(())
    }

    /// Block until every worker has drained the queue and exited.
    pub fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            // A panicking task is a programmer invariant violation;
            // propagate it.
            handle.join().expect("search worker panicked");
        }
    }

    /// Fold the finished tasks' counters into a report.
    pub fn process(&mut self) -> PoolReport {
        let mut report = PoolReport {
            workers: self.workers,
            ..PoolReport::default()
        };

        let mut finished = self.finished.lock().unwrap();
        for task in finished.drain(..) {
            report.found += task.searcher.count();
            report.tasks += 1;
            report.cpu_time += task.busy;
            report.statistics.merge(task.searcher.statistics());
        }

        report
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::level2;

    fn run_pool(width: usize, depth: usize, workers: usize) -> PoolReport {
        let config = SearchConfig::new(width, depth, false).unwrap();
        let mut pool = TaskPool::with_workers(workers);
        for (index, candidate) in level2::candidates(width).iter().enumerate() {
            pool.insert(SearchTask::new(Searcher::new(config, candidate, index, None)));
        }
        pool.spawn().unwrap();
        pool.wait();
        pool.process()
    }

    #[test]
    fn test_all_tasks_run() {
        let report = run_pool(4, 3, 2);
        assert_eq!(report.tasks, level2::candidates(4).len());
        assert!(report.found > 0);
    }

    #[test]
    fn test_worker_count_does_not_change_totals() {
        let serial = run_pool(5, 5, 1);
        let parallel = run_pool(5, 5, 4);
        assert_eq!(serial.found, parallel.found);
        assert_eq!(serial.tasks, parallel.tasks);
    }

    #[test]
    fn test_zero_sorters_still_reports_tasks() {
        let report = run_pool(3, 2, 3);
        assert_eq!(report.found, 0);
        assert_eq!(report.tasks, 3);
    }
}
