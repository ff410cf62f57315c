//! # Task Management System
//!
//! This module provides the worker pool that generates and meshes chunks off the main
//! thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed asynchronously
//! - `TaskResult`: The result of a completed task, which can spawn additional tasks
//! - `TaskChannel`: Communication channel between the main thread and one worker thread
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to available worker channels using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are processed on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks, which are published in turn
//!
//! A manager created with zero workers runs every task inline when it is published and
//! holds the result until `process_completed_tasks()`, which keeps tests deterministic.
//!
//! ## Example Usage
//! ```ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! // Publish a task for background processing
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In the game loop:
//! task_manager.process_completed_tasks(&mut world);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, error, info};
use task::{Task, TaskResult};

use super::voxels::world::WorldManager;

/// A communication channel between the main thread and a worker thread.
///
/// Dropping the channel drops `task_sender`, which ends the worker's receive loop.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    alive: bool,
    _worker: JoinHandle<()>,
}

impl TaskChannel {
    fn can_accept(&self) -> bool {
        self.alive && self.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
    }
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
/// - `inline_results`: Results of tasks run on the main thread (no workers)
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
    inline_results: VecDeque<Box<dyn TaskResult + Send>>,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeping a few tasks queued on each worker hides the round trip through the main
/// thread, while the overflow stays in `queued_tasks` where it is still reorderable.
pub const MAX_TASKS_IN_FLIGHT: usize = 4;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// With `num_workers == 0` tasks run inline on the calling thread. A worker that
    /// cannot be spawned is logged and skipped.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            };

            let spawned = thread::Builder::new()
                .name(format!("chunk-worker-{worker_index}"))
                .spawn(task_closure);

            match spawned {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    alive: true,
                    _worker: worker,
                }),
                Err(err) => error!("Failed to spawn worker {worker_index}: {err}"),
            }
        }

        info!(
            "Task manager started with {} worker(s), available parallelism: {:?}",
            channels.len(),
            thread::available_parallelism()
        );

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            inline_results: VecDeque::new(),
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    fn runs_inline(&self) -> bool {
        !self.channels.iter().any(|channel| channel.alive)
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker is gone, handing the task back for requeueing
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(failed) => {
                error!("Worker {channel_idx} disconnected");
                channel.alive = false;
                Err(failed.0)
            }
        }
    }

    /// Finds an available worker channel using round-robin from the last used channel.
    ///
    /// # Returns
    /// `None` if all channels are busy or there are no channels available
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|step| (self.current_channel + step) % count)
            .find(|&index| self.channels[index].can_accept())
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was executed or sent to a worker immediately
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if self.runs_inline() {
            self.inline_results.push_back(task.process());
            return true;
        }

        let Some(channel_idx) = self.find_available_channel() else {
            self.queued_tasks.push_back(task);
            return false;
        };

        match self.try_send_task(task, channel_idx) {
            Ok(()) => {
                self.current_channel = (channel_idx + 1) % self.channels.len();
                true
            }
            Err(task) => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Sends queued tasks to workers until the queue is empty or every worker is busy.
    ///
    /// Tasks leave the queue in FIFO order.
    pub fn process_queued_tasks(&mut self) {
        if self.runs_inline() {
            while let Some(task) = self.queued_tasks.pop_front() {
                self.inline_results.push_back(task.process());
            }
            return;
        }

        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Processes all completed task results on the main thread.
    ///
    /// Each result is handed the world; the tasks it spawns are published after every
    /// available result has been handled. If a worker stopped with tasks in flight, the
    /// world is told to request its pending chunks again.
    pub fn process_completed_tasks(&mut self, world: &mut WorldManager) {
        let mut tasks_to_queue = Vec::new();

        while let Some(result) = self.inline_results.pop_front() {
            tasks_to_queue.extend(result.handle_result(world));
        }

        for (index, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        tasks_to_queue.extend(result.handle_result(world));
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.alive {
                            error!(
                                "Worker {index} stopped with {} task(s) in flight",
                                channel.num_tasks_in_flight
                            );
                            if channel.num_tasks_in_flight > 0 {
                                world.reissue_pending_requests();
                            }
                            channel.alive = false;
                            channel.num_tasks_in_flight = 0;
                        }
                        break;
                    }
                }
            }
        }

        if !tasks_to_queue.is_empty() {
            debug!("Publishing {} follow-up task(s)", tasks_to_queue.len());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// `true` while any task is queued, running, or waiting for its result to be handled.
    pub fn has_pending_work(&self) -> bool {
        !self.queued_tasks.is_empty()
            || !self.inline_results.is_empty()
            || self
                .channels
                .iter()
                .any(|channel| channel.alive && channel.num_tasks_in_flight > 0)
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_len(&self) -> usize {
        self.queued_tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::WorldConfig;

    struct CountingTask {
        processed: Arc<AtomicUsize>,
        handled: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    struct CountingResult {
        processed: Arc<AtomicUsize>,
        handled: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.processed.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult {
                processed: self.processed.clone(),
                handled: self.handled.clone(),
                follow_ups: self.follow_ups,
            })
        }
    }

    impl TaskResult for CountingResult {
        fn handle_result(self: Box<Self>, _world: &mut WorldManager) -> Vec<Box<dyn Task + Send>> {
            self.handled.fetch_add(1, Ordering::SeqCst);
            (0..self.follow_ups)
                .map(|_| {
                    Box::new(CountingTask {
                        processed: self.processed.clone(),
                        handled: self.handled.clone(),
                        follow_ups: 0,
                    }) as Box<dyn Task + Send>
                })
                .collect()
        }
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    fn task(processed: &Arc<AtomicUsize>, handled: &Arc<AtomicUsize>, follow_ups: usize) -> Box<dyn Task + Send> {
        Box::new(CountingTask {
            processed: processed.clone(),
            handled: handled.clone(),
            follow_ups,
        })
    }

    #[test]
    fn inline_manager_runs_at_publish_and_handles_later() {
        let mut world = WorldManager::new(&WorldConfig::default());
        let mut manager = TaskManager::new(0);
        let (processed, handled) = counters();

        assert!(manager.publish_task(task(&processed, &handled, 2)));
        assert_eq!(processed.load(Ordering::SeqCst), 1);
        assert_eq!(handled.load(Ordering::SeqCst), 0);
        assert!(manager.has_pending_work());

        manager.process_completed_tasks(&mut world);
        assert_eq!(handled.load(Ordering::SeqCst), 1);
        assert_eq!(processed.load(Ordering::SeqCst), 3);

        manager.process_completed_tasks(&mut world);
        assert_eq!(handled.load(Ordering::SeqCst), 3);
        assert!(!manager.has_pending_work());
    }

    struct PanickingTask;

    impl Task for PanickingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            panic!("worker failure");
        }
    }

    #[test]
    fn stopped_worker_hands_requests_back_to_the_world() {
        let mut world = WorldManager::new(&WorldConfig {
            render_distance: 1,
            height_chunks: 1,
            ..WorldConfig::default()
        });
        let mut inline = TaskManager::new(0);
        world.update(cgmath::Point3::new(0, 0, 0), &mut inline);
        assert!(world.stats().generating > 0);

        let mut manager = TaskManager::new(1);
        manager.publish_task(Box::new(PanickingTask));

        let deadline = Instant::now() + Duration::from_secs(10);
        while manager.has_pending_work() && Instant::now() < deadline {
            manager.process_completed_tasks(&mut world);
            std::thread::sleep(Duration::from_millis(1));
        }

        assert!(!manager.has_pending_work());
        assert_eq!(world.stats().generating, 0);
        assert!(!world.is_idle());

        let (processed, handled) = counters();
        assert!(manager.publish_task(task(&processed, &handled, 0)));
        assert_eq!(processed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn worker_threads_complete_every_task() {
        let mut world = WorldManager::new(&WorldConfig::default());
        let mut manager = TaskManager::new(2);
        let (processed, handled) = counters();

        let total = 2 * MAX_TASKS_IN_FLIGHT + 5;
        for _ in 0..total {
            manager.publish_task(task(&processed, &handled, 0));
        }
        assert_eq!(manager.queued_len(), 5);

        let deadline = Instant::now() + Duration::from_secs(10);
        while manager.has_pending_work() && Instant::now() < deadline {
            manager.process_completed_tasks(&mut world);
            manager.process_queued_tasks();
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(processed.load(Ordering::SeqCst), total);
        assert_eq!(handled.load(Ordering::SeqCst), total);
        assert_eq!(manager.queued_len(), 0);
    }
}
