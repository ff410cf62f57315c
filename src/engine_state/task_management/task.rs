//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread with the world
//! 5. The result can spawn new tasks
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred between threads
//! - `TaskResult` must be `Send` to be transferred back to the main thread
//! - Tasks own their inputs (chunks are shared through `Arc`), so no locking is needed

use crate::engine_state::voxels::world::WorldManager;

/// A unit of work that can be executed on a worker thread.
///
/// Tasks should own all the data they need and be coarse-grained enough to amortize
/// the cost of sending them to a worker.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// This runs on a background thread (or inline when the manager has no workers)
    /// and must not touch main-thread state.
    ///
    /// # Returns
    /// A boxed `TaskResult` that will be processed on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Handles the result of a completed task on the main thread.
    ///
    /// # Returns
    /// New tasks to schedule (can be empty)
    fn handle_result(self: Box<Self>, world: &mut WorldManager) -> Vec<Box<dyn Task + Send>>;
}
