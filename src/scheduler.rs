//! Timed event queue for cascade stages and trial ticks.
//!
//! Single-threaded: tasks are ordered by due time, then by insertion
//! sequence, and each task runs to completion before the next is popped.
//! Cascade stage 2 is never enqueued before stage 1 has executed, so stage
//! ordering is guaranteed by elapsed engine time, not call order.

use std::collections::BTreeMap;

/// Ordering key: due time first, then FIFO sequence at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskKey {
    pub due_ms: u64,
    pub sequence: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeStage {
    /// Distributor impact: T4, P4 -> P5.
    Distributor,
    /// Customer impact: T5, P7 -> P8.
    Customer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// One clock trial: sample a hazard and reschedule.
    Trial,
    /// Delayed follow-on transfer after a primary hazard.
    Cascade(CascadeStage),
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    tasks: BTreeMap<TaskKey, Task>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, task: Task) -> TaskKey {
        let key = TaskKey {
            due_ms,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.tasks.insert(key, task);
        key
    }

    /// Pop the earliest task due at or before `now_ms`, if any.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TaskKey, Task)> {
        let key = *self.tasks.keys().next()?;
        if key.due_ms > now_ms {
            return None;
        }
        let task = self.tasks.remove(&key)?;
        Some((key, task))
    }

    /// Earliest pending due time, if any task is queued.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.tasks.keys().next().map(|k| k.due_ms)
    }

    /// Drop pending trial ticks, keeping in-flight cascade stages. This is
    /// the stop policy: the next trial is cancelled, cascades run out.
    pub fn cancel_trials(&mut self) {
        self.tasks.retain(|_, task| !matches!(task, Task::Trial));
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_cascades(&self) -> usize {
        self.tasks
            .values()
            .filter(|t| matches!(t, Task::Cascade(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(2_000, Task::Cascade(CascadeStage::Customer));
        queue.schedule(1_000, Task::Cascade(CascadeStage::Distributor));

        let (key, task) = queue.pop_due(5_000).unwrap();
        assert_eq!(key.due_ms, 1_000);
        assert_eq!(task, Task::Cascade(CascadeStage::Distributor));
    }

    #[test]
    fn test_fifo_at_same_due_time() {
        let mut queue = EventQueue::new();
        queue.schedule(1_000, Task::Trial);
        queue.schedule(1_000, Task::Cascade(CascadeStage::Distributor));

        assert_eq!(queue.pop_due(1_000).unwrap().1, Task::Trial);
        assert_eq!(
            queue.pop_due(1_000).unwrap().1,
            Task::Cascade(CascadeStage::Distributor)
        );
    }

    #[test]
    fn test_pop_due_respects_now() {
        let mut queue = EventQueue::new();
        queue.schedule(1_000, Task::Trial);

        assert!(queue.pop_due(999).is_none());
        assert!(queue.pop_due(1_000).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_trials_keeps_cascades() {
        let mut queue = EventQueue::new();
        queue.schedule(1_000, Task::Trial);
        queue.schedule(800, Task::Cascade(CascadeStage::Distributor));

        queue.cancel_trials();

        assert_eq!(queue.pending_cascades(), 1);
        assert_eq!(
            queue.pop_due(u64::MAX).unwrap().1,
            Task::Cascade(CascadeStage::Distributor)
        );
        assert!(queue.is_empty());
    }
}
