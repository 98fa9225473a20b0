//! Cooperative "next display refresh" scheduler.
//!
//! Tasks are closures over some state `S`. `run_frame` runs every task that
//! was queued before the frame started exactly once. A task that returns
//! [`TaskControl::Continue`] is queued again for the next frame; `Stop`
//! drops it.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    Stop,
}

/// Stop handle for a scheduled task chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

type TaskFn<S> = Box<dyn FnMut(&mut S) -> TaskControl + Send>;

struct Entry<S> {
    handle: TaskHandle,
    name: &'static str,
    run: TaskFn<S>,
}

pub struct FrameScheduler<S> {
    queue: Vec<Entry<S>>,
    cancelled: HashSet<TaskHandle>,
    next_id: u64,
    frame: u64,
}

impl<S> Default for FrameScheduler<S> {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            cancelled: HashSet::new(),
            next_id: 1,
            frame: 0,
        }
    }
}

impl<S> FrameScheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_frame<F>(&mut self, name: &'static str, task: F) -> TaskHandle
    where
        F: FnMut(&mut S) -> TaskControl + Send + 'static,
    {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.queue.push(Entry {
            handle,
            name,
            run: Box::new(task),
        });
        handle
    }

    /// Stop a task chain before its next run.
    pub fn cancel(&mut self, handle: TaskHandle) {
        if self.queue.iter().any(|e| e.handle == handle) {
            self.cancelled.insert(handle);
        }
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        !self.cancelled.contains(&handle) && self.queue.iter().any(|e| e.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|e| !self.cancelled.contains(&e.handle))
            .count()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Run one display refresh. Returns how many tasks ran.
    ///
    /// Tasks only see the state, never the scheduler; a chain ends itself by
    /// returning `Stop`.
    pub fn run_frame(&mut self, state: &mut S) -> usize {
        self.frame += 1;
        let due = std::mem::take(&mut self.queue);
        let mut ran = 0;
        let mut survivors = Vec::with_capacity(due.len());

        for mut entry in due {
            if self.cancelled.remove(&entry.handle) {
                continue;
            }
            ran += 1;
            match (entry.run)(state) {
                TaskControl::Continue => survivors.push(entry),
                TaskControl::Stop => {
                    log::debug!("Task '{}' finished on frame {}", entry.name, self.frame);
                }
            }
        }

        self.queue = survivors;
        self.cancelled.retain(|h| self.queue.iter().any(|e| e.handle == *h));
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continue_reschedules() {
        let mut sched: FrameScheduler<u32> = FrameScheduler::new();
        sched.request_frame("count", |n| {
            *n += 1;
            TaskControl::Continue
        });
        let mut n = 0;
        for _ in 0..5 {
            sched.run_frame(&mut n);
        }
        assert_eq!(n, 5);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn test_stop_drops_task() {
        let mut sched: FrameScheduler<u32> = FrameScheduler::new();
        let handle = sched.request_frame("until_three", |n| {
            *n += 1;
            if *n >= 3 { TaskControl::Stop } else { TaskControl::Continue }
        });
        let mut n = 0;
        for _ in 0..10 {
            sched.run_frame(&mut n);
        }
        assert_eq!(n, 3);
        assert!(!sched.is_scheduled(handle));
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_cancel_prevents_next_run() {
        let mut sched: FrameScheduler<u32> = FrameScheduler::new();
        let handle = sched.request_frame("tick", |n| {
            *n += 1;
            TaskControl::Continue
        });
        let mut n = 0;
        sched.run_frame(&mut n);
        sched.cancel(handle);
        assert!(!sched.is_scheduled(handle));
        sched.run_frame(&mut n);
        sched.run_frame(&mut n);
        assert_eq!(n, 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn test_cancel_unknown_handle_is_harmless() {
        let mut sched: FrameScheduler<u32> = FrameScheduler::new();
        let handle = sched.request_frame("once", |_| TaskControl::Stop);
        let mut n = 0;
        sched.run_frame(&mut n);
        sched.cancel(handle);
        assert_eq!(sched.pending(), 0);
        assert_eq!(sched.run_frame(&mut n), 0);
    }

    #[test]
    fn test_tasks_run_in_request_order() {
        let mut sched: FrameScheduler<Vec<&'static str>> = FrameScheduler::new();
        sched.request_frame("a", |log| {
            log.push("a");
            TaskControl::Continue
        });
        sched.request_frame("b", |log| {
            log.push("b");
            TaskControl::Stop
        });
        let mut log = Vec::new();
        sched.run_frame(&mut log);
        sched.run_frame(&mut log);
        assert_eq!(log, vec!["a", "b", "a"]);
        assert_eq!(sched.frame_count(), 2);
    }
}
