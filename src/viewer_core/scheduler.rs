//! Tick-driven deferred tasks.
//!
//! The UI loop advances one tick every [`TICK_MS`] milliseconds; a task becomes
//! due once the current tick reaches the tick it was scheduled for. Every task
//! gets a [`TaskHandle`] so a caller can drop it before it fires.

pub const TICK_MS: u64 = 200;

/// Round up so that a non-zero delay never fires on the tick it was scheduled.
pub fn ms_to_ticks(ms: u64) -> u64 {
    ms.div_ceil(TICK_MS)
}

pub fn secs_to_ticks(secs: u64) -> u64 {
    ms_to_ticks(secs.saturating_mul(1000))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TaskHandle,
    due: u64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, now: u64, delay_ticks: u64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due: now.saturating_add(delay_ticks),
            task,
        });
        handle
    }

    /// Returns true when the task was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Remove and return every task due at `now`, oldest schedule first.
    pub fn take_due(&mut self, now: u64) -> Vec<(TaskHandle, T)> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                let p = self.pending.remove(i);
                due.push((p.handle, p.task));
            } else {
                i += 1;
            }
        }
        due
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
