//! Deferred callbacks in virtual time
//!
//! Every suspension in a run is a task handed to a [`Scheduler`]. The
//! [`TimerQueue`] keeps its own clock, which the host advances: a frame loop
//! passes elapsed time, the CLI sleeps on tokio until the next deadline, and
//! tests step it by hand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A deferred callback
pub type Task = Box<dyn FnOnce()>;

/// Something that can run a task after a delay
pub trait Scheduler {
    /// Current time on this scheduler's clock
    fn now(&self) -> Duration;

    /// Run `task` once `delay` has elapsed from `now()`
    fn schedule(&self, delay: Duration, task: Task);
}

/// Virtual-time timer queue.
///
/// Tasks with equal deadlines run in the order they were scheduled.
#[derive(Default)]
pub struct TimerQueue {
    inner: RefCell<QueueInner>,
}

#[derive(Default)]
struct QueueInner {
    now: Duration,
    next_seq: u64,
    entries: BTreeMap<(Duration, u64), Task>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run
    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .entries
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        self.advance_to(target)
    }

    /// Move the clock to `target`, running due tasks in deadline order.
    ///
    /// Tasks scheduled while advancing run in the same call if their deadline
    /// is not later than `target`. The clock never moves backwards.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }

        let mut inner = self.inner.borrow_mut();
        if inner.now < target {
            inner.now = target;
        }
        if ran > 0 {
            log::trace!("[Timer] Ran {} task(s), now at {:?}", ran, inner.now);
        }
        ran
    }

    /// Run pending tasks until none remain, jumping the clock between them
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(deadline) = self.next_deadline() {
            ran += self.advance_to(deadline);
        }
        ran
    }

    /// Drop every pending task without running it
    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut inner = self.inner.borrow_mut();
        let entry = inner.entries.first_entry()?;
        let (deadline, _) = *entry.key();
        if deadline > target {
            return None;
        }
        let task = entry.remove();
        if inner.now < deadline {
            inner.now = deadline;
        }
        Some(task)
    }
}

impl Scheduler for TimerQueue {
    fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    fn schedule(&self, delay: Duration, task: Task) {
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert((deadline, seq), task);
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerQueue")
            .field("now", &inner.now)
            .field("pending", &inner.entries.len())
            .finish()
    }
}
