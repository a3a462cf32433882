//! Cooperative scheduler for several processors on one timeline.
//!
//! Each task (a CPU, or a video chip) owns a local clock. The scheduler
//! always hands the next time slice to the runnable task that is furthest
//! behind, so every device sees the others in time order and two runs of the
//! same machine are identical.
//!
//! # Spin until trigger
//!
//! A task can suspend itself with [`Scheduler::spin_until_trigger`]. It stays
//! off the timeline until another task fires the same [`TriggerId`] or until
//! its timeout elapses, whichever comes first. Timeouts sit in a min-heap
//! keyed by wake time; a trigger bumps the task's generation so the stale
//! heap entry is discarded when it surfaces instead of being searched for.
//!
//! Boards use this to approximate a hardware WAIT line: the real signal
//! freezes a CPU until another one touches a latch, which a per-instruction
//! CPU core cannot express.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use crate::Ticks;

/// Handle for a task registered with a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(usize);

impl TaskId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Wake channel shared between a suspended task and the task that resumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerId(pub u32);

/// How a suspended task came back onto the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resume {
    /// Another task fired the trigger it was waiting on.
    Triggered,
    /// Its timeout elapsed first.
    TimedOut,
}

/// A span of time granted to one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub task: TaskId,
    /// The task's local time when the slice begins.
    pub start: Ticks,
    /// Time the task may consume. Never zero.
    pub budget: Ticks,
}

impl Slice {
    /// Local time at which the slice is used up.
    #[must_use]
    pub fn end(&self) -> Ticks {
        self.start + self.budget
    }
}

#[derive(Debug, Clone, Copy)]
struct Suspension {
    trigger: TriggerId,
    wake_at: Ticks,
}

#[derive(Debug, Clone)]
struct Task {
    name: &'static str,
    local: Ticks,
    suspended: Option<Suspension>,
    generation: u64,
    last_resume: Option<Resume>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Wake {
    at: Ticks,
    sequence: u64,
    task: usize,
    generation: u64,
}

/// Deterministic cooperative scheduler.
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<Task>,
    wakes: BinaryHeap<Reverse<Wake>>,
    quantum: Ticks,
    sequence: u64,
    /// Furthest target any caller has asked for.
    horizon: Ticks,
}

impl Scheduler {
    /// Create a scheduler that hands out slices of at most `quantum`.
    ///
    /// # Panics
    ///
    /// Panics if `quantum` is zero.
    #[must_use]
    pub fn new(quantum: Ticks) -> Self {
        assert!(quantum > Ticks::ZERO, "scheduler quantum must be non-zero");
        Self {
            tasks: Vec::new(),
            wakes: BinaryHeap::new(),
            quantum,
            sequence: 0,
            horizon: Ticks::ZERO,
        }
    }

    /// Register a task starting at time zero.
    pub fn add_task(&mut self, name: &'static str) -> TaskId {
        self.tasks.push(Task {
            name,
            local: Ticks::ZERO,
            suspended: None,
            generation: 0,
            last_resume: None,
        });
        TaskId(self.tasks.len() - 1)
    }

    #[must_use]
    pub fn local_time(&self, task: TaskId) -> Ticks {
        self.tasks[task.0].local
    }

    /// Global time: the local time of the runnable task furthest behind.
    ///
    /// Suspended tasks are skipped; they are parked at the time they
    /// stopped while the rest of the board runs on. With every task
    /// suspended this is the furthest target handed to
    /// [`Scheduler::next_slice`].
    #[must_use]
    pub fn now(&self) -> Ticks {
        self.tasks
            .iter()
            .filter(|t| t.suspended.is_none())
            .map(|t| t.local)
            .min()
            .unwrap_or(self.horizon)
    }

    #[must_use]
    pub fn is_suspended(&self, task: TaskId) -> bool {
        self.tasks[task.0].suspended.is_some()
    }

    /// Time at which a suspended task will resume if nobody triggers it.
    #[must_use]
    pub fn wake_time(&self, task: TaskId) -> Option<Ticks> {
        self.tasks[task.0].suspended.map(|s| s.wake_at)
    }

    /// How the task last left a suspension.
    #[must_use]
    pub fn last_resume(&self, task: TaskId) -> Option<Resume> {
        self.tasks[task.0].last_resume
    }

    /// Pick the next slice to run, or `None` once every task has reached
    /// `until` (or is suspended past it).
    pub fn next_slice(&mut self, until: Ticks) -> Option<Slice> {
        self.horizon = self.horizon.max(until);
        loop {
            self.discard_stale_wakes();
            let next_wake = self.wakes.peek().map(|Reverse(w)| *w);

            let runnable = self
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.suspended.is_none() && t.local < until)
                .min_by_key(|(i, t)| (t.local, *i))
                .map(|(i, t)| (i, t.local));

            match (runnable, next_wake) {
                // A timeout falls due before the laggard's next instruction.
                (Some((_, local)), Some(wake)) if wake.at <= local => {
                    self.fire_wake(wake);
                }
                // Nothing can run; jump straight to the next timeout.
                (None, Some(wake)) if wake.at < until => {
                    self.fire_wake(wake);
                }
                (None, _) => return None,
                (Some((index, start)), wake) => {
                    let mut end = until.min(start + self.quantum);
                    if let Some(wake) = wake {
                        end = end.min(wake.at);
                    }
                    return Some(Slice {
                        task: TaskId(index),
                        start,
                        budget: end - start,
                    });
                }
            }
        }
    }

    /// Record that `task` ran up to local time `end`.
    pub fn finish_slice(&mut self, task: TaskId, end: Ticks) {
        let task = &mut self.tasks[task.0];
        task.local = task.local.max(end);
    }

    /// Suspend `task` at local time `now` until `trigger` fires or
    /// `timeout` elapses.
    pub fn spin_until_trigger(
        &mut self,
        task: TaskId,
        trigger: TriggerId,
        now: Ticks,
        timeout: Ticks,
    ) {
        let sequence = self.sequence;
        self.sequence += 1;

        let slot = &mut self.tasks[task.0];
        slot.local = slot.local.max(now);
        slot.generation += 1;
        let wake_at = slot.local + timeout;
        slot.suspended = Some(Suspension { trigger, wake_at });

        trace!(
            "{} spins on trigger {} at {} (timeout at {})",
            slot.name,
            trigger.0,
            slot.local.get(),
            wake_at.get()
        );

        self.wakes.push(Reverse(Wake {
            at: wake_at,
            sequence,
            task: task.0,
            generation: slot.generation,
        }));
    }

    /// Fire `trigger` at time `now`, resuming every task waiting on it.
    ///
    /// Returns the number of tasks woken. A resumed task's clock moves up
    /// to `now` if it was behind: it spent that time stalled.
    pub fn trigger(&mut self, trigger: TriggerId, now: Ticks) -> usize {
        let waiting: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.suspended.is_some_and(|s| s.trigger == trigger))
            .map(|(i, _)| i)
            .collect();

        for &index in &waiting {
            trace!(
                "trigger {} wakes {} at {}",
                trigger.0,
                self.tasks[index].name,
                now.get()
            );
            self.resume(index, now, Resume::Triggered);
        }
        waiting.len()
    }

    /// Return every task to time zero with no suspensions.
    pub fn reset(&mut self) {
        for task in &mut self.tasks {
            task.local = Ticks::ZERO;
            task.suspended = None;
            task.generation += 1;
            task.last_resume = None;
        }
        self.wakes.clear();
        self.horizon = Ticks::ZERO;
    }

    fn resume(&mut self, index: usize, at: Ticks, reason: Resume) {
        let task = &mut self.tasks[index];
        task.suspended = None;
        task.generation += 1;
        task.local = task.local.max(at);
        task.last_resume = Some(reason);
    }

    fn fire_wake(&mut self, wake: Wake) {
        self.wakes.pop();
        trace!(
            "{} times out at {}",
            self.tasks[wake.task].name,
            wake.at.get()
        );
        self.resume(wake.task, wake.at, Resume::TimedOut);
    }

    fn discard_stale_wakes(&mut self) {
        while let Some(Reverse(wake)) = self.wakes.peek() {
            let task = &self.tasks[wake.task];
            if task.suspended.is_some() && task.generation == wake.generation {
                break;
            }
            self.wakes.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: TriggerId = TriggerId(500);

    fn two_tasks() -> (Scheduler, TaskId, TaskId) {
        let mut sched = Scheduler::new(Ticks::new(100));
        let a = sched.add_task("a");
        let b = sched.add_task("b");
        (sched, a, b)
    }

    /// Run every slice to completion, logging who ran when.
    fn drain(sched: &mut Scheduler, until: Ticks) -> Vec<(TaskId, u64, u64)> {
        let mut log = Vec::new();
        while let Some(slice) = sched.next_slice(until) {
            log.push((slice.task, slice.start.get(), slice.end().get()));
            sched.finish_slice(slice.task, slice.end());
        }
        log
    }

    #[test]
    fn laggard_runs_first_with_index_tiebreak() {
        let (mut sched, a, b) = two_tasks();
        let log = drain(&mut sched, Ticks::new(250));
        assert_eq!(
            log,
            vec![
                (a, 0, 100),
                (b, 0, 100),
                (a, 100, 200),
                (b, 100, 200),
                (a, 200, 250),
                (b, 200, 250),
            ]
        );
        assert_eq!(sched.now(), Ticks::new(250));
    }

    #[test]
    fn now_skips_suspended_tasks() {
        let (mut sched, a, b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(10), Ticks::new(1_000));
        let _ = drain(&mut sched, Ticks::new(300));
        assert_eq!(sched.local_time(a), Ticks::new(10));
        assert_eq!(sched.local_time(b), Ticks::new(300));
        assert_eq!(sched.now(), Ticks::new(300));
    }

    #[test]
    fn now_with_every_task_suspended_is_the_target() {
        let mut sched = Scheduler::new(Ticks::new(64));
        let a = sched.add_task("a");
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(10), Ticks::new(500));
        assert!(sched.next_slice(Ticks::new(200)).is_none());
        assert_eq!(sched.now(), Ticks::new(200));

        sched.reset();
        assert_eq!(sched.now(), Ticks::ZERO);
    }

    #[test]
    fn suspended_task_gets_no_slices() {
        let (mut sched, a, b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(10), Ticks::new(1_000));

        let slice = sched.next_slice(Ticks::new(500)).expect("b runnable");
        assert_eq!(slice.task, b);
        assert!(sched.is_suspended(a));
    }

    #[test]
    fn trigger_resumes_immediately_and_cancels_timeout() {
        let (mut sched, a, b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(40), Ticks::new(500));
        assert_eq!(sched.wake_time(a), Some(Ticks::new(540)));

        sched.finish_slice(b, Ticks::new(120));
        assert_eq!(sched.trigger(TRIGGER, Ticks::new(120)), 1);

        assert!(!sched.is_suspended(a));
        assert_eq!(sched.local_time(a), Ticks::new(120));
        assert_eq!(sched.last_resume(a), Some(Resume::Triggered));

        // The cancelled timeout must not fire later.
        let _ = drain(&mut sched, Ticks::new(2_000));
        assert_eq!(sched.last_resume(a), Some(Resume::Triggered));
    }

    #[test]
    fn trigger_never_moves_a_task_backwards() {
        let (mut sched, a, _b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(300), Ticks::new(500));
        sched.trigger(TRIGGER, Ticks::new(50));
        assert_eq!(sched.local_time(a), Ticks::new(300));
    }

    #[test]
    fn timeout_resumes_within_bound() {
        let (mut sched, a, b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(0), Ticks::new(500));

        let log = drain(&mut sched, Ticks::new(1_000));

        assert_eq!(sched.last_resume(a), Some(Resume::TimedOut));
        // b is never allowed past the wake point before a is back.
        assert!(log.contains(&(b, 400, 500)));
        let first_a = log.iter().find(|(t, _, _)| *t == a).expect("a resumed");
        assert_eq!(first_a.1, 500);
    }

    #[test]
    fn lone_suspended_task_jumps_to_its_timeout() {
        let mut sched = Scheduler::new(Ticks::new(64));
        let a = sched.add_task("a");
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(10), Ticks::new(500));

        let slice = sched.next_slice(Ticks::new(10_000)).expect("a wakes");
        assert_eq!(slice.task, a);
        assert_eq!(slice.start, Ticks::new(510));
        assert_eq!(sched.last_resume(a), Some(Resume::TimedOut));
    }

    #[test]
    fn timeout_past_target_stays_pending() {
        let mut sched = Scheduler::new(Ticks::new(64));
        let a = sched.add_task("a");
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(0), Ticks::new(500));
        assert!(sched.next_slice(Ticks::new(200)).is_none());
        assert!(sched.is_suspended(a));
    }

    #[test]
    fn other_triggers_do_not_wake() {
        let (mut sched, a, _b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::ZERO, Ticks::new(500));
        assert_eq!(sched.trigger(TriggerId(7), Ticks::new(10)), 0);
        assert!(sched.is_suspended(a));
    }

    #[test]
    fn respin_after_trigger_gets_fresh_timeout() {
        let (mut sched, a, _b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::ZERO, Ticks::new(100));
        sched.trigger(TRIGGER, Ticks::new(20));
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(30), Ticks::new(100));

        // The first (stale) wake at 100 must be ignored.
        let _ = drain(&mut sched, Ticks::new(110));
        assert!(sched.is_suspended(a));
        assert_eq!(sched.wake_time(a), Some(Ticks::new(130)));
    }

    #[test]
    fn reset_clears_everything() {
        let (mut sched, a, b) = two_tasks();
        sched.spin_until_trigger(a, TRIGGER, Ticks::new(5), Ticks::new(50));
        sched.finish_slice(b, Ticks::new(80));
        sched.reset();

        assert!(!sched.is_suspended(a));
        assert_eq!(sched.local_time(b), Ticks::ZERO);
        let log = drain(&mut sched, Ticks::new(100));
        assert_eq!(log, vec![(a, 0, 100), (b, 0, 100)]);
    }
}
