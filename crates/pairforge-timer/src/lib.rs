//! Fire-once delayed task timer for Pairforge.
//!
//! A [`DelayTimer`] holds at most one pending task. Arming it schedules the
//! task to become due after a delay; [`DelayTimer::wait_for_due`] resolves
//! with the task once the deadline passes. Nothing is spawned: the timer
//! lives inside the owning session actor, so a due task is handled by the
//! same loop that handles every other mutation of that session.
//!
//! # Idle mode
//!
//! When nothing is armed, `wait_for_due` pends forever. This is what a
//! session wants between turns: the `select!` keeps serving commands and
//! the timer branch simply never wins.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* flips, shutdown */ }
//!         task = timer.wait_for_due() => { /* hide pair, announce game over */ }
//!     }
//! }
//! ```
//!
//! Dropping the timer (because the actor exited) drops the pending task
//! with it. That is the only cancellation a session needs.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters describing how a timer has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Tasks accepted by [`DelayTimer::arm`].
    pub armed: u64,
    /// Tasks returned by [`DelayTimer::wait_for_due`].
    pub fired: u64,
    /// Tasks removed by [`DelayTimer::cancel`] before firing.
    pub cancelled: u64,
    /// Arm attempts refused because a task was already pending.
    pub rejected: u64,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

struct Pending<T> {
    task: T,
    deadline: Instant,
}

/// A single-slot, fire-once timer carrying a task payload `T`.
///
/// One `DelayTimer` per session actor. The payload describes what to do
/// when the delay elapses (for example "hide these two cards").
pub struct DelayTimer<T> {
    pending: Option<Pending<T>>,
    stats: TimerStats,
}

impl<T> DelayTimer<T> {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self {
            pending: None,
            stats: TimerStats::default(),
        }
    }

    /// Schedule `task` to become due after `delay`.
    ///
    /// Only one task may be pending at a time. If one already is, the new
    /// task is handed back in `Err` and the pending one is left untouched,
    /// so a concern can never be resolved twice.
    pub fn arm(&mut self, task: T, delay: Duration) -> Result<(), T> {
        if self.pending.is_some() {
            self.stats.rejected += 1;
            warn!(
                delay_ms = delay.as_millis() as u64,
                "delayed task already pending, refusing to arm another"
            );
            return Err(task);
        }

        let deadline = Instant::now() + delay;
        self.pending = Some(Pending { task, deadline });
        self.stats.armed += 1;
        debug!(delay_ms = delay.as_millis() as u64, "delayed task armed");
        Ok(())
    }

    /// Remove the pending task without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        let task = self.pending.take().map(|p| p.task);
        if task.is_some() {
            self.stats.cancelled += 1;
            debug!("delayed task cancelled");
        }
        task
    }

    /// Wait until the pending task is due and return it.
    ///
    /// Pends forever while nothing is armed. Cancel-safe: if this future is
    /// dropped before the deadline (another `select!` branch won), the task
    /// stays armed.
    pub async fn wait_for_due(&mut self) -> T {
        let deadline = match &self.pending {
            Some(p) => p.deadline,
            None => return std::future::pending().await,
        };

        time::sleep_until(deadline).await;

        match self.pending.take() {
            Some(p) => {
                self.stats.fired += 1;
                trace!(
                    late_us = Instant::now()
                        .saturating_duration_since(p.deadline)
                        .as_micros() as u64,
                    "delayed task fired"
                );
                p.task
            }
            // Unreachable while `&mut self` is held across the sleep.
            None => std::future::pending().await,
        }
    }

    /// Whether a task is pending.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending task, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.task)
    }

    /// Time left until the pending task is due. `None` when idle.
    pub fn remaining(&self) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(Instant::now()))
    }

    /// Snapshot of usage counters.
    pub fn stats(&self) -> TimerStats {
        self.stats
    }
}

impl<T> Default for DelayTimer<T> {
    fn default() -> Self {
        Self::new()
    }
}
