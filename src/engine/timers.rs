//! Armed-timer bookkeeping for the sequencer.
//!
//! The engine never sleeps or reads a clock itself; callers pass `now` in
//! and wait until [`Timers::next_deadline`]. At most one timer per
//! [`TimerKind`] exists: arming replaces (and so cancels) the old one.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Moves on to the next slide after the display duration.
    Advance,
    /// Renders the next crossfade step.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    pub id: u64,
    pub kind: TimerKind,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
pub struct Timers {
    next_id: u64,
    advance: Option<TimerHandle>,
    tick: Option<TimerHandle>,
}

impl Timers {
    pub fn arm(&mut self, kind: TimerKind, deadline: Instant) -> TimerHandle {
        self.cancel(kind);
        self.next_id += 1;
        let handle = TimerHandle {
            id: self.next_id,
            kind,
            deadline,
        };
        *self.slot(kind) = Some(handle);
        handle
    }

    pub fn cancel(&mut self, kind: TimerKind) -> Option<TimerHandle> {
        self.slot(kind).take()
    }

    pub fn cancel_all(&mut self) {
        self.advance = None;
        self.tick = None;
    }

    pub fn armed(&self, kind: TimerKind) -> Option<TimerHandle> {
        match kind {
            TimerKind::Advance => self.advance,
            TimerKind::Tick => self.tick,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        [self.advance, self.tick]
            .into_iter()
            .flatten()
            .map(|h| h.deadline)
            .min()
    }

    /// Disarm and return the earliest timer whose deadline is not after `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<TimerHandle> {
        let due = [self.advance, self.tick]
            .into_iter()
            .flatten()
            .filter(|h| h.deadline <= now)
            .min_by_key(|h| (h.deadline, h.id))?;
        self.cancel(due.kind)
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Advance => &mut self.advance,
            TimerKind::Tick => &mut self.tick,
        }
    }
}
