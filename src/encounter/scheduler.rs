//! Timed Event Scheduler
//!
//! The boss AI is driven by named events with due times (special attacks,
//! enrage timers, health polls). Each simulation tick the scheduler is
//! advanced by the elapsed time and asked for at most one due event; the
//! controller dispatches it and usually reschedules via [`EventScheduler::repeat`].
//!
//! ## Usage
//! ```ignore
//! let mut events = EventScheduler::new();
//! events.schedule(EncounterEvent::SpecialAttack, Duration::from_millis(2400));
//! events.advance(tick_delta);
//! if let Some(event) = events.pop_due() {
//!     // handle, then:
//!     events.repeat(Duration::from_millis(2400));
//! }
//! ```

use std::time::Duration;

use smallvec::SmallVec;

/// How `schedule` treats a kind that already has a pending instance.
///
/// The permissive default allows overlapping timers of the same kind; the
/// boss scripts shipped here never rely on it, but the policy is kept
/// explicit rather than silently baked in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Every `schedule` call creates an independent pending instance.
    Allow,
    /// A new `schedule` call replaces any pending instance of the same kind.
    CoalesceLatest,
}

/// A single pending event: what fires, when, and in which insertion order.
#[derive(Clone, Copy, Debug)]
struct PendingEvent<K> {
    kind: K,
    due_at: Duration,
    /// Insertion sequence, used as the tie-break for equal due times.
    seq: u64,
}

/// Priority-ordered collection of pending named events.
///
/// Time only moves via [`advance`](Self::advance); there is no suspension or
/// internal threading. Popping an event on a tick where several are overdue
/// returns only the earliest - the rest fire on subsequent ticks.
pub struct EventScheduler<K> {
    clock: Duration,
    pending: SmallVec<[PendingEvent<K>; 8]>,
    next_seq: u64,
    last_popped: Option<K>,
    policy: DuplicatePolicy,
}

impl<K: Copy + Eq> EventScheduler<K> {
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Allow)
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            clock: Duration::ZERO,
            pending: SmallVec::new(),
            next_seq: 0,
            last_popped: None,
            policy,
        }
    }

    /// Discard all pending events and restart the clock from zero.
    /// This is the only cancellation primitive - there is no per-kind cancel.
    pub fn reset(&mut self) {
        self.clock = Duration::ZERO;
        self.pending.clear();
        self.next_seq = 0;
        self.last_popped = None;
    }

    /// Insert a pending event due `delay` from now. A zero delay means the
    /// event is due on the very next `pop_due`.
    pub fn schedule(&mut self, kind: K, delay: Duration) {
        if self.policy == DuplicatePolicy::CoalesceLatest {
            self.pending.retain(|e| e.kind != kind);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingEvent {
            kind,
            due_at: self.clock + delay,
            seq,
        });
    }

    /// Add elapsed tick time to the internal clock. Pure bookkeeping; must be
    /// called before `pop_due` on the same tick.
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock += elapsed;
    }

    /// Remove and return the earliest-due pending event whose due time has
    /// been reached, or `None` if nothing is due. Ties on due time resolve in
    /// insertion order.
    pub fn pop_due(&mut self) -> Option<K> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_at <= self.clock)
            .min_by_key(|(_, e)| (e.due_at, e.seq))
            .map(|(i, _)| i)?;
        let event = self.pending.remove(idx);
        self.last_popped = Some(event.kind);
        Some(event.kind)
    }

    /// Reschedule the most recently popped kind at `delay` from *now* (the
    /// fire time, not the original due time). This is the idiom for periodic
    /// events: pop, act, repeat.
    pub fn repeat(&mut self, delay: Duration) {
        if let Some(kind) = self.last_popped {
            self.schedule(kind, delay);
        }
    }

    /// Current internal clock (total advanced time since reset/creation).
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<K: Copy + Eq> Default for EventScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
