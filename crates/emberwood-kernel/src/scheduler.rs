//! Frame-bound timer scheduler.
//!
//! Schedules delayed and repeating work against the frame clock. Nothing
//! runs between frames: [`Scheduler::advance`] is called once per frame with
//! the current timestamp and returns the timers that came due, in firing
//! order. Callers re-validate entity liveness before acting on a fired
//! timer, since the owning entity may have moved, deactivated, or been
//! destroyed since scheduling.
//!
//! Every timer is bound to an owning entity so that destroying the entity
//! can synchronously cancel all of its outstanding timers with
//! [`Scheduler::cancel_owner`]. A cancelled timer never fires again.

use emberwood_common::{EntityId, TimerId};

/// Cancellable handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(TimerId);

impl TimerHandle {
    /// Returns the underlying timer id.
    #[must_use]
    pub const fn id(self) -> TimerId {
        self.0
    }
}

/// A timer that came due during [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired<K> {
    /// Handle of the timer that fired
    pub handle: TimerHandle,
    /// Entity the timer is bound to
    pub owner: EntityId,
    /// Caller-defined payload
    pub kind: K,
}

#[derive(Debug)]
struct Entry<K> {
    id: TimerId,
    owner: EntityId,
    fire_at: u64,
    period_ms: Option<u64>,
    kind: K,
}

/// Owner-bound timer scheduler, generic over the fired payload.
///
/// The payload type is defined by the caller (gameplay defines its own timer
/// event kinds), keeping this facility free of game semantics.
#[derive(Debug)]
pub struct Scheduler<K> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K: Clone> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Scheduler<K> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    fn push(
        &mut self,
        owner: EntityId,
        fire_at: u64,
        period_ms: Option<u64>,
        kind: K,
    ) -> TimerHandle {
        let id = TimerId::from_raw(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            owner,
            fire_at,
            period_ms,
            kind,
        });
        TimerHandle(id)
    }

    /// Schedules a one-shot timer `delay_ms` after `now_ms`.
    pub fn after(&mut self, owner: EntityId, now_ms: u64, delay_ms: u64, kind: K) -> TimerHandle {
        self.push(owner, now_ms + delay_ms, None, kind)
    }

    /// Schedules a repeating timer with the given period and start delay.
    ///
    /// The first firing happens `start_delay_ms` after `now_ms`, then every
    /// `period_ms` after that. A zero period is clamped to one millisecond.
    pub fn every(
        &mut self,
        owner: EntityId,
        now_ms: u64,
        period_ms: u64,
        start_delay_ms: u64,
        kind: K,
    ) -> TimerHandle {
        let period = period_ms.max(1);
        self.push(owner, now_ms + start_delay_ms, Some(period), kind)
    }

    /// Cancels a timer. Returns whether it was still scheduled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != handle.0);
        self.entries.len() != before
    }

    /// Cancels every timer bound to `owner`. Returns how many were removed.
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner != owner);
        before - self.entries.len()
    }

    /// Returns whether the handle refers to a still-scheduled timer.
    #[must_use]
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.id == handle.0)
    }

    /// Returns the number of scheduled timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no timers are scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drains every timer due at or before `now_ms`, in firing order.
    ///
    /// One-shot timers are removed; repeating timers are rescheduled and may
    /// fire several times in one call if more than a period elapsed.
    pub fn advance(&mut self, now_ms: u64) -> Vec<Fired<K>> {
        let mut due: Vec<(u64, u64, Fired<K>)> = Vec::new();

        for entry in &mut self.entries {
            match entry.period_ms {
                None => {
                    if entry.fire_at <= now_ms {
                        due.push((
                            entry.fire_at,
                            entry.id.raw(),
                            Fired {
                                handle: TimerHandle(entry.id),
                                owner: entry.owner,
                                kind: entry.kind.clone(),
                            },
                        ));
                    }
                },
                Some(period) => {
                    while entry.fire_at <= now_ms {
                        due.push((
                            entry.fire_at,
                            entry.id.raw(),
                            Fired {
                                handle: TimerHandle(entry.id),
                                owner: entry.owner,
                                kind: entry.kind.clone(),
                            },
                        ));
                        entry.fire_at += period;
                    }
                },
            }
        }

        self.entries
            .retain(|e| e.period_ms.is_some() || e.fire_at > now_ms);

        // Stable firing order: due time, then creation order.
        due.sort_by_key(|(fire_at, id, _)| (*fire_at, *id));
        due.into_iter().map(|(_, _, fired)| fired).collect()
    }
}
