//! The cycle store: sole owner of cycle history and the active-cycle identity.
//!
//! # Architecture
//!
//! [`CycleStore`] is a cheaply clonable handle around shared state. Every
//! operation takes the store's single mutex for the whole of its state
//! transition and publishes its [`CycleEvent`] before releasing it, so:
//!
//! - an `interrupt` and a tick-driven `finish` can never interleave; whichever
//!   takes the lock first wins and the other observes the result
//! - subscribers see events in exactly the order mutations were applied
//! - no caller ever observes a half-applied transition
//!
//! # Stale ticks
//!
//! [`CycleStore::set_elapsed`] and [`CycleStore::finish`] take the id of the
//! cycle the countdown tick was computed against. If that cycle is no longer
//! the active one (it was interrupted, or a newer cycle started), the tick is
//! discarded without touching state.
//!
//! # Example
//!
//! ```rust
//! use focus_timer_core::store::CycleStore;
//!
//! let store = CycleStore::default();
//! let cycle = store.create("Write report", 25).expect("no cycle is active");
//! assert_eq!(store.active_cycle().map(|c| c.id), Some(cycle.id));
//!
//! store.interrupt();
//! assert!(store.active_cycle().is_none());
//! assert!(store.history()[0].interrupted_at.is_some());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::Receiver;
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::broadcast::CycleBroadcaster;
use crate::clock::{Clock, SystemClock};
use crate::config::TimerConfig;
use crate::error::{CycleError, Result};
use crate::types::{validate_duration, validate_task, Cycle, CycleEvent, CycleId, NewCycle};

/// Result of delivering a countdown tick to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The elapsed cache moved forward and an event was published.
    Applied,
    /// The tick was for the active cycle but did not advance the cache.
    Unchanged,
    /// The tick was for a cycle that is no longer active and was discarded.
    Stale,
}

#[derive(Debug, Default)]
struct StoreState {
    /// Append-only, in creation order.
    cycles: Vec<Cycle>,
    /// Only ever the last entry of `cycles`.
    active: Option<CycleId>,
    /// Advisory cache for the active cycle.
    elapsed_seconds: u64,
    last_generation: u64,
}

impl StoreState {
    fn active_cycle_mut(&mut self, id: CycleId) -> Option<&mut Cycle> {
        if self.active != Some(id) {
            return None;
        }
        let cycle = self.cycles.last_mut()?;
        debug_assert_eq!(cycle.id, id, "active cycle must be the newest entry");
        debug_assert!(!cycle.is_terminal(), "active cycle must not be terminal");
        Some(cycle)
    }

    fn active_cycle(&self) -> Option<&Cycle> {
        let id = self.active?;
        self.cycles.last().filter(|cycle| cycle.id == id)
    }

    fn find(&self, id: CycleId) -> Option<&Cycle> {
        self.cycles
            .binary_search_by_key(&id, |cycle| cycle.id)
            .ok()
            .map(|index| &self.cycles[index])
    }
}

struct StoreInner {
    state: Mutex<StoreState>,
    broadcaster: CycleBroadcaster,
    clock: Arc<dyn Clock>,
    session_id: Uuid,
}

/// Thread-safe, in-memory cycle store for one focus session.
///
/// Construct one per session and pass clones to whoever needs it; there is no
/// global instance.
#[derive(Clone)]
pub struct CycleStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for CycleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CycleStore")
            .field("session_id", &self.inner.session_id)
            .field("cycles", &state.cycles.len())
            .field("active", &state.active)
            .field("elapsed_seconds", &state.elapsed_seconds)
            .finish()
    }
}

impl CycleStore {
    /// Creates an empty store reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_broadcaster(clock, CycleBroadcaster::new())
    }

    /// Creates an empty store sized from `config`.
    #[must_use]
    pub fn from_config(config: &TimerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_broadcaster(clock, CycleBroadcaster::with_capacity(config.event_capacity))
    }

    /// Creates an empty store publishing through `broadcaster`.
    #[must_use]
    pub fn with_broadcaster(clock: Arc<dyn Clock>, broadcaster: CycleBroadcaster) -> Self {
        let session_id = Uuid::new_v4();
        debug!(%session_id, "Creating new cycle store");
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(StoreState::default()),
                broadcaster,
                clock,
                session_id,
            }),
        }
    }

    /// Identifier of this store's session, for log correlation.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    /// The clock this store stamps cycles with.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    /// Subscribes to change events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<CycleEvent> {
        self.inner.broadcaster.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: CycleEvent) {
        self.inner.broadcaster.broadcast(event);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Starts a new cycle and makes it the active one.
    ///
    /// The task name is stored trimmed. The elapsed cache resets to zero.
    ///
    /// # Errors
    ///
    /// - [`CycleError::Validation`] if the task is empty or the duration is
    ///   outside `[1, 60]`
    /// - [`CycleError::Conflict`] if a cycle is already active; history is
    ///   left untouched
    pub fn create(&self, task: impl Into<String>, duration_minutes: u32) -> Result<Cycle> {
        let task = task.into();
        validate_task(&task)?;
        validate_duration(duration_minutes)?;

        let mut state = self.lock();
        if let Some(active) = state.active {
            debug!(cycle_id = %active, "Rejecting create while a cycle is active");
            return Err(CycleError::Conflict { active });
        }

        state.last_generation += 1;
        let cycle = Cycle::start(
            CycleId::from_generation(state.last_generation),
            task.trim().to_string(),
            duration_minutes,
            self.inner.clock.now(),
        );
        state.cycles.push(cycle.clone());
        state.active = Some(cycle.id);
        state.elapsed_seconds = 0;

        info!(
            session_id = %self.inner.session_id,
            cycle_id = %cycle.id,
            task = %cycle.task,
            duration_minutes,
            "Cycle started"
        );
        self.publish(CycleEvent::Created {
            cycle: cycle.clone(),
        });

        Ok(cycle)
    }

    /// Starts a new cycle from a form payload.
    ///
    /// # Errors
    ///
    /// Same as [`CycleStore::create`].
    pub fn create_from(&self, request: &NewCycle) -> Result<Cycle> {
        self.create(request.task.as_str(), request.minutes_amount)
    }

    /// Stops the active cycle early.
    ///
    /// Returns the interrupted cycle, or `None` when nothing was active.
    pub fn interrupt(&self) -> Option<Cycle> {
        let mut state = self.lock();
        let Some(id) = state.active else {
            debug!("Interrupt requested with no active cycle");
            return None;
        };

        let now = self.inner.clock.now();
        let cycle = state.active_cycle_mut(id)?;
        cycle.interrupted_at = Some(now);
        let cycle = cycle.clone();
        state.active = None;

        info!(
            session_id = %self.inner.session_id,
            cycle_id = %cycle.id,
            task = %cycle.task,
            "Cycle interrupted"
        );
        self.publish(CycleEvent::Interrupted {
            cycle: cycle.clone(),
        });

        Some(cycle)
    }

    /// Marks the cycle `id` as finished once its duration has elapsed.
    ///
    /// `finished_at` is set to `started_at + duration` rather than the current
    /// time, so the recorded elapsed time is exactly the duration regardless of
    /// how late the expiring tick arrived.
    ///
    /// Returns `Ok(None)` if `id` is no longer active (a stale tick).
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvariantViolation`] if the cycle has not yet
    /// reached its duration. State is left untouched.
    ///
    /// # Panics
    ///
    /// In debug builds, finishing a cycle early panics, since only the
    /// countdown driver calls this and it must never do so before expiry.
    pub fn finish(&self, id: CycleId) -> Result<Option<Cycle>> {
        self.finish_at(id, self.inner.clock.now())
    }

    /// Like [`finish`](Self::finish), but checks expiry against `now`
    /// instead of reading the store's clock.
    ///
    /// The countdown driver passes the same reading it used to decide the
    /// cycle had expired, so a clock that steps back between the two reads
    /// cannot turn an expired cycle into an early finish.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvariantViolation`] if `now` is before the
    /// cycle's expiry. State is left untouched.
    ///
    /// # Panics
    ///
    /// In debug builds, when `now` is before the cycle's expiry.
    pub fn finish_at(&self, id: CycleId, now: DateTime<Utc>) -> Result<Option<Cycle>> {
        let mut state = self.lock();

        let Some(cycle) = state.active_cycle_mut(id) else {
            debug!(cycle_id = %id, "Discarding stale finish");
            return Ok(None);
        };

        let expires_at = cycle.expires_at();
        if now < expires_at {
            let message = format!(
                "cycle {id} finished {}ms before expiry",
                (expires_at - now).num_milliseconds()
            );
            drop(state);
            error!(cycle_id = %id, "{message}");
            debug_assert!(false, "{message}");
            return Err(CycleError::InvariantViolation(message));
        }

        cycle.finished_at = Some(expires_at);
        let cycle = cycle.clone();
        state.elapsed_seconds = cycle.duration_seconds();
        state.active = None;

        info!(
            session_id = %self.inner.session_id,
            cycle_id = %cycle.id,
            task = %cycle.task,
            "Cycle finished"
        );
        self.publish(CycleEvent::Finished {
            cycle: cycle.clone(),
        });

        Ok(Some(cycle))
    }

    /// Records the latest elapsed-seconds observation for cycle `id`.
    ///
    /// The cache never moves backwards and never exceeds the cycle's
    /// duration. Observations for a cycle that is no longer active are
    /// discarded.
    pub fn set_elapsed(&self, id: CycleId, seconds: u64) -> TickOutcome {
        let mut state = self.lock();
        let Some(cycle) = state.active_cycle_mut(id) else {
            debug!(cycle_id = %id, seconds, "Discarding stale tick");
            return TickOutcome::Stale;
        };

        let seconds = seconds.min(cycle.duration_seconds());
        if seconds <= state.elapsed_seconds {
            trace!(cycle_id = %id, seconds, "Tick did not advance elapsed time");
            return TickOutcome::Unchanged;
        }

        state.elapsed_seconds = seconds;
        trace!(cycle_id = %id, seconds, "Elapsed time updated");
        self.publish(CycleEvent::Elapsed {
            cycle_id: id,
            seconds,
        });

        TickOutcome::Applied
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The cycle currently counting down, if any.
    #[must_use]
    pub fn active_cycle(&self) -> Option<Cycle> {
        self.lock().active_cycle().cloned()
    }

    /// The active cycle together with its cached elapsed seconds, read
    /// atomically.
    #[must_use]
    pub fn active_with_elapsed(&self) -> Option<(Cycle, u64)> {
        let state = self.lock();
        state
            .active_cycle()
            .map(|cycle| (cycle.clone(), state.elapsed_seconds))
    }

    /// Snapshot of every cycle in creation order.
    #[must_use]
    pub fn history(&self) -> Vec<Cycle> {
        self.lock().cycles.clone()
    }

    /// Number of cycles created in this session.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().cycles.len()
    }

    /// Returns true if no cycle was ever created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().cycles.is_empty()
    }

    /// Elapsed whole seconds of `cycle`.
    ///
    /// Terminal cycles report the time between start and their terminal
    /// timestamp, clamped to `[0, duration]`. The active cycle reports the
    /// cached value from the last tick. The store's own record wins over the
    /// passed snapshot, so a clone taken before the cycle ended still reports
    /// its final value.
    #[must_use]
    pub fn elapsed_for(&self, cycle: &Cycle) -> u64 {
        let state = self.lock();
        let current = state.find(cycle.id).unwrap_or(cycle);

        if let Some(ended_at) = current.terminated_at() {
            return current.elapsed_at(ended_at);
        }
        if state.active == Some(current.id) {
            return state.elapsed_seconds;
        }
        0
    }
}

impl Default for CycleStore {
    /// A store on the system wall clock.
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ValidationError;
    use crate::types::CycleStatus;
    use chrono::Duration;
    use tokio::sync::broadcast::error::TryRecvError;

    fn manual_store() -> (CycleStore, ManualClock) {
        let clock = ManualClock::default();
        (CycleStore::new(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn new_store_is_empty() {
        let (store, _) = manual_store();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.active_cycle().is_none());
        assert!(store.history().is_empty());
    }

    #[test]
    fn create_sets_active_and_stamps_start() {
        let (store, clock) = manual_store();
        let cycle = store.create("Write report", 25).unwrap();

        assert_eq!(cycle.task, "Write report");
        assert_eq!(cycle.duration_minutes, 25);
        assert_eq!(cycle.started_at, clock.now());
        assert_eq!(cycle.status(), CycleStatus::InProgress);
        assert_eq!(store.active_cycle(), Some(cycle.clone()));
        assert_eq!(store.elapsed_for(&cycle), 0);
    }

    #[test]
    fn create_trims_task() {
        let (store, _) = manual_store();
        let cycle = store.create("  Focus  ", 5).unwrap();
        assert_eq!(cycle.task, "Focus");
    }

    #[test]
    fn create_rejects_invalid_input_without_side_effects() {
        let (store, _) = manual_store();

        assert_eq!(
            store.create("", 25),
            Err(CycleError::Validation(ValidationError::EmptyTask))
        );
        assert_eq!(
            store.create("a", 0),
            Err(CycleError::Validation(ValidationError::DurationTooShort {
                minutes: 0
            }))
        );
        assert_eq!(
            store.create("a", 61),
            Err(CycleError::Validation(ValidationError::DurationTooLong {
                minutes: 61
            }))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn create_while_active_conflicts() {
        let (store, _) = manual_store();
        let first = store.create("A", 25).unwrap();

        let err = store.create("B", 10).unwrap_err();
        assert_eq!(err, CycleError::Conflict { active: first.id });
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_cycle().map(|c| c.id), Some(first.id));
    }

    #[test]
    fn create_from_payload() {
        let (store, _) = manual_store();
        let cycle = store.create_from(&NewCycle::new("Read", 15)).unwrap();
        assert_eq!(cycle.task, "Read");
        assert_eq!(cycle.duration_minutes, 15);
    }

    #[test]
    fn ids_follow_creation_order() {
        let (store, _) = manual_store();
        let first = store.create("A", 5).unwrap();
        store.interrupt();
        let second = store.create("B", 5).unwrap();

        assert!(first.id < second.id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn interrupt_ends_active_cycle() {
        let (store, clock) = manual_store();
        let cycle = store.create("Write report", 25).unwrap();
        clock.advance(Duration::seconds(90));

        let interrupted = store.interrupt().unwrap();
        assert_eq!(interrupted.id, cycle.id);
        assert_eq!(interrupted.interrupted_at, Some(clock.now()));
        assert_eq!(interrupted.finished_at, None);
        assert!(store.active_cycle().is_none());

        let history = store.history();
        assert_eq!(history[0].status(), CycleStatus::Interrupted);
        assert_eq!(store.elapsed_for(&cycle), 90);
    }

    #[test]
    fn interrupt_without_active_cycle_is_noop() {
        let (store, _) = manual_store();
        assert!(store.interrupt().is_none());

        store.create("A", 5).unwrap();
        assert!(store.interrupt().is_some());
        assert!(store.interrupt().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn finish_clamps_to_duration() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(75));

        let finished = store.finish(cycle.id).unwrap().unwrap();
        assert_eq!(finished.finished_at, Some(cycle.expires_at()));
        assert_eq!(finished.interrupted_at, None);
        assert!(store.active_cycle().is_none());
        assert_eq!(store.elapsed_for(&cycle), 60);
    }

    #[test]
    fn finish_exactly_at_expiry() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(60));

        assert!(store.finish(cycle.id).unwrap().is_some());
    }

    #[test]
    fn finish_for_stale_id_is_discarded() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        store.interrupt();
        clock.advance(Duration::seconds(60));

        assert_eq!(store.finish(cycle.id), Ok(None));
        let history = store.history();
        assert!(history[0].interrupted_at.is_some());
        assert!(history[0].finished_at.is_none());
    }

    #[test]
    fn finish_at_uses_the_given_reading_not_the_clock() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        // Store clock stepped back one second behind the caller's reading.
        clock.advance(Duration::seconds(59));

        let finished = store
            .finish_at(cycle.id, cycle.expires_at())
            .unwrap()
            .unwrap();
        assert_eq!(finished.finished_at, Some(cycle.expires_at()));
        assert!(store.active_cycle().is_none());
        assert_eq!(store.elapsed_for(&cycle), 60);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "before expiry")]
    fn finish_at_before_expiry_panics_in_debug() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(120));
        let _ = store.finish_at(cycle.id, cycle.started_at + Duration::seconds(30));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "before expiry")]
    fn finish_before_expiry_panics_in_debug() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(30));
        let _ = store.finish(cycle.id);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn finish_before_expiry_is_rejected_in_release() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(30));

        assert!(matches!(
            store.finish(cycle.id),
            Err(CycleError::InvariantViolation(_))
        ));
        assert_eq!(store.active_cycle().map(|c| c.id), Some(cycle.id));
    }

    #[test]
    fn set_elapsed_updates_cache() {
        let (store, _) = manual_store();
        let cycle = store.create("Focus", 25).unwrap();

        assert_eq!(store.set_elapsed(cycle.id, 12), TickOutcome::Applied);
        assert_eq!(store.elapsed_for(&cycle), 12);
        assert_eq!(
            store.active_with_elapsed().map(|(c, s)| (c.id, s)),
            Some((cycle.id, 12))
        );
    }

    #[test]
    fn set_elapsed_never_decreases() {
        let (store, _) = manual_store();
        let cycle = store.create("Focus", 25).unwrap();

        store.set_elapsed(cycle.id, 30);
        assert_eq!(store.set_elapsed(cycle.id, 20), TickOutcome::Unchanged);
        assert_eq!(store.set_elapsed(cycle.id, 30), TickOutcome::Unchanged);
        assert_eq!(store.elapsed_for(&cycle), 30);
    }

    #[test]
    fn set_elapsed_is_capped_at_duration() {
        let (store, _) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();

        store.set_elapsed(cycle.id, 500);
        assert_eq!(store.elapsed_for(&cycle), 60);
    }

    #[test]
    fn set_elapsed_after_interrupt_is_stale() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 25).unwrap();
        clock.advance(Duration::seconds(10));
        store.interrupt();

        assert_eq!(store.set_elapsed(cycle.id, 11), TickOutcome::Stale);
        assert_eq!(store.elapsed_for(&cycle), 10);
    }

    #[test]
    fn tick_for_previous_cycle_does_not_touch_new_one() {
        let (store, _) = manual_store();
        let old = store.create("Old", 5).unwrap();
        store.interrupt();
        let new = store.create("New", 5).unwrap();

        assert_eq!(store.set_elapsed(old.id, 100), TickOutcome::Stale);
        assert_eq!(store.elapsed_for(&new), 0);
    }

    #[test]
    fn interrupt_wins_over_late_expiry_tick() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 1).unwrap();
        clock.advance(Duration::seconds(61));

        store.interrupt();
        assert_eq!(store.set_elapsed(cycle.id, 60), TickOutcome::Stale);
        assert_eq!(store.finish(cycle.id), Ok(None));

        let ended = &store.history()[0];
        assert_eq!(ended.status(), CycleStatus::Interrupted);
        assert!(ended.finished_at.is_none());
        assert_eq!(store.elapsed_for(ended), 60);
    }

    #[test]
    fn terminal_cycles_are_never_mutated() {
        let (store, clock) = manual_store();
        let first = store.create("A", 1).unwrap();
        clock.advance(Duration::seconds(5));
        store.interrupt();
        let frozen = store.history()[0].clone();

        clock.advance(Duration::seconds(120));
        store.set_elapsed(first.id, 60);
        let _ = store.finish(first.id);
        store.interrupt();
        let second = store.create("B", 1).unwrap();
        clock.advance(Duration::seconds(60));
        store.finish(second.id).unwrap();

        assert_eq!(store.history()[0], frozen);
    }

    #[test]
    fn elapsed_for_uses_store_record_over_stale_snapshot() {
        let (store, clock) = manual_store();
        let snapshot = store.create("Focus", 25).unwrap();
        clock.advance(Duration::seconds(42));
        store.interrupt();

        assert!(snapshot.interrupted_at.is_none());
        assert_eq!(store.elapsed_for(&snapshot), 42);
    }

    #[test]
    fn elapsed_for_interrupt_before_start_is_zero() {
        let (store, clock) = manual_store();
        let cycle = store.create("Focus", 25).unwrap();
        clock.advance(Duration::seconds(-30));
        store.interrupt();
        assert_eq!(store.elapsed_for(&cycle), 0);
    }

    #[test]
    fn history_is_append_only_in_creation_order() {
        let (store, clock) = manual_store();
        let mut created = Vec::new();
        for (index, task) in ["A", "B", "C"].into_iter().enumerate() {
            let cycle = store.create(task, 1).unwrap();
            created.push(cycle.id);
            assert_eq!(store.len(), index + 1);
            clock.advance(Duration::seconds(60));
            store.finish(cycle.id).unwrap();
        }

        let ids: Vec<_> = store.history().iter().map(|c| c.id).collect();
        assert_eq!(ids, created);
    }

    #[test]
    fn every_mutation_publishes_one_event() {
        let (store, clock) = manual_store();
        let mut rx = store.subscribe();

        let cycle = store.create("Focus", 1).unwrap();
        store.set_elapsed(cycle.id, 10);
        store.set_elapsed(cycle.id, 10);
        clock.advance(Duration::seconds(60));
        store.finish(cycle.id).unwrap();
        store.interrupt();
        let _ = store.create("", 1);

        assert!(matches!(rx.try_recv(), Ok(CycleEvent::Created { .. })));
        assert_eq!(
            rx.try_recv(),
            Ok(CycleEvent::Elapsed {
                cycle_id: cycle.id,
                seconds: 10
            })
        );
        assert!(matches!(rx.try_recv(), Ok(CycleEvent::Finished { .. })));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn clones_share_state() {
        let (store, _) = manual_store();
        let other = store.clone();
        store.create("Focus", 5).unwrap();

        assert_eq!(other.len(), 1);
        assert_eq!(other.session_id(), store.session_id());
        assert!(other.interrupt().is_some());
        assert!(store.active_cycle().is_none());
    }

    #[test]
    fn independent_stores_do_not_share_state() {
        let (a, _) = manual_store();
        let (b, _) = manual_store();
        a.create("Focus", 5).unwrap();

        assert!(b.is_empty());
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn debug_output_summarizes_state() {
        let (store, _) = manual_store();
        store.create("Focus", 5).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("cycles: 1"));
    }
}
