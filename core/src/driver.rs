//! The countdown driver: turns wall-clock time into elapsed-second ticks and
//! finishes cycles when they expire.
//!
//! # Architecture
//!
//! The driver is split in three layers:
//!
//! - [`Countdown`]: the synchronous tick for one cycle. It derives elapsed
//!   time from `now - started_at` (never by counting ticks, so missed or late
//!   ticks cannot skew it) and reports it to the store, finishing the cycle
//!   once the duration is reached.
//! - [`TickerHandle`]: a spawned task running one [`Countdown`] on a fixed
//!   interval. Dropping or cancelling the handle aborts the task, so no timer
//!   outlives the cycle it was started for.
//! - [`CountdownDriver`]: a long-lived task subscribed to the store's change
//!   events. It starts a ticker on [`CycleEvent::Created`] and cancels it on
//!   [`CycleEvent::Interrupted`] / [`CycleEvent::Finished`].
//!
//! ```text
//!            Created                     elapsed >= duration
//!   Idle ─────────────▶ Running ──────────────────────────▶ (Expiring) ──▶ Idle
//!                          │                                  set_elapsed
//!                          │ Interrupted / stale tick          + finish
//!                          └──────────────────────────────────────────────▶ Idle
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use focus_timer_core::driver::CountdownDriver;
//! use focus_timer_core::store::CycleStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CycleStore::default();
//! let driver = CountdownDriver::new(store.clone(), Duration::from_secs(1)).spawn();
//!
//! store.create("Write report", 25)?;
//! // ... the driver finishes the cycle after 25 minutes unless interrupted.
//!
//! driver.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use crate::clock::Clock;
use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::store::{CycleStore, TickOutcome};
use crate::types::{Cycle, CycleEvent, CycleId};

/// Observable state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// No cycle is counting down.
    #[default]
    Idle,
    /// A ticker is running for `cycle_id`.
    Running {
        cycle_id: CycleId,
        duration_seconds: u64,
    },
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    /// The cycle is still counting down.
    Running { elapsed: u64 },
    /// This tick expired and finished the cycle.
    Finished(Cycle),
    /// The cycle is no longer active; the tick was discarded.
    Detached,
}

impl TickResult {
    /// Returns true if the countdown should keep ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Tick logic for one cycle.
///
/// Holds only what it needs to compute elapsed time; all state changes go
/// through the [`CycleStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    cycle_id: CycleId,
    started_at: DateTime<Utc>,
    duration_seconds: u64,
}

impl Countdown {
    /// Prepares a countdown for `cycle`.
    #[must_use]
    pub fn for_cycle(cycle: &Cycle) -> Self {
        Self {
            cycle_id: cycle.id,
            started_at: cycle.started_at,
            duration_seconds: cycle.duration_seconds(),
        }
    }

    /// The cycle this countdown drives.
    #[must_use]
    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    /// Whole seconds from start to `now`, zero if the clock reads earlier
    /// than the start.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        let seconds = (now - self.started_at).num_seconds();
        u64::try_from(seconds).unwrap_or(0)
    }

    /// Runs one tick against `store` at time `now`.
    pub fn tick(&self, store: &CycleStore, now: DateTime<Utc>) -> TickResult {
        let elapsed = self.elapsed_at(now);

        if elapsed < self.duration_seconds {
            return match store.set_elapsed(self.cycle_id, elapsed) {
                TickOutcome::Stale => TickResult::Detached,
                TickOutcome::Applied | TickOutcome::Unchanged => TickResult::Running { elapsed },
            };
        }

        // Expiring: publish the final second count, then finish.
        if store.set_elapsed(self.cycle_id, self.duration_seconds) == TickOutcome::Stale {
            return TickResult::Detached;
        }
        match store.finish_at(self.cycle_id, now) {
            Ok(Some(cycle)) => TickResult::Finished(cycle),
            Ok(None) => TickResult::Detached,
            Err(e) => {
                error!(cycle_id = %self.cycle_id, error = %e, "Failed to finish expired cycle");
                TickResult::Running {
                    elapsed: self.duration_seconds,
                }
            }
        }
    }
}

/// Handle to a running per-cycle ticker task.
///
/// The task is aborted when the handle is cancelled or dropped.
#[derive(Debug)]
pub struct TickerHandle {
    cycle_id: CycleId,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Spawns a ticker for `countdown` that reads time from `clock` every
    /// `tick_rate`.
    #[must_use]
    pub fn spawn(
        store: CycleStore,
        clock: Arc<dyn Clock>,
        countdown: Countdown,
        tick_rate: Duration,
    ) -> Self {
        let cycle_id = countdown.cycle_id();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);
            // Elapsed time comes from the clock, so catching up on missed
            // ticks would only repeat the same reading.
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                match countdown.tick(&store, clock.now()) {
                    TickResult::Running { elapsed } => {
                        trace!(cycle_id = %cycle_id, elapsed, "Tick");
                    }
                    TickResult::Finished(cycle) => {
                        debug!(cycle_id = %cycle.id, "Ticker finished its cycle");
                        break;
                    }
                    TickResult::Detached => {
                        debug!(cycle_id = %cycle_id, "Ticker detached from inactive cycle");
                        break;
                    }
                }
            }
        });

        Self { cycle_id, task }
    }

    /// The cycle this ticker drives.
    #[must_use]
    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    /// Returns true once the ticker task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the ticker. No tick runs after this returns to the runtime.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Long-lived driver that keeps a ticker running while a cycle is active.
#[derive(Debug, Clone)]
pub struct CountdownDriver {
    store: CycleStore,
    clock: Arc<dyn Clock>,
    tick_rate: Duration,
}

impl CountdownDriver {
    /// Creates a driver for `store`, ticking every `tick_rate` on the store's
    /// clock.
    #[must_use]
    pub fn new(store: CycleStore, tick_rate: Duration) -> Self {
        let clock = store.clock();
        Self {
            store,
            clock,
            tick_rate,
        }
    }

    /// Creates a driver using the tick rate from `config`.
    #[must_use]
    pub fn from_config(store: CycleStore, config: &TimerConfig) -> Self {
        Self::new(store, config.tick_rate)
    }

    /// The configured tick period.
    #[must_use]
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Spawns the driver task.
    ///
    /// The driver subscribes to the store before this returns, so a cycle
    /// created right after `spawn` is never missed. A cycle that was already
    /// active is picked up immediately.
    #[must_use]
    pub fn spawn(self) -> DriverHandle {
        let events = self.store.subscribe();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (state_tx, state_rx) = watch::channel(DriverState::Idle);

        let task = tokio::spawn(self.run(events, shutdown_rx, state_tx));

        DriverHandle {
            shutdown_tx: Some(shutdown_tx),
            state_rx,
            task: Some(task),
        }
    }

    async fn run(
        self,
        mut events: Receiver<CycleEvent>,
        mut shutdown_rx: oneshot::Receiver<()>,
        state_tx: watch::Sender<DriverState>,
    ) {
        debug!(
            session_id = %self.store.session_id(),
            tick_ms = self.tick_rate.as_millis() as u64,
            "Starting countdown driver"
        );

        let mut ticker: Option<TickerHandle> = None;
        self.resync(&mut ticker, &state_tx);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown_rx => {
                    debug!("Countdown driver received shutdown signal");
                    break;
                }

                event = events.recv() => match event {
                    Ok(CycleEvent::Created { cycle }) => {
                        self.start(&mut ticker, &cycle, &state_tx);
                    }
                    Ok(CycleEvent::Finished { cycle } | CycleEvent::Interrupted { cycle }) => {
                        if ticker.as_ref().is_some_and(|t| t.cycle_id() == cycle.id) {
                            self.stop(&mut ticker, &state_tx);
                        }
                    }
                    Ok(CycleEvent::Elapsed { .. }) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Countdown driver lagged behind cycle events, resyncing");
                        self.resync(&mut ticker, &state_tx);
                    }
                    Err(RecvError::Closed) => {
                        debug!("Cycle event channel closed");
                        break;
                    }
                },
            }
        }

        self.stop(&mut ticker, &state_tx);
        debug!("Countdown driver terminated");
    }

    /// Aligns the ticker with whatever the store currently reports as active.
    fn resync(&self, ticker: &mut Option<TickerHandle>, state_tx: &watch::Sender<DriverState>) {
        match self.store.active_cycle() {
            Some(cycle) if ticker.as_ref().map(TickerHandle::cycle_id) != Some(cycle.id) => {
                self.start(ticker, &cycle, state_tx);
            }
            Some(_) => {}
            None => self.stop(ticker, state_tx),
        }
    }

    fn start(
        &self,
        ticker: &mut Option<TickerHandle>,
        cycle: &Cycle,
        state_tx: &watch::Sender<DriverState>,
    ) {
        info!(
            cycle_id = %cycle.id,
            duration_seconds = cycle.duration_seconds(),
            "Countdown started"
        );
        // Replacing the handle aborts any previous ticker.
        *ticker = Some(TickerHandle::spawn(
            self.store.clone(),
            Arc::clone(&self.clock),
            Countdown::for_cycle(cycle),
            self.tick_rate,
        ));
        set_state(
            state_tx,
            DriverState::Running {
                cycle_id: cycle.id,
                duration_seconds: cycle.duration_seconds(),
            },
        );
    }

    fn stop(&self, ticker: &mut Option<TickerHandle>, state_tx: &watch::Sender<DriverState>) {
        if let Some(handle) = ticker.take() {
            debug!(cycle_id = %handle.cycle_id(), "Countdown stopped");
            handle.cancel();
        }
        set_state(state_tx, DriverState::Idle);
    }
}

/// Publishes `next` only if it differs, so watchers wake on real transitions.
fn set_state(state_tx: &watch::Sender<DriverState>, next: DriverState) {
    state_tx.send_if_modified(|state| {
        if *state == next {
            return false;
        }
        trace!(from = ?state, to = ?next, "Driver state change");
        *state = next;
        true
    });
}

/// Handle to a spawned [`CountdownDriver`].
///
/// Dropping the handle signals the driver to stop; call
/// [`DriverHandle::shutdown`] to also wait for it.
#[derive(Debug)]
pub struct DriverHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    state_rx: watch::Receiver<DriverState>,
    task: Option<JoinHandle<()>>,
}

impl DriverHandle {
    /// Current driver state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        *self.state_rx.borrow()
    }

    /// A receiver notified on every driver state change.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<DriverState> {
        self.state_rx.clone()
    }

    /// Stops the driver (cancelling any running ticker) and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::Driver`] if the driver task panicked.
    pub async fn shutdown(mut self) -> Result<(), TimerError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.task.take() {
            Some(task) => task.await.map_err(|e| TimerError::Driver(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
