//! Headless single-cycle runner behind `focus-timer start`.
//!
//! Starts one cycle, lets a [`CountdownDriver`] count it down, logs progress
//! once per minute and returns a [`CycleSummary`] when the cycle ends,
//! either at expiry or because the `interrupt` future completed.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use focus_timer_core::display::{format_mm_ss, remaining_seconds};
use focus_timer_core::{
    Cycle, CycleEvent, CycleStatus, CycleStore, CountdownDriver, NewCycle, TimerError,
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Outcome of a finished or interrupted cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSummary {
    /// The cycle in its terminal state.
    pub cycle: Cycle,

    /// How it ended.
    pub status: CycleStatus,

    /// Seconds counted before it ended.
    pub elapsed_seconds: u64,
}

impl CycleSummary {
    /// Builds a summary for `cycle` using the store's elapsed value.
    #[must_use]
    pub fn from_store(store: &CycleStore, cycle: Cycle) -> Self {
        Self {
            status: cycle.status(),
            elapsed_seconds: store.elapsed_for(&cycle),
            cycle,
        }
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({} of {} min)",
            self.status.label(),
            self.cycle.task,
            format_mm_ss(self.elapsed_seconds),
            self.cycle.duration_minutes
        )
    }
}

/// Writes `summary` to `out` as one line of text, or as pretty JSON when
/// `json` is set.
///
/// # Errors
///
/// Returns [`AppError::Json`](crate::AppError::Json) if serialization fails
/// and [`AppError::Io`](crate::AppError::Io) if `out` rejects the text.
pub fn write_summary<W: Write>(mut out: W, summary: &CycleSummary, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut out, summary)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{summary}")?;
    }
    out.flush()?;
    Ok(())
}

/// Runs one cycle to completion.
///
/// # Errors
///
/// Returns an error if the request is invalid, another cycle is already
/// active in `store`, or the driver fails.
pub async fn run_cycle<F>(
    store: &CycleStore,
    tick_rate: Duration,
    request: &NewCycle,
    interrupt: F,
) -> Result<CycleSummary>
where
    F: Future<Output = ()>,
{
    let mut events = store.subscribe();
    let driver = CountdownDriver::new(store.clone(), tick_rate).spawn();

    let cycle = store.create_from(request)?;
    info!(
        cycle_id = %cycle.id,
        task = %cycle.task,
        minutes = cycle.duration_minutes,
        "Cycle started"
    );

    tokio::pin!(interrupt);
    let mut interrupt_sent = false;

    let ended = loop {
        tokio::select! {
            biased;

            () = &mut interrupt, if !interrupt_sent => {
                interrupt_sent = true;
                if store.interrupt().is_none() {
                    debug!("Interrupt arrived after the cycle ended");
                }
            }

            event = events.recv() => match event {
                Ok(CycleEvent::Elapsed { cycle_id, seconds }) if cycle_id == cycle.id => {
                    if seconds > 0 && seconds % 60 == 0 && seconds < cycle.duration_seconds() {
                        info!(
                            cycle_id = %cycle.id,
                            remaining = %format_mm_ss(remaining_seconds(&cycle, seconds)),
                            "Countdown"
                        );
                    }
                }
                Ok(CycleEvent::Finished { cycle: ended } | CycleEvent::Interrupted { cycle: ended })
                    if ended.id == cycle.id =>
                {
                    break ended;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Event subscriber lagged, checking store");
                    if let Some(ended) = store
                        .history()
                        .into_iter()
                        .find(|c| c.id == cycle.id && c.is_terminal())
                    {
                        break ended;
                    }
                }
                Err(RecvError::Closed) => {
                    return Err(TimerError::Driver("cycle event channel closed".to_string()).into());
                }
            },
        }
    };

    driver.shutdown().await?;

    let summary = CycleSummary::from_store(store, ended);
    info!(
        cycle_id = %summary.cycle.id,
        status = summary.status.label(),
        elapsed_seconds = summary.elapsed_seconds,
        "Cycle ended"
    );
    Ok(summary)
}
