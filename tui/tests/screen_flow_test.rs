//! End-to-end tests for the interactive screen state.
//!
//! These tests feed key presses into [`AppState`], let a real countdown
//! driver run on paused tokio time, and fold the store's change events back
//! into the read model the way the interactive loop does.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use focus_timer::tui::{AppState, CycleFormState};
use focus_timer::FormError;
use focus_timer_core::{CountdownDriver, CycleEvent, CycleStatus, CycleStore, ManualClock};
use tokio::sync::broadcast::Receiver;

// =============================================================================
// Test Helpers
// =============================================================================

const TICK: Duration = Duration::from_secs(1);

/// Moves the test half a tick off the driver's schedule so clock advances
/// never land on the same instant as a driver tick.
async fn offset_from_ticks() {
    tokio::time::sleep(TICK / 2).await;
}

fn press(state: &mut AppState, store: &CycleStore, code: KeyCode) {
    if let Some(command) = state.handle_key(KeyEvent::new(code, KeyModifiers::NONE)) {
        state.dispatch(command, store);
    }
}

fn type_text(state: &mut AppState, store: &CycleStore, text: &str) {
    for c in text.chars() {
        press(state, store, KeyCode::Char(c));
    }
}

/// Advances both clocks one second at a time, folding events as they arrive.
async fn run_for(
    state: &mut AppState,
    events: &mut Receiver<CycleEvent>,
    clock: &ManualClock,
    seconds: u64,
) {
    for _ in 0..seconds {
        clock.advance(ChronoDuration::seconds(1));
        tokio::time::sleep(TICK).await;
        while let Ok(event) = events.try_recv() {
            state.apply_event(&event);
        }
    }
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_form_to_finished_cycle() {
    let clock = ManualClock::default();
    let store = CycleStore::new(Arc::new(clock.clone()));
    let driver = CountdownDriver::new(store.clone(), TICK).spawn();
    let mut events = store.subscribe();
    let mut state = AppState::new(25);

    type_text(&mut state, &store, "Write report");
    press(&mut state, &store, KeyCode::Tab);
    for _ in 0..5 {
        press(&mut state, &store, KeyCode::Char('-'));
    }
    assert_eq!(state.form.minutes, 1);
    press(&mut state, &store, KeyCode::Enter);

    assert!(state.is_locked());
    assert_eq!(state.form, CycleFormState::new(25));
    offset_from_ticks().await;

    run_for(&mut state, &mut events, &clock, 30).await;
    assert_eq!(state.title(), "00:30 | Write report");

    run_for(&mut state, &mut events, &clock, 35).await;
    assert!(!state.is_locked());
    assert_eq!(state.title(), "Focus Timer");
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].status(), CycleStatus::Finished);

    driver.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_key_then_new_cycle() {
    let clock = ManualClock::default();
    let store = CycleStore::new(Arc::new(clock.clone()));
    let driver = CountdownDriver::new(store.clone(), TICK).spawn();
    let mut events = store.subscribe();
    let mut state = AppState::new(25);

    type_text(&mut state, &store, "First");
    press(&mut state, &store, KeyCode::Enter);
    offset_from_ticks().await;
    run_for(&mut state, &mut events, &clock, 5).await;

    // Typing is ignored while locked.
    type_text(&mut state, &store, "abc");
    assert!(state.form.task.is_empty());

    press(&mut state, &store, KeyCode::Char('i'));
    run_for(&mut state, &mut events, &clock, 3).await;
    assert!(!state.is_locked());
    assert_eq!(store.elapsed_for(&state.history[0]), 5);

    type_text(&mut state, &store, "Second");
    press(&mut state, &store, KeyCode::Enter);
    run_for(&mut state, &mut events, &clock, 2).await;

    let statuses: Vec<_> = state.history.iter().map(|c| c.status()).collect();
    assert_eq!(statuses, [CycleStatus::Interrupted, CycleStatus::InProgress]);
    assert_eq!(state.history, store.history());

    driver.shutdown().await.unwrap();
}

#[test]
fn test_out_of_range_minutes_show_message() {
    let store = CycleStore::new(Arc::new(ManualClock::default()));
    let mut state = AppState::new(25);

    type_text(&mut state, &store, "Write");
    press(&mut state, &store, KeyCode::Tab);
    press(&mut state, &store, KeyCode::Backspace);
    press(&mut state, &store, KeyCode::Backspace);
    press(&mut state, &store, KeyCode::Enter);
    assert_eq!(state.form.error, Some(FormError::TooShort));
    assert_eq!(
        state.form.error.map(|e| e.to_string()).as_deref(),
        Some("cycle must be at least 1 minute")
    );

    type_text(&mut state, &store, "75");
    press(&mut state, &store, KeyCode::Enter);
    assert_eq!(state.form.error, Some(FormError::TooLong));
    assert!(store.is_empty());
}
