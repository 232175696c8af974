//! Integration tests for the relay state machine: commands, expiry and
//! the persisted keys each transition leaves behind.

use crate::mock_hw::{MockClock, MockStore, OutputCall, Stored, make_relay};

use relaytimer::app::state::{RelayState, Schedule};

const T: i64 = 1_700_000_000;

// ── Activation ────────────────────────────────────────────────

#[test]
fn setup_configures_pin_before_first_write() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let relay = make_relay(&clock, &store);

    assert_eq!(
        relay.output().calls,
        vec![OutputCall::Configure, OutputCall::Write(false)]
    );
    assert_eq!(relay.relay_state(), RelayState::Off);
}

#[test]
fn indefinite_activation_sets_state_without_schedule() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_indefinite();

    assert!(relay.state());
    assert_eq!(relay.on_time(), None);
    assert_eq!(relay.off_time(), None);
    assert_eq!(relay.relay_state(), RelayState::OnIndefinite);
    assert_eq!(store.raw("relay", "relay5"), Some(Stored::Bool(true)));
    assert_eq!(store.raw("relay", "relay5Time"), None);
    assert_eq!(relay.output().level(), Some(true));
}

#[test]
fn timed_activation_records_window() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(100);

    assert!(relay.state());
    assert_eq!(relay.on_time(), Some(T));
    assert_eq!(relay.off_time(), Some(T + 100));
    assert_eq!(
        relay.relay_state(),
        RelayState::OnTimed(Schedule {
            on_time: T,
            off_time: T + 100
        })
    );
    assert_eq!(
        store.raw("relay", "relay5Time"),
        Some(Stored::Str(
            "2023-11-14 22:13:20,2023-11-14 22:15:00".to_owned()
        ))
    );
}

#[test]
fn indefinite_activation_cancels_pending_window() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(60);
    relay.activate_indefinite();

    assert_eq!(relay.relay_state(), RelayState::OnIndefinite);
    assert_eq!(store.raw("relay", "relay5Time"), None);

    clock.advance(3_600);
    relay.poll();
    assert!(relay.state(), "no window left to expire");
}

#[test]
fn indefinite_activation_twice_stays_indefinite() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_indefinite();
    store.seed_bool("relay", "relay5", false);
    relay.activate_indefinite();

    assert_eq!(relay.relay_state(), RelayState::OnIndefinite);
    assert!(relay.relay_state().is_on());
    assert_eq!(store.raw("relay", "relay5"), Some(Stored::Bool(true)));
    assert_eq!(store.raw("relay", "relay5Time"), None);
    assert_eq!(relay.output().level(), Some(true));
}

#[test]
fn rearming_replaces_the_window() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(60);
    clock.advance(30);
    relay.activate_for_duration(120);

    assert_eq!(relay.on_time(), Some(T + 30));
    assert_eq!(relay.off_time(), Some(T + 150));

    // The first window would have ended here.
    clock.set(T + 61);
    relay.poll();
    assert!(relay.state());
}

#[test]
fn timed_activation_from_indefinite() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_indefinite();
    relay.activate_for_duration(10);

    assert_eq!(relay.off_time(), Some(T + 10));
    clock.advance(11);
    relay.poll();
    assert_eq!(relay.relay_state(), RelayState::Off);
}

#[test]
fn zero_duration_is_due_immediately() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(0);
    assert_eq!(relay.on_time(), relay.off_time());

    relay.poll();
    assert!(relay.state(), "poll waits for the clock to pass the off-time");
    assert!(relay.check_timeout());
    assert!(!relay.state());
}

// ── Deactivation ──────────────────────────────────────────────

#[test]
fn deactivate_clears_state_and_keys() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(100);
    relay.deactivate();

    assert!(!relay.state());
    assert_eq!(relay.on_time(), None);
    assert_eq!(relay.off_time(), None);
    assert!(store.is_empty());
    assert_eq!(relay.output().level(), Some(false));
}

#[test]
fn deactivate_is_idempotent() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.deactivate();
    relay.deactivate();

    assert_eq!(relay.relay_state(), RelayState::Off);
    assert!(store.is_empty());
}

// ── Expiry ────────────────────────────────────────────────────

#[test]
fn poll_fires_only_after_off_time() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    relay.activate_for_duration(5);

    clock.set(T + 4);
    relay.poll();
    assert!(relay.state());

    clock.set(T + 5);
    relay.poll();
    assert!(relay.state(), "equal to the off-time is not past it");

    clock.set(T + 6);
    relay.poll();
    assert!(!relay.state());
    assert!(store.is_empty());
}

#[test]
fn check_timeout_fires_at_off_time() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    relay.activate_for_duration(5);

    clock.set(T + 4);
    assert!(!relay.check_timeout());
    assert!(relay.state());

    clock.set(T + 5);
    assert!(relay.check_timeout());
    assert!(!relay.state());

    assert!(!relay.check_timeout(), "nothing left to expire");
}

#[test]
fn expiry_hooks_ignore_indefinite_activation() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    relay.activate_indefinite();

    clock.advance(1_000_000);
    relay.poll();
    assert!(!relay.check_timeout());
    assert!(relay.state());
}

#[test]
fn poll_when_off_is_a_no_op() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    let writes_before = relay.output().calls.len();

    relay.poll();

    assert_eq!(relay.output().calls.len(), writes_before);
}

// ── Degraded clock ────────────────────────────────────────────

#[test]
fn unsynchronised_clock_anchors_window_at_epoch() {
    let clock = MockClock::unsynchronised();
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);

    relay.activate_for_duration(30);

    assert!(relay.state());
    assert_eq!(relay.on_time(), Some(0));
    assert_eq!(relay.off_time(), Some(30));
    assert_eq!(
        store.raw("relay", "relay5Time"),
        Some(Stored::Str(
            "1970-01-01 00:00:00,1970-01-01 00:00:30".to_owned()
        ))
    );
}

#[test]
fn epoch_window_expires_once_clock_syncs() {
    let clock = MockClock::unsynchronised();
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    relay.activate_for_duration(30);

    relay.poll();
    assert!(relay.state(), "clock still reads epoch 0");

    clock.set(T);
    relay.poll();
    assert!(!relay.state());
}

// ── Degraded store and output ─────────────────────────────────

#[test]
fn store_write_failure_still_switches_output() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    store.fail_writes.set(true);

    relay.activate_for_duration(10);
    assert!(relay.state());
    assert_eq!(relay.output().level(), Some(true));
    assert!(store.is_empty());

    clock.advance(11);
    relay.poll();
    assert!(!relay.state());
    assert_eq!(relay.output().level(), Some(false));
}

#[test]
fn output_write_failure_keeps_intended_state() {
    let clock = MockClock::at(T);
    let store = MockStore::new();
    let mut relay = make_relay(&clock, &store);
    relay.output_mut().fail_writes = true;

    relay.activate_indefinite();

    assert!(relay.state());
    assert_eq!(store.raw("relay", "relay5"), Some(Stored::Bool(true)));
}
