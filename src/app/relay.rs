//! Relay controller: the timed on/off state machine.
//!
//! [`RelayController`] owns the output state and the optional timed window,
//! and keeps both mirrored in the [`StoragePort`] so a power cycle resumes
//! where it left off.  All I/O flows through port traits supplied at
//! construction, making the controller testable with mock adapters.
//!
//! ```text
//!            activate_for_duration(s)
//!   ┌─────┐ ─────────────────────────▶ ┌──────────┐
//!   │ OFF │ ◀── deactivate / expiry ── │ ON_TIMED │ ◀─┐ reschedule
//!   └─────┘                            └──────────┘ ──┘
//!     │  ▲                               │      ▲
//!     │  └──────── deactivate ───────┐   │      │ activate_for_duration(s)
//!     ▼                              │   ▼      │
//!   activate_indefinite ──────────▶ ┌───────────────┐
//!                                   │ ON_INDEFINITE │
//!                                   └───────────────┘
//! ```
//!
//! ## Persistence
//!
//! | Key                 | Value                                  | Absent means |
//! |---------------------|----------------------------------------|--------------|
//! | `<identity>`        | `true` while on                        | off          |
//! | `<identity>Time`    | `on,off` timestamps ([`crate::codec`]) | no schedule  |
//!
//! Persistence is best effort: a failed store write is logged and the
//! output still switches.

use log::{debug, error, info, warn};

use super::identity::RelayIdentity;
use super::ports::{ClockPort, OutputPort, StoragePort};
use super::state::{RelayState, Schedule};
use crate::codec;

pub struct RelayController<O, C, S> {
    identity: RelayIdentity,
    output: O,
    clock: C,
    store: S,
    /// Last value written to the output.
    state: bool,
    schedule: Option<Schedule>,
}

impl<O, C, S> RelayController<O, C, S>
where
    O: OutputPort,
    C: ClockPort,
    S: StoragePort,
{
    /// Construct an off, unscheduled controller.
    ///
    /// Touches neither the pin nor the store; call [`setup`](Self::setup) next.
    pub fn new(identity: RelayIdentity, output: O, clock: C, store: S) -> Self {
        Self {
            identity,
            output,
            clock,
            store,
            state: false,
            schedule: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Cold start: configure the pin, then restore output and schedule from
    /// the store.
    ///
    /// A stored schedule is only revived when the stored output is on; an
    /// expired one is kept and the next [`poll`](Self::poll) or
    /// [`check_timeout`](Self::check_timeout) switches the relay off.
    ///
    /// If the stored output cannot be read the relay starts off and both
    /// stored entries are left untouched for the next boot.
    pub fn setup(&mut self) {
        if let Err(e) = self.output.configure_output() {
            error!("Relay {}: pin configuration failed: {}", self.identity, e);
        }

        let Some(restored) = self.load_state() else {
            self.set_state(false);
            self.schedule = None;
            warn!(
                "Relay {}: starting off, stored entries kept until they can be read",
                self.identity
            );
            return;
        };
        self.set_state(restored);
        self.schedule = self.load_schedule();

        if !self.state && self.schedule.is_some() {
            warn!(
                "Relay {}: discarding schedule stored without an active output",
                self.identity
            );
            self.reset_schedule();
        }

        match self.relay_state() {
            RelayState::OnTimed(schedule) => info!(
                "Relay {}: restored timed window, {}s remaining",
                self.identity,
                schedule.remaining_secs(self.wall_clock())
            ),
            state => info!("Relay {}: restored {:?}", self.identity, state),
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Switch on with no turn-off time, cancelling any pending window.
    pub fn activate_indefinite(&mut self) {
        self.set_state(true);
        self.save_state();
        self.reset_schedule();
        info!("Relay {}: on", self.identity);
    }

    /// Switch on for `seconds` from now.  `0` gives a window that is
    /// already due.
    ///
    /// Without a synchronised wall clock the window is anchored at epoch 0.
    pub fn activate_for_duration(&mut self, seconds: u32) {
        self.set_state(true);
        self.save_state();

        let now = match self.clock.now() {
            Some(now) => now,
            None => {
                warn!(
                    "Relay {}: wall clock unavailable, scheduling from epoch 0",
                    self.identity
                );
                0
            }
        };
        let schedule = Schedule::starting_at(now, seconds);
        self.schedule = Some(schedule);
        self.save_schedule(&schedule);
        info!(
            "Relay {}: on for {}s (off at {})",
            self.identity, seconds, schedule.off_time
        );
    }

    /// Switch off and forget the schedule.  Idempotent.
    pub fn deactivate(&mut self) {
        self.set_state(false);
        self.delete_saved_state();
        self.reset_schedule();
        info!("Relay {}: off", self.identity);
    }

    // ── Expiry ────────────────────────────────────────────────

    /// Control-loop hook: switch off once the clock is strictly past the
    /// off-time.
    pub fn poll(&mut self) {
        let Some(schedule) = self.schedule else {
            return;
        };
        let now = self.wall_clock();
        if schedule.is_past(now) {
            debug!("Relay {}: window ended at {}", self.identity, schedule.off_time);
            self.deactivate();
        }
    }

    /// Switch off once the clock has reached the off-time.  Returns whether
    /// the relay was switched off by this call.
    ///
    /// Unlike [`poll`](Self::poll) this fires *at* the off-time.
    pub fn check_timeout(&mut self) -> bool {
        let Some(schedule) = self.schedule else {
            return false;
        };
        let now = self.wall_clock();
        if schedule.is_due(now) {
            debug!("Relay {}: window due at {}", self.identity, schedule.off_time);
            self.deactivate();
            return true;
        }
        false
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> bool {
        self.state
    }

    pub fn on_time(&self) -> Option<i64> {
        self.schedule.map(|s| s.on_time)
    }

    pub fn off_time(&self) -> Option<i64> {
        self.schedule.map(|s| s.off_time)
    }

    pub fn schedule(&self) -> Option<Schedule> {
        self.schedule
    }

    pub fn relay_state(&self) -> RelayState {
        match (self.state, self.schedule) {
            (false, _) => RelayState::Off,
            (true, None) => RelayState::OnIndefinite,
            (true, Some(s)) => RelayState::OnTimed(s),
        }
    }

    pub fn identity(&self) -> &RelayIdentity {
        &self.identity
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    // ── Output ────────────────────────────────────────────────

    fn set_state(&mut self, on: bool) {
        self.state = on;
        if let Err(e) = self.output.write(on) {
            error!("Relay {}: output write failed: {}", self.identity, e);
        }
    }

    fn wall_clock(&self) -> i64 {
        self.clock.now().unwrap_or(0)
    }

    // ── Persistence: output state ─────────────────────────────

    fn save_state(&self) {
        let id = &self.identity;
        if let Err(e) = self.store.put_bool(id.namespace(), id.state_key(), self.state) {
            warn!("Relay {}: failed to persist state: {}", id, e);
        }
    }

    /// A missing key is the canonical "off". `None` means the store could
    /// not be read, which is not the same as off.
    fn load_state(&self) -> Option<bool> {
        let id = &self.identity;
        match self.store.get_bool(id.namespace(), id.state_key()) {
            Ok(stored) => Some(stored.unwrap_or(false)),
            Err(e) => {
                warn!("Relay {}: failed to load state: {}", id, e);
                None
            }
        }
    }

    fn delete_saved_state(&self) {
        let id = &self.identity;
        if let Err(e) = self.store.remove(id.namespace(), id.state_key()) {
            warn!("Relay {}: failed to delete state: {}", id, e);
        }
    }

    // ── Persistence: schedule ─────────────────────────────────

    fn save_schedule(&self, schedule: &Schedule) {
        let id = &self.identity;
        let encoded = match codec::encode_schedule(schedule) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Relay {}: schedule not persisted: {}", id, e);
                return;
            }
        };
        if let Err(e) = self.store.put_string(id.namespace(), id.schedule_key(), &encoded) {
            warn!("Relay {}: failed to persist schedule: {}", id, e);
        }
    }

    /// Absent, unreadable or malformed entries all mean "no schedule".
    fn load_schedule(&self) -> Option<Schedule> {
        let id = &self.identity;
        let text = match self.store.get_string(id.namespace(), id.schedule_key()) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                warn!("Relay {}: failed to load schedule: {}", id, e);
                return None;
            }
        };
        match codec::decode_schedule(&text) {
            Ok(schedule) => Some(schedule),
            Err(e) => {
                warn!("Relay {}: ignoring stored schedule {:?}: {}", id, text, e);
                self.delete_saved_schedule();
                None
            }
        }
    }

    fn delete_saved_schedule(&self) {
        let id = &self.identity;
        if let Err(e) = self.store.remove(id.namespace(), id.schedule_key()) {
            warn!("Relay {}: failed to delete schedule: {}", id, e);
        }
    }

    fn reset_schedule(&mut self) {
        self.schedule = None;
        self.delete_saved_schedule();
    }
}
