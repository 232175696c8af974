//! Application core: relay logic, zero I/O.
//!
//! The state machine, its persisted representation and the relay identity
//! live here.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod identity;
pub mod ports;
pub mod relay;
pub mod state;
