//! Relay identity: the store namespace and key names owned by one relay.
//!
//! A relay on GPIO 5 in the default namespace persists its output under
//! `relay::relay5` and its schedule under `relay::relay5Time`.  Two relays
//! with the same identity would overwrite each other's state.

use core::fmt::{self, Write};

use crate::error::IdentityError;

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "relay";

/// Suffix appended to the state key to form the schedule key.
const SCHEDULE_KEY_SUFFIX: &str = "Time";

/// NVS limit on namespace and key names (excluding the NUL terminator).
pub const MAX_NAME_LEN: usize = 15;

pub type NameString = heapless::String<16>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayIdentity {
    namespace: NameString,
    pin: i32,
    state_key: NameString,
    schedule_key: NameString,
}

impl RelayIdentity {
    /// Identity in the [`DEFAULT_NAMESPACE`].
    pub fn new(pin: i32) -> Result<Self, IdentityError> {
        Self::with_namespace(DEFAULT_NAMESPACE, pin)
    }

    pub fn with_namespace(namespace: &str, pin: i32) -> Result<Self, IdentityError> {
        if namespace.is_empty() {
            return Err(IdentityError::EmptyNamespace);
        }
        if namespace.len() > MAX_NAME_LEN {
            return Err(IdentityError::NamespaceTooLong);
        }

        let mut ns = NameString::new();
        ns.push_str(namespace)
            .map_err(|()| IdentityError::NamespaceTooLong)?;

        let mut state_key = NameString::new();
        write!(state_key, "{namespace}{pin}").map_err(|_| IdentityError::KeyTooLong)?;

        let mut schedule_key = NameString::new();
        write!(schedule_key, "{state_key}{SCHEDULE_KEY_SUFFIX}")
            .map_err(|_| IdentityError::KeyTooLong)?;
        if schedule_key.len() > MAX_NAME_LEN {
            return Err(IdentityError::KeyTooLong);
        }

        Ok(Self {
            namespace: ns,
            pin,
            state_key,
            schedule_key,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    /// Key of the persisted output boolean.
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// Key of the persisted on/off schedule string.
    pub fn schedule_key(&self) -> &str {
        &self.schedule_key
    }
}

impl fmt::Display for RelayIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.state_key)
    }
}
