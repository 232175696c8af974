//! Port traits: the hexagonal boundary between the relay logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RelayController (domain)
//! ```
//!
//! Driven adapters (GPIO, wall clock, NVS) implement these traits.  The
//! [`RelayController`](super::relay::RelayController) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! Store and clock methods take `&self`: several controllers may share one
//! store, and the NVS backend opens a fresh handle per call anyway.

use crate::config::RelayConfig;

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relay coil)
// ───────────────────────────────────────────────────────────────

/// A single digital output driving the relay.
pub trait OutputPort {
    /// Put the pin into push-pull output mode.
    fn configure_output(&mut self) -> Result<(), OutputError>;

    /// Drive the pin high (`true`) or low (`false`).
    fn write(&mut self, high: bool) -> Result<(), OutputError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC/SNTP → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.
pub trait ClockPort {
    /// Seconds since the Unix epoch, or `None` while the wall clock has not
    /// been synchronised.
    fn now(&self) -> Option<i64>;
}

impl<C: ClockPort + ?Sized> ClockPort for &C {
    fn now(&self) -> Option<i64> {
        (**self).now()
    }
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Namespaced, typed key-value storage.
///
/// - Absent keys read as `Ok(None)`; callers decide what absence means.
/// - Namespace and key names are limited to 15 bytes (NVS rule).
/// - Each call is self-contained: implementations must not keep a namespace
///   open between calls.
pub trait StoragePort {
    fn get_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError>;

    fn put_bool(&self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError>;

    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;

    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError>;
}

impl<S: StoragePort + ?Sized> StoragePort for &S {
    fn get_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError> {
        (**self).get_bool(namespace, key)
    }

    fn put_bool(&self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError> {
        (**self).put_bool(namespace, key, value)
    }

    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_string(namespace, key)
    }

    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).put_string(namespace, key, value)
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        (**self).remove(namespace, key)
    }
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the firmware configuration.
///
/// Implementations MUST validate before persisting; invalid values are
/// rejected with [`ConfigError::ValidationFailed`], not clamped.
pub trait ConfigPort {
    /// Returns [`RelayConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<RelayConfig, ConfigError>;

    fn save(&self, config: &RelayConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`OutputPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// GPIO direction configuration failed (ESP-IDF return code).
    ConfigFailed(i32),
    /// GPIO level write failed (ESP-IDF return code).
    WriteFailed(i32),
    /// An `embedded-hal` pin reported an error.
    Hal(embedded_hal::digital::ErrorKind),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Namespace or key longer than 15 bytes.
    KeyTooLong,
    /// The value cannot be stored (e.g. string with an interior NUL).
    InvalidValue,
    /// The key exists with a different value type.
    TypeMismatch,
    /// Backend I/O error (ESP-IDF return code, `-1` on the host).
    Io(i32),
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The underlying store failed.
    Storage(StorageError),
}

impl core::fmt::Display for OutputError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::WriteFailed(rc) => write!(f, "GPIO write failed (rc={})", rc),
            Self::Hal(kind) => write!(f, "pin error: {:?}", kind),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::KeyTooLong => write!(f, "key longer than 15 bytes"),
            Self::InvalidValue => write!(f, "value cannot be stored"),
            Self::TypeMismatch => write!(f, "stored value has a different type"),
            Self::Io(rc) => write!(f, "I/O error (rc={})", rc),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}
