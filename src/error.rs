//! Unified error types for the relaytimer firmware.
//!
//! Every subsystem error converts into the top-level [`Error`] so that the
//! firmware entry point can report failures uniformly.  All variants are
//! `Copy`; none of them allocate.

use core::fmt;

use crate::app::ports::{ConfigError, OutputError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The relay identity does not fit the store's naming rules.
    Identity(IdentityError),
    /// A persisted schedule could not be encoded or decoded.
    Schedule(ScheduleError),
    /// The key/value store failed.
    Storage(StorageError),
    /// The physical output could not be configured or driven.
    Output(OutputError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(e) => write!(f, "identity: {e}"),
            Self::Schedule(e) => write!(f, "schedule: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Output(e) => write!(f, "output: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Identity errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityError {
    /// The namespace is empty.
    EmptyNamespace,
    /// The namespace exceeds the store's 15-byte name limit.
    NamespaceTooLong,
    /// `<namespace><pin>Time` exceeds the store's 15-byte key limit.
    KeyTooLong,
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNamespace => write!(f, "namespace is empty"),
            Self::NamespaceTooLong => write!(f, "namespace longer than 15 bytes"),
            Self::KeyTooLong => write!(f, "schedule key longer than 15 bytes"),
        }
    }
}

impl From<IdentityError> for Error {
    fn from(e: IdentityError) -> Self {
        Self::Identity(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule encoding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// No `,` between the on-time and off-time halves.
    MissingSeparator,
    /// A half is not a fixed-width `YYYY-MM-DD HH:MM:SS` timestamp.
    InvalidTimestamp,
    /// The instant cannot be represented as a four-digit-year timestamp.
    OutOfRange,
    /// The off-time precedes the on-time.
    Inverted,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing ',' separator"),
            Self::InvalidTimestamp => write!(f, "invalid timestamp"),
            Self::OutOfRange => write!(f, "timestamp out of range"),
            Self::Inverted => write!(f, "off-time precedes on-time"),
        }
    }
}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Port errors
// ---------------------------------------------------------------------------

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<OutputError> for Error {
    fn from(e: OutputError) -> Self {
        Self::Output(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::Storage(s) => Self::Storage(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
