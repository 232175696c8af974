//! Mock adapters for integration tests.
//!
//! Records every output write and store mutation so tests can assert on the
//! full history without touching real GPIO or flash.

use relaytimer::app::identity::RelayIdentity;
use relaytimer::app::ports::{ClockPort, OutputError, OutputPort, StorageError, StoragePort};
use relaytimer::app::relay::RelayController;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

// ── Output ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    Configure,
    Write(bool),
}

pub struct MockOutput {
    pub calls: Vec<OutputCall>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockOutput {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_writes: false,
        }
    }

    /// Last level written, if any.
    pub fn level(&self) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            OutputCall::Write(level) => Some(*level),
            OutputCall::Configure => None,
        })
    }
}

impl Default for MockOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for MockOutput {
    fn configure_output(&mut self) -> Result<(), OutputError> {
        self.calls.push(OutputCall::Configure);
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), OutputError> {
        self.calls.push(OutputCall::Write(high));
        if self.fail_writes {
            return Err(OutputError::WriteFailed(-1));
        }
        Ok(())
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct MockClock {
    now: Cell<Option<i64>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn at(secs: i64) -> Self {
        Self {
            now: Cell::new(Some(secs)),
        }
    }

    pub fn unsynchronised() -> Self {
        Self {
            now: Cell::new(None),
        }
    }

    pub fn set(&self, secs: i64) {
        self.now.set(Some(secs));
    }

    pub fn advance(&self, secs: i64) {
        let now = self.now.get().unwrap_or(0);
        self.now.set(Some(now + secs));
    }

    pub fn lose_sync(&self) {
        self.now.set(None);
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> Option<i64> {
        self.now.get()
    }
}

// ── Store ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stored {
    Bool(bool),
    Str(String),
}

pub struct MockStore {
    entries: RefCell<HashMap<String, Stored>>,
    pub fail_writes: Cell<bool>,
    pub fail_reads: Cell<bool>,
    /// Fail only `get_bool`, leaving string reads working.
    pub fail_bool_reads: Cell<bool>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            fail_writes: Cell::new(false),
            fail_reads: Cell::new(false),
            fail_bool_reads: Cell::new(false),
        }
    }

    fn key(ns: &str, key: &str) -> String {
        format!("{}::{}", ns, key)
    }

    pub fn raw(&self, ns: &str, key: &str) -> Option<Stored> {
        self.entries.borrow().get(&Self::key(ns, key)).cloned()
    }

    pub fn seed_bool(&self, ns: &str, key: &str, value: bool) {
        self.entries
            .borrow_mut()
            .insert(Self::key(ns, key), Stored::Bool(value));
    }

    pub fn seed_string(&self, ns: &str, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(Self::key(ns, key), Stored::Str(value.to_owned()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Io(-1));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Io(-1));
        }
        Ok(())
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockStore {
    fn get_bool(&self, ns: &str, key: &str) -> Result<Option<bool>, StorageError> {
        self.check_read()?;
        if self.fail_bool_reads.get() {
            return Err(StorageError::Io(-1));
        }
        match self.raw(ns, key) {
            None => Ok(None),
            Some(Stored::Bool(v)) => Ok(Some(v)),
            Some(Stored::Str(_)) => Err(StorageError::TypeMismatch),
        }
    }

    fn put_bool(&self, ns: &str, key: &str, value: bool) -> Result<(), StorageError> {
        self.check_write()?;
        self.seed_bool(ns, key, value);
        Ok(())
    }

    fn get_string(&self, ns: &str, key: &str) -> Result<Option<String>, StorageError> {
        self.check_read()?;
        match self.raw(ns, key) {
            None => Ok(None),
            Some(Stored::Str(v)) => Ok(Some(v)),
            Some(Stored::Bool(_)) => Err(StorageError::TypeMismatch),
        }
    }

    fn put_string(&self, ns: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.seed_string(ns, key, value);
        Ok(())
    }

    fn remove(&self, ns: &str, key: &str) -> Result<(), StorageError> {
        self.check_write()?;
        self.entries.borrow_mut().remove(&Self::key(ns, key));
        Ok(())
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub type TestRelay<'a> = RelayController<MockOutput, &'a MockClock, &'a MockStore>;

/// Relay on GPIO 5 in the default namespace, already `setup()`.
pub fn make_relay<'a>(clock: &'a MockClock, store: &'a MockStore) -> TestRelay<'a> {
    let mut relay = RelayController::new(
        RelayIdentity::new(5).unwrap(),
        MockOutput::new(),
        clock,
        store,
    );
    relay.setup();
    relay
}
