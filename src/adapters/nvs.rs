//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`StoragePort`] and [`ConfigPort`] for the relay firmware.
//!
//! - Scoped handles: on ESP32 every get/put/remove opens the namespace,
//!   performs one operation, commits if it wrote, and closes the handle.
//!   Nothing is held open between calls, so an interrupted host never
//!   leaves the namespace locked.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Booleans are stored as `u8` (NVS has no bool type).
//! - On the host the adapter is an in-memory simulation with the same
//!   15-byte name limit.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::RelayConfig;
use log::info;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use std::ffi::CString;

const CONFIG_NAMESPACE: &str = "relaycfg";
const CONFIG_KEY: &str = "config";

/// NVS limit on namespace and key names.
const MAX_NAME_LEN: usize = 15;

#[allow(dead_code)]
const MAX_STRING_SIZE: usize = 4000;

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    Bool(bool),
    Str(String),
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, StoredValue>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the NVS partition is erased
    /// and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                log::warn!("NVS: erasing and re-initialising flash partition");
                let ret2 = unsafe { nvs_flash_erase() };
                if ret2 != ESP_OK as esp_err_t {
                    return Err(StorageError::Io(ret2));
                }
                let ret3 = unsafe { nvs_flash_init() };
                if ret3 != ESP_OK as esp_err_t {
                    return Err(StorageError::Io(ret3));
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(StorageError::Io(ret));
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self::without_init())
    }

    /// Adapter without `nvs_flash_init`, the fallback when [`new`](Self::new) fails.
    ///
    /// Does not touch flash; on the device every call then fails and is
    /// logged by the caller.
    pub fn without_init() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    fn check_names(namespace: &str, key: &str) -> Result<(), StorageError> {
        if namespace.is_empty()
            || key.is_empty()
            || namespace.len() > MAX_NAME_LEN
            || key.len() > MAX_NAME_LEN
        {
            return Err(StorageError::KeyTooLong);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    ///
    /// A read-only open of a namespace that was never written fails with
    /// `ESP_ERR_NVS_NOT_FOUND`, which callers treat like a missing key.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let ns = CString::new(namespace).map_err(|_| ESP_ERR_INVALID_ARG as esp_err_t)?;
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: `ns` is a valid NUL-terminated string for the call duration.
        let ret = unsafe { nvs_open(ns.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: `handle` was opened above and is not used after this point.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// Commit inside an open read-write handle.
    #[cfg(target_os = "espidf")]
    fn commit(handle: nvs_handle_t) -> Result<(), esp_err_t> {
        // SAFETY: `handle` is open for the duration of the enclosing closure.
        let ret = unsafe { nvs_commit(handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn c_key(key: &str) -> Result<CString, StorageError> {
        CString::new(key).map_err(|_| StorageError::InvalidValue)
    }

    /// Map a read result: "not found" becomes `Ok(None)`.
    #[cfg(target_os = "espidf")]
    fn not_found_as_none<T>(result: Result<T, esp_err_t>) -> Result<Option<T>, StorageError> {
        match result {
            Ok(v) => Ok(Some(v)),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Ok(None),
            Err(e) if e == ESP_ERR_NVS_TYPE_MISMATCH as esp_err_t => {
                Err(StorageError::TypeMismatch)
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

impl StoragePort for NvsAdapter {
    fn get_bool(&self, namespace: &str, key: &str) -> Result<Option<bool>, StorageError> {
        Self::check_names(namespace, key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.borrow().get(&Self::composite_key(namespace, key)) {
                None => Ok(None),
                Some(StoredValue::Bool(v)) => Ok(Some(*v)),
                Some(StoredValue::Str(_)) => Err(StorageError::TypeMismatch),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_key(key)?;
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                let mut value: u8 = 0;
                // SAFETY: key is NUL-terminated; `value` outlives the call.
                let ret = unsafe { nvs_get_u8(handle, key.as_ptr(), &mut value) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Ok(value != 0)
            });
            Self::not_found_as_none(result)
        }
    }

    fn put_bool(&self, namespace: &str, key: &str, value: bool) -> Result<(), StorageError> {
        Self::check_names(namespace, key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .insert(Self::composite_key(namespace, key), StoredValue::Bool(value));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_key(key)?;
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                // SAFETY: key is NUL-terminated for the call duration.
                let ret = unsafe { nvs_set_u8(handle, key.as_ptr(), u8::from(value)) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Self::commit(handle)
            });
            result.map_err(StorageError::Io)
        }
    }

    fn get_string(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        Self::check_names(namespace, key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.borrow().get(&Self::composite_key(namespace, key)) {
                None => Ok(None),
                Some(StoredValue::Str(v)) => Ok(Some(v.clone())),
                Some(StoredValue::Bool(_)) => Err(StorageError::TypeMismatch),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_key(key)?;
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                // First call: get size (including the NUL terminator).
                let mut size: usize = 0;
                // SAFETY: a null output pointer asks NVS for the length only.
                let ret = unsafe {
                    nvs_get_str(handle, key.as_ptr(), core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                if size == 0 || size > MAX_STRING_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
                }

                let mut buf = vec![0u8; size];
                // SAFETY: `buf` holds `size` bytes as reported above.
                let ret = unsafe {
                    nvs_get_str(handle, key.as_ptr(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                buf.truncate(size.saturating_sub(1));
                Ok(buf)
            });
            match Self::not_found_as_none(result)? {
                Some(bytes) => String::from_utf8(bytes)
                    .map(Some)
                    .map_err(|_| StorageError::InvalidValue),
                None => Ok(None),
            }
        }
    }

    fn put_string(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        Self::check_names(namespace, key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            if value.contains('\0') {
                return Err(StorageError::InvalidValue);
            }
            self.store.borrow_mut().insert(
                Self::composite_key(namespace, key),
                StoredValue::Str(value.to_owned()),
            );
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_key(key)?;
            let value = CString::new(value).map_err(|_| StorageError::InvalidValue)?;
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                // SAFETY: key and value are NUL-terminated for the call duration.
                let ret = unsafe { nvs_set_str(handle, key.as_ptr(), value.as_ptr()) };
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Self::commit(handle)
            });
            result.map_err(StorageError::Io)
        }
    }

    fn remove(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        Self::check_names(namespace, key)?;

        #[cfg(not(target_os = "espidf"))]
        {
            self.store
                .borrow_mut()
                .remove(&Self::composite_key(namespace, key));
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key = Self::c_key(key)?;
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                // SAFETY: key is NUL-terminated for the call duration.
                let ret = unsafe { nvs_erase_key(handle, key.as_ptr()) };
                if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                    return Ok(());
                }
                if ret != ESP_OK as esp_err_t {
                    return Err(ret);
                }
                Self::commit(handle)
            });
            result.map_err(StorageError::Io)
        }
    }
}

// ── Configuration ──────────────────────────────────────────────────
//
// The configuration is a JSON string in its own namespace so that relay
// state keys and config keys never collide.
impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<RelayConfig, ConfigError> {
        match self.get_string(CONFIG_NAMESPACE, CONFIG_KEY)? {
            Some(json) => {
                let cfg: RelayConfig =
                    serde_json::from_str(&json).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            }
            None => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(RelayConfig::default())
            }
        }
    }

    fn save(&self, config: &RelayConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string(config).map_err(|_| ConfigError::Corrupted)?;
        self.put_string(CONFIG_NAMESPACE, CONFIG_KEY, &json)?;
        info!("NvsAdapter: config saved ({} bytes)", json.len());
        Ok(())
    }
}
