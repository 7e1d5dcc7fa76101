//! Key-value storage contract (JSON stored as text per key) and typed helpers.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures reported by [`KeyValueStore`] implementations and the typed JSON helpers.
pub enum StorageError {
    /// The backing storage area is not available in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The write would exceed the storage quota for the origin.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),
    /// A value could not be serialized to JSON; nothing was written.
    #[error("serialize failed: {0}")]
    Serialize(String),
    /// The stored text under `key` is not valid JSON for the requested type.
    #[error("decode failed for `{key}`: {message}")]
    Decode {
        /// Storage key that held the undecodable value.
        key: String,
        /// Decoder message.
        message: String,
    },
    /// Any other backend failure.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

impl StorageError {
    /// Returns `true` for errors caused by the stored content rather than the backend.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Host service for origin-scoped persistent values (raw JSON text per key).
///
/// Reads of a missing key return `Ok(None)`; they never report a decoding problem because the
/// contract is text-level. Writes and removes are visible to every other tab of the same origin.
pub trait KeyValueStore {
    /// Reads the raw JSON text stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores raw JSON text under `key`, replacing any previous value.
    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        (**self).write(key, raw_json)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, raw_json: &str) -> Result<(), StorageError> {
        (**self).write(key, raw_json)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for unsupported targets and baseline tests.
pub struct NoopKeyValueStore;

impl KeyValueStore for NoopKeyValueStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn write(&self, _key: &str, _raw_json: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Reads and deserializes a typed value through a [`KeyValueStore`] implementation.
///
/// # Errors
///
/// Returns [`StorageError::Decode`] when the stored text is not valid JSON for `T`, or the
/// store's own error when the read fails.
pub fn read_json_with<S: KeyValueStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|err| StorageError::Decode {
            key: key.to_string(),
            message: err.to_string(),
        })
}

/// Reads the value under `key` as an untyped JSON document.
///
/// # Errors
///
/// Returns [`StorageError::Decode`] when the stored text is not JSON at all.
pub fn read_value_with<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<Value>, StorageError> {
    read_json_with(store, key)
}

/// Serializes and saves a typed value through a [`KeyValueStore`] implementation.
///
/// # Errors
///
/// Returns [`StorageError::Serialize`] (and writes nothing) when `value` cannot be encoded, or the
/// store's own error when the write fails.
pub fn write_json_with<S: KeyValueStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize(e.to_string()))?;
    store.write(key, &raw)
}
