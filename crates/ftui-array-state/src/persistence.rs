#![forbid(unsafe_code)]

//! JSON snapshot codec for [`ArrayState`] (feature `state-persistence`).
//!
//! Hosts that mirror the sequence into a storage backend call
//! [`to_json`] from their change hook and feed stored text back through
//! [`ArrayState::load_json`]. Restoring goes through
//! [`ArrayState::set_value`], so loading a sequence equal to the current one
//! is a no-op.
//!
//! # Format
//!
//! ```json
//! {"format":1,"items":["React","TypeScript"]}
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Serialize | an item fails to serialize | `PersistError::Serialize` |
//! | Deserialize | malformed JSON or item shape | `PersistError::Deserialize` |
//! | Unknown format | `format` newer than [`PERSIST_FORMAT`] | `PersistError::UnsupportedFormat`, state untouched |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::ArrayState;

/// Current snapshot format tag.
pub const PERSIST_FORMAT: u32 = 1;

/// Persistable form of an [`ArrayState`] sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayPersistState<T> {
    /// Format tag, [`PERSIST_FORMAT`] when written by this crate.
    pub format: u32,
    /// Items in sequence order.
    pub items: Vec<T>,
}

impl<T> ArrayPersistState<T> {
    /// Wrap `items` with the current format tag.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            format: PERSIST_FORMAT,
            items,
        }
    }

    /// Unwrap the items, rejecting formats this crate does not understand.
    pub fn into_items(self) -> Result<Vec<T>, PersistError> {
        if self.format != PERSIST_FORMAT {
            #[cfg(feature = "tracing")]
            warn!(
                format = self.format,
                supported = PERSIST_FORMAT,
                "array state: unsupported snapshot format"
            );
            return Err(PersistError::UnsupportedFormat(self.format));
        }
        Ok(self.items)
    }
}

/// Borrowed counterpart of [`ArrayPersistState`] for serialization without
/// cloning the items.
#[derive(Serialize)]
struct PersistRef<'a, T> {
    format: u32,
    items: &'a [T],
}

/// Errors from snapshot encoding and decoding.
#[derive(Debug)]
pub enum PersistError {
    /// The items could not be encoded.
    Serialize(serde_json::Error),
    /// The input was not a valid snapshot.
    Deserialize(serde_json::Error),
    /// The snapshot carries a format tag this crate cannot read.
    UnsupportedFormat(u32),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(e) => write!(f, "failed to encode array snapshot: {e}"),
            Self::Deserialize(e) => write!(f, "failed to decode array snapshot: {e}"),
            Self::UnsupportedFormat(v) => {
                write!(f, "unsupported array snapshot format {v} (expected {PERSIST_FORMAT})")
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialize(e) | Self::Deserialize(e) => Some(e),
            Self::UnsupportedFormat(_) => None,
        }
    }
}

/// Encode `items` as a snapshot document.
pub fn to_json<T: Serialize>(items: &[T]) -> Result<String, PersistError> {
    serde_json::to_string(&PersistRef {
        format: PERSIST_FORMAT,
        items,
    })
    .map_err(PersistError::Serialize)
}

/// Decode a snapshot document into its items.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, PersistError> {
    serde_json::from_str::<ArrayPersistState<T>>(json)
        .map_err(PersistError::Deserialize)?
        .into_items()
}

impl<T> ArrayState<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + 'static,
{
    /// Capture the current sequence for persistence.
    #[must_use]
    pub fn save_state(&self) -> ArrayPersistState<T> {
        ArrayPersistState::new(self.to_vec())
    }

    /// Replace the sequence with a persisted one. Returns whether anything
    /// changed; an equal sequence is a no-op.
    pub fn restore_state(&self, state: ArrayPersistState<T>) -> Result<bool, PersistError> {
        let items = state.into_items()?;
        #[cfg(feature = "tracing")]
        debug!(len = items.len(), "array state: restoring persisted snapshot");
        Ok(self.set_value(items))
    }

    /// Encode the current sequence.
    pub fn to_json(&self) -> Result<String, PersistError> {
        to_json(self.snapshot().as_slice())
    }

    /// Decode `json` and restore it. The sequence is untouched on error.
    pub fn load_json(&self, json: &str) -> Result<bool, PersistError> {
        let state = serde_json::from_str::<ArrayPersistState<T>>(json)
            .map_err(PersistError::Deserialize)?;
        self.restore_state(state)
    }
}
