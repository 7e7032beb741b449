use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{timestamp_now, CallerRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read records from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("records file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write records to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Persistence seam for the caller history. The handler only sees this
/// trait, so the flat file can be swapped out without touching it.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Result<Vec<CallerRecord>, StoreError>;
    fn save(&self, records: &[CallerRecord]) -> Result<(), StoreError>;
}

/// Pretty-printed JSON array in a single flat file. A missing file is an
/// empty history; corrupt content is an error, not a reset.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> Result<Vec<CallerRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: err,
                })
            }
        };

        serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            source: err,
        })
    }

    fn save(&self, records: &[CallerRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(StoreError::Serialize)?;

        fs::write(&self.path, json).map_err(|err| StoreError::Write {
            path: self.path.clone(),
            source: err,
        })
    }
}

/// Load the history, fold the caller address into it, and write it back.
///
/// A repeat of the current first record bumps its ping count and refreshes
/// its timestamp; any other address is prepended as a fresh record. Older
/// records are never touched or removed.
pub fn update_records(
    store: &dyn RecordStore,
    caller_address: &str,
) -> Result<Vec<CallerRecord>, StoreError> {
    let mut records = store.load()?;

    match records.first_mut() {
        Some(current) if current.caller == caller_address => {
            current.pings += 1;
            current.lastseen = timestamp_now();
        }
        _ => records.insert(0, CallerRecord::new(caller_address)),
    }

    store.save(&records)?;

    Ok(records)
}
