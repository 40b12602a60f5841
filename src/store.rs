//! Usage-log loading.
//!
//! Logs are JSON arrays written by external API-call loggers. A missing
//! file is not an error — the service simply has no recorded usage yet —
//! but an unreadable or syntactically invalid file is surfaced as a typed
//! [`StoreError`] so callers can decide how loudly to degrade.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::records::{DurationCallRecord, TokenCallRecord};

/// Errors reading a usage log from disk.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read usage log {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("failed to parse usage log {1}: {0}")]
    Parse(serde_json::Error, PathBuf),
}

/// Load a token-metered usage log. A missing file yields an empty set.
pub fn load_token_log(path: impl AsRef<Path>) -> Result<Vec<TokenCallRecord>, StoreError> {
    load_log(path.as_ref())
}

/// Load a duration-metered usage log. A missing file yields an empty set.
pub fn load_duration_log(path: impl AsRef<Path>) -> Result<Vec<DurationCallRecord>, StoreError> {
    load_log(path.as_ref())
}

fn load_log<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::Io(e, path.to_path_buf())),
    };

    serde_json::from_str(&contents).map_err(|e| StoreError::Parse(e, path.to_path_buf()))
}
