//! Exporting the current map configuration.
//!
//! Both paths build the payload immediately before use from whatever the
//! state holds at that moment; nothing is cached between calls.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::backend::save::{self, SaveError, SaveReceipt};
use crate::config::BackendConfig;
use crate::schema::MapConfiguration;
use crate::state::SharedMapState;

/// Default filename for local exports, kept from the original client.
pub const DEFAULT_EXPORT_FILE: &str = "kepler.gl.json";

/// Errors raised while writing a local export file.
#[derive(Debug, Error)]
pub enum ExportFileError {
    /// The payload could not be serialized.
    #[error("Failed to serialize map configuration: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Snapshot the state and POST it to the save endpoint.
///
/// Returns the server's message for display. Concurrent calls are not
/// coordinated; each takes its own independent snapshot.
pub fn save_to_backend(
    backend: &BackendConfig,
    state: &SharedMapState,
) -> Result<SaveReceipt, SaveError> {
    let payload = MapConfiguration::from_state(state);
    let receipt = save::save_map(backend, &payload)?;
    tracing::info!("Map configuration saved: {}", receipt.message);
    Ok(receipt)
}

/// Snapshot the state and write it to a local JSON file.
pub fn write_to_file(state: &SharedMapState, path: &Path) -> Result<(), ExportFileError> {
    let payload = MapConfiguration::from_state(state);
    let text = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, text).map_err(|source| ExportFileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Map configuration written to {}", path.display());
    Ok(())
}
