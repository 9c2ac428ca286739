//! Map-configuration save exchange.
//!
//! `POST {base}/api/save` with the full Map Configuration as JSON. The server
//! acknowledges with a JSON body carrying a `message`, which is surfaced to
//! the user verbatim.

use serde::Deserialize;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::http_client;
use crate::schema::MapConfiguration;

const MAX_SAVE_RESPONSE_BYTES: usize = 256 * 1024;

/// Server acknowledgement for a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Message to show the user.
    pub message: String,
}

/// Failures of the save exchange, tagged so callers must handle each.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {code} from save endpoint: {body}")]
    Status { code: u16, body: String },
    /// The request never completed.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// The response body was not the expected JSON.
    #[error("Invalid save response: {0}")]
    Json(String),
}

/// POST the payload to the save endpoint and return the server's message.
///
/// Every call sends a full snapshot; there is no retry, caching, or
/// deduplication of concurrent saves.
pub fn save_map(
    backend: &BackendConfig,
    payload: &MapConfiguration,
) -> Result<SaveReceipt, SaveError> {
    let url = save_url(backend);
    tracing::debug!("Saving map configuration to {url}");
    let request = http_client::agent()
        .post(&url)
        .set("Accept", "application/json")
        .set("Content-Type", "application/json");

    let response = match request.send_json(payload) {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = http_client::read_response_text(response, MAX_SAVE_RESPONSE_BYTES)
                .unwrap_or_default();
            return Err(SaveError::Status { code, body });
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(SaveError::Transport(err.to_string()));
        }
    };

    let body = http_client::read_response_text(response, MAX_SAVE_RESPONSE_BYTES)
        .map_err(|err| SaveError::Json(err.to_string()))?;
    parse_receipt(&body)
}

/// Build the save endpoint URL.
pub fn save_url(backend: &BackendConfig) -> String {
    let base = backend.base_url.as_str().trim_end_matches('/');
    format!("{base}/api/save")
}

#[derive(Debug, Deserialize)]
struct SaveResponseWire {
    message: Option<String>,
    error: Option<String>,
}

fn parse_receipt(body: &str) -> Result<SaveReceipt, SaveError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(SaveError::Json("Empty response body".to_string()));
    }
    let parsed: SaveResponseWire = serde_json::from_str(trimmed)
        .map_err(|err| SaveError::Json(format!("{err}: {trimmed}")))?;
    match (parsed.message, parsed.error) {
        (Some(message), _) => Ok(SaveReceipt { message }),
        (None, Some(error)) => Err(SaveError::Json(error)),
        (None, None) => Err(SaveError::Json(
            "Missing 'message' in response".to_string(),
        )),
    }
}
