//! Sample-configuration loader.
//!
//! `GET {base}/api/{user}/samples` lists the pre-built map configurations the
//! backend offers; an optional sample-map id narrows the request to one entry.
//! The response shape is the backend's contract, so entries are kept as raw
//! JSON with only `id` and `label` pulled out for display.

use serde_json::Value;
use thiserror::Error;

use crate::config::BackendConfig;
use crate::http_client;

const MAX_SAMPLES_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// One sample map configuration offered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Backend-assigned id, when the entry carries one.
    pub id: Option<String>,
    /// Display label, when the entry carries one.
    pub label: Option<String>,
    /// The entry as received.
    pub raw: Value,
}

/// Failures of the samples exchange, tagged so callers must handle each.
#[derive(Debug, Error)]
pub enum SamplesError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP {code} from samples endpoint: {body}")]
    Status { code: u16, body: String },
    /// The request never completed.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// The response body was not the expected JSON.
    #[error("Invalid samples response: {0}")]
    Json(String),
}

/// Fetch the sample configurations for the configured user.
pub fn fetch_samples(
    backend: &BackendConfig,
    sample_map_id: Option<&str>,
) -> Result<Vec<SampleConfig>, SamplesError> {
    let url = samples_url(backend, sample_map_id);
    tracing::debug!("Fetching sample configurations from {url}");
    let response = match http_client::agent()
        .get(&url)
        .set("Accept", "application/json")
        .call()
    {
        Ok(response) => response,
        Err(ureq::Error::Status(code, response)) => {
            let body = http_client::read_response_text(response, MAX_SAMPLES_RESPONSE_BYTES)
                .unwrap_or_default();
            return Err(SamplesError::Status { code, body });
        }
        Err(ureq::Error::Transport(err)) => {
            return Err(SamplesError::Transport(err.to_string()));
        }
    };

    let body = http_client::read_response_text(response, MAX_SAMPLES_RESPONSE_BYTES)
        .map_err(|err| SamplesError::Json(err.to_string()))?;
    parse_samples(&body)
}

/// Build the samples endpoint URL for the given backend and optional id.
pub fn samples_url(backend: &BackendConfig, sample_map_id: Option<&str>) -> String {
    let base = backend.base_url.as_str().trim_end_matches('/');
    let mut url = format!("{base}/api/{}/samples", backend.user);
    if let Some(id) = sample_map_id {
        url.push('/');
        url.push_str(id);
    }
    url
}

fn parse_samples(body: &str) -> Result<Vec<SampleConfig>, SamplesError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(SamplesError::Json("Empty response body".to_string()));
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|err| SamplesError::Json(err.to_string()))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("samples") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(SamplesError::Json(format!(
                    "Expected 'samples' to be an array, got {other}"
                )));
            }
            // A single sample detail (id-narrowed request).
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(SamplesError::Json(format!(
                "Expected an array or object, got {other}"
            )));
        }
    };

    Ok(entries.into_iter().map(sample_from_entry).collect())
}

fn sample_from_entry(raw: Value) -> SampleConfig {
    let id = string_field(&raw, "id");
    let label = string_field(&raw, "label").or_else(|| string_field(&raw, "name"));
    SampleConfig { id, label, raw }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}
