//! The Map Configuration payload exchanged with the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::state::SharedMapState;

/// Compatibility constant carried in `info.app`; the backend uses it to tell
/// which application produced the payload.
pub const APP_NAME: &str = "kepler.gl";

/// The serialized snapshot of datasets, visualization settings, and metadata
/// sent to the save endpoint.
///
/// Built immediately before transmission from whatever the state holds at that
/// moment; never cached, diffed, or retained after the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfiguration {
    /// Snapshot of all loaded datasets (opaque to this layer).
    pub datasets: Value,
    /// Snapshot of the visualization settings (opaque to this layer).
    pub config: Value,
    /// Fixed-shape metadata record.
    pub info: SaveInfo,
}

/// Metadata attached to every saved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveInfo {
    /// Producing application, always [`APP_NAME`].
    pub app: String,
    /// Wall-clock UTC timestamp taken when the payload was built (RFC3339).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl MapConfiguration {
    /// Snapshot the shared state into a fresh payload.
    pub fn from_state(state: &SharedMapState) -> Self {
        Self {
            datasets: state.datasets_to_save(),
            config: state.config_to_save(),
            info: SaveInfo {
                app: APP_NAME.to_string(),
                created_at: OffsetDateTime::now_utc(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn payload_always_carries_the_three_top_level_keys() {
        let state = SharedMapState::new();
        let payload = MapConfiguration::from_state(&state);
        let value = serde_json::to_value(&payload).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("datasets"));
        assert!(object.contains_key("config"));
        assert!(object.contains_key("info"));
        assert_eq!(value["info"]["app"], "kepler.gl");
    }

    #[test]
    fn created_at_is_taken_at_construction() {
        let before = OffsetDateTime::now_utc();
        let payload = MapConfiguration::from_state(&SharedMapState::new());
        let after = OffsetDateTime::now_utc();
        assert!(payload.info.created_at >= before);
        assert!(payload.info.created_at <= after + Duration::from_millis(1));
    }

    #[test]
    fn created_at_serializes_as_rfc3339() {
        let payload = MapConfiguration::from_state(&SharedMapState::new());
        let value = serde_json::to_value(&payload).unwrap();
        let text = value["info"]["created_at"].as_str().unwrap();
        let parsed = OffsetDateTime::parse(
            text,
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap();
        assert_eq!(parsed, payload.info.created_at);
    }
}
