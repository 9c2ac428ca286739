//! Canned demo datasets pushed through the two ingestion operations.
//!
//! Mirrors the sample load of the original demo: taxi trips become the primary
//! view with a time-range filter, icon points arrive with a bundled map
//! config, and the GeoJSON polygons and H3 hexagons are plain overlays.
//! Dataset contents are static fixtures; their records are opaque here.

use serde_json::Value;
use thiserror::Error;

use crate::state::{AddDataRequest, Dataset, FilterConfig, SharedMapState, ViewOptions};

const TRIP_DATA: &str = include_str!("../assets/data/sample_trip_data.json");
const ICON_POINTS: &str = include_str!("../assets/data/sample_icon_points.json");
const ICON_CONFIG: &str = include_str!("../assets/data/sample_icon_config.json");
const GEOJSON: &str = include_str!("../assets/data/sample_geojson.json");
const HEX_IDS: &str = include_str!("../assets/data/sample_hex_ids.json");

/// Dataset id of the primary trip dataset.
pub const TRIP_DATASET_ID: &str = "test_trip_data";
/// Dataset id of the icon overlay.
pub const ICON_DATASET_ID: &str = "test_icon_data";
/// Dataset id of the hexagon overlay.
pub const HEX_DATASET_ID: &str = "h3-hex-id";

/// Errors raised while decoding embedded fixtures.
#[derive(Debug, Error)]
pub enum SeedError {
    /// An embedded fixture failed to parse.
    #[error("Invalid embedded fixture {name}: {source}")]
    Fixture {
        name: &'static str,
        source: serde_json::Error,
    },
}

/// Push the four demo datasets into the shared state.
pub fn load_sample_data(state: &SharedMapState) -> Result<(), SeedError> {
    let trips = fixture("sample_trip_data", TRIP_DATA)?;
    let icons = fixture("sample_icon_points", ICON_POINTS)?;
    let icon_config = fixture("sample_icon_config", ICON_CONFIG)?;
    let geojson = fixture("sample_geojson", GEOJSON)?;
    let hexagons = fixture("sample_hex_ids", HEX_IDS)?;

    state.with(|map| {
        map.update_vis_data(
            Dataset::with_id(
                TRIP_DATASET_ID,
                "Sample Taxi Trips in New York City",
                trips,
            ),
            ViewOptions {
                center_map: true,
                read_only: false,
            },
            vec![FilterConfig {
                id: "me".to_string(),
                data_id: TRIP_DATASET_ID.to_string(),
                name: "tpep_pickup_datetime".to_string(),
                kind: "timeRange".to_string(),
                enlarged: true,
            }],
        );

        map.add_data_to_map(AddDataRequest {
            datasets: vec![Dataset::with_id(ICON_DATASET_ID, "Icon Data", icons)],
            options: Some(ViewOptions {
                center_map: false,
                read_only: false,
            }),
            config: Some(icon_config),
        });

        map.update_vis_data(
            Dataset::new("SF Zip Geo", geojson),
            ViewOptions::default(),
            Vec::new(),
        );

        map.add_data_to_map(AddDataRequest {
            datasets: vec![Dataset::with_id(HEX_DATASET_ID, "H3 Hexagons V2", hexagons)],
            ..AddDataRequest::default()
        });
    });

    tracing::info!("Loaded demo datasets into map state");
    Ok(())
}

fn fixture(name: &'static str, raw: &str) -> Result<Value, SeedError> {
    serde_json::from_str(raw).map_err(|source| SeedError::Fixture { name, source })
}
