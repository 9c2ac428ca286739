//! In-memory visualization state.
//!
//! Holds the loaded datasets and the visualization settings that the external
//! map component renders from. Dataset payloads are opaque JSON at this layer.
//! The state is the single shared mutable resource in the process; all access
//! goes through [`SharedMapState`], which only hands out deep-copied
//! snapshots.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::backend::samples::SampleConfig;

/// Identity and display metadata for a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Stable dataset id; generated when the caller does not supply one.
    pub id: String,
    /// Human-facing label.
    pub label: String,
}

/// A named collection of geospatial records. The payload is produced and
/// consumed by the external visualization component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset identity.
    pub info: DatasetInfo,
    /// Opaque record payload.
    pub data: Value,
}

impl Dataset {
    /// Create a dataset with a generated id.
    pub fn new(label: impl Into<String>, data: Value) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label, data)
    }

    /// Create a dataset with an explicit id.
    pub fn with_id(id: impl Into<String>, label: impl Into<String>, data: Value) -> Self {
        Self {
            info: DatasetInfo {
                id: id.into(),
                label: label.into(),
            },
            data,
        }
    }
}

/// View options accepted by the ingestion operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Re-center the map on the incoming dataset.
    #[serde(default)]
    pub center_map: bool,
    /// Disable interactive editing.
    #[serde(default)]
    pub read_only: bool,
}

/// A filter attached to a dataset, in the shape the external component saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Filter id.
    pub id: String,
    /// Id of the dataset the filter applies to.
    #[serde(rename = "dataId")]
    pub data_id: String,
    /// Field the filter runs over.
    pub name: String,
    /// Filter kind, e.g. `timeRange`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the filter is shown enlarged.
    #[serde(default)]
    pub enlarged: bool,
}

/// Request for adding datasets on top of the current view.
#[derive(Debug, Clone, Default)]
pub struct AddDataRequest {
    /// Datasets to add or replace.
    pub datasets: Vec<Dataset>,
    /// Optional view options; the view is left alone when absent.
    pub options: Option<ViewOptions>,
    /// Saved visualization config bundled with the data, merged on arrival.
    pub config: Option<Value>,
}

/// The mutable visualization state.
#[derive(Debug, Default)]
pub struct MapState {
    datasets: Vec<Dataset>,
    filters: Vec<FilterConfig>,
    saved_config: Map<String, Value>,
    view: ViewOptions,
    primary: Option<String>,
    samples: Vec<SampleConfig>,
}

impl MapState {
    /// Replace or add a dataset that becomes the primary view, applying view
    /// options and attaching the given filters.
    ///
    /// Filters previously attached to the same dataset are replaced; filters
    /// on other datasets are untouched.
    pub fn update_vis_data(
        &mut self,
        dataset: Dataset,
        options: ViewOptions,
        filters: Vec<FilterConfig>,
    ) {
        let id = dataset.info.id.clone();
        self.upsert(dataset);
        self.filters.retain(|filter| filter.data_id != id);
        self.filters.extend(filters);
        self.primary = Some(id);
        self.view = options;
    }

    /// Add datasets without changing the current primary view. A bundled saved
    /// config is merged into the visualization settings.
    pub fn add_data_to_map(&mut self, request: AddDataRequest) {
        for dataset in request.datasets {
            self.upsert(dataset);
        }
        if let Some(options) = request.options {
            self.view = options;
        }
        if let Some(config) = request.config {
            self.merge_saved_config(config);
        }
    }

    fn upsert(&mut self, dataset: Dataset) {
        match self
            .datasets
            .iter_mut()
            .find(|existing| existing.info.id == dataset.info.id)
        {
            Some(existing) => *existing = dataset,
            None => self.datasets.push(dataset),
        }
    }

    fn merge_saved_config(&mut self, config: Value) {
        // Saved configs arrive either bare or wrapped in {"version", "config"}.
        let inner = match config {
            Value::Object(mut wrapper) => match wrapper.remove("config") {
                Some(Value::Object(inner)) => inner,
                Some(other) => Map::from_iter([("config".to_string(), other)]),
                None => wrapper,
            },
            other => Map::from_iter([("saved".to_string(), other)]),
        };
        for (key, value) in inner {
            self.saved_config.insert(key, value);
        }
    }

    /// Record the sample configurations fetched at startup.
    pub fn set_samples(&mut self, samples: Vec<SampleConfig>) {
        self.samples = samples;
    }

    /// Sample configurations available for loading.
    pub fn samples(&self) -> &[SampleConfig] {
        &self.samples
    }

    /// Loaded datasets in insertion order.
    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    /// Id of the dataset that owns the current view, if any.
    pub fn primary_dataset(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Serialize all loaded datasets, the way the external schema serializer
    /// would. Always reads the current state in full.
    pub fn datasets_to_save(&self) -> Value {
        serde_json::to_value(&self.datasets).unwrap_or(Value::Array(Vec::new()))
    }

    /// Serialize the visualization settings for saving.
    pub fn config_to_save(&self) -> Value {
        let mut vis_state = self.saved_config.clone();
        vis_state.insert(
            "filters".to_string(),
            serde_json::to_value(&self.filters).unwrap_or(Value::Array(Vec::new())),
        );
        json!({
            "version": "v1",
            "config": {
                "visState": Value::Object(vis_state),
                "mapState": {
                    "centerMap": self.view.center_map,
                    "readOnly": self.view.read_only,
                    "primaryDataset": self.primary.clone(),
                },
            },
        })
    }
}

/// Clonable handle to the process-wide map state.
#[derive(Clone, Debug, Default)]
pub struct SharedMapState {
    inner: Arc<Mutex<MapState>>,
}

impl SharedMapState {
    /// Create an empty shared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against the locked state.
    pub fn with<T>(&self, f: impl FnOnce(&mut MapState) -> T) -> T {
        let mut guard = self.inner.lock().expect("map state mutex poisoned");
        f(&mut guard)
    }

    /// Deep-copied dataset snapshot of the state as it is right now.
    pub fn datasets_to_save(&self) -> Value {
        self.with(|state| state.datasets_to_save())
    }

    /// Deep-copied visualization-config snapshot.
    pub fn config_to_save(&self) -> Value {
        self.with(|state| state.config_to_save())
    }
}
