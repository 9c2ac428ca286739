//! Startup wiring.
//!
//! Resolves the backend base URL exactly once, then primes the shared state
//! with the sample configurations offered by the backend. A failed fetch is
//! logged and surfaced through the returned summary; startup continues with
//! an empty sample list.

use crate::backend::samples::{self, SamplesError};
use crate::config::{AppConfig, BackendConfig, ConfigError};
use crate::state::SharedMapState;

/// Everything the rest of the app needs after startup.
#[derive(Debug)]
pub struct Bootstrap {
    /// Resolved backend endpoints, passed to both network operations.
    pub backend: BackendConfig,
    /// Shared map state, primed with the fetched sample configurations.
    pub state: SharedMapState,
    /// The sample fetch failure, when there was one.
    pub samples_error: Option<SamplesError>,
}

/// Resolve config and prime the state with sample configurations.
pub fn run(config: &AppConfig, sample_map_id: Option<&str>) -> Result<Bootstrap, ConfigError> {
    let backend = config.resolve_backend()?;
    let state = SharedMapState::new();

    let samples_error = match samples::fetch_samples(&backend, sample_map_id) {
        Ok(samples) => {
            tracing::info!("Loaded {} sample configuration(s)", samples.len());
            state.with(|map| map.set_samples(samples));
            None
        }
        Err(err) => {
            tracing::warn!("Sample configurations unavailable: {err}");
            Some(err)
        }
    };

    Ok(Bootstrap {
        backend,
        state,
        samples_error,
    })
}
