//! HTTP exchanges with the map-save backend.

pub mod samples;
pub mod save;
