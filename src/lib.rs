//! Demo client that exchanges map configurations with a save backend.
/// Filesystem locations for config and logs.
pub mod app_dirs;
/// HTTP exchanges with the backend.
pub mod backend;
/// Startup wiring.
pub mod bootstrap;
/// App configuration and backend resolution.
pub mod config;
/// Save-to-backend and save-to-file export paths.
pub mod export;
pub(crate) mod http_client;
/// Logging setup.
pub mod logging;
/// The Map Configuration payload.
pub mod schema;
/// Canned demo datasets.
pub mod seed;
/// Shared visualization state.
pub mod state;
