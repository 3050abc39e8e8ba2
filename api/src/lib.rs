//! HTTP surface of the Habitline backend
//!
//! Library exports for the server binary and the integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState, AppTokenService};
