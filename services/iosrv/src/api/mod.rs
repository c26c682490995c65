//! HTTP control surface for the simulator
//!
//! Exposes device status, input injection, raw frame injection and the event
//! history over a small axum API. See [`routes::create_api_routes`].

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod types;

pub use routes::{create_api_routes, AppState, IoSrvApiDoc};
