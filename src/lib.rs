//! Library crate for pod-stage-back, exposing modules for the binary and integration tests.

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod live;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
