//! Geosync CLI - HTTP API and command-line interface for Geosync
//!
//! This crate provides the binary that ties together all Geosync components.

pub mod api;
pub mod config;

pub use api::{router, AppState};
pub use config::{Command, Config};
