//! Geosync Core - Domain types, validation, error handling, and sync orchestration.

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod service;
pub mod store;
pub mod sync;

pub use config::{DbConfig, HttpConfig, DEFAULT_SOURCE_URL};
pub use error::AppError;
pub use memory::InMemoryCountryStore;
pub use models::{CandidateCountry, Country, CountryQuery, NewCountry, DEFAULT_LIMIT, MAX_LIMIT};
pub use service::CountryService;
pub use store::{CountrySource, CountryStore};
pub use sync::{SyncStats, SyncSummary, UpsertOutcome};
