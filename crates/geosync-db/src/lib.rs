//! Geosync DB - PostgreSQL persistence for country records.

pub mod repository;
pub mod schema;

pub use repository::CountryRepository;
pub use schema::ensure_schema;
