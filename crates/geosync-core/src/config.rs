//! Configuration types for Geosync components.
//!
//! These are the defaults; the `geosync` binary overrides them from CLI
//! arguments and environment variables.

use std::time::Duration;

/// REST Countries endpoint restricted to the fields Geosync stores.
pub const DEFAULT_SOURCE_URL: &str = "https://restcountries.com/v3.1/all?fields=name,cca3,capital,region,subregion,population,area,flags";

/// Database connection pool configuration.
pub struct DbConfig {
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

/// HTTP client configuration for the upstream countries API.
pub struct HttpConfig {
    pub timeout: Duration,
}

impl HttpConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}
