//! Geosync Client - HTTP client for the upstream countries API
//!
//! - [`restcountries`] - REST Countries (<https://restcountries.com>)
//!
//! The client builds the request, decodes the payload, and normalizes raw
//! entries into [`geosync_core::CandidateCountry`] values.

pub mod restcountries;

pub use restcountries::RestCountriesClient;
