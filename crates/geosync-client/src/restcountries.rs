use async_trait::async_trait;
use geosync_core::config::HttpConfig;
use geosync_core::error::AppError;
use geosync_core::models::CandidateCountry;
use geosync_core::store::CountrySource;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// One entry of the REST Countries `/v3.1/all` response.
///
/// API reference: <https://restcountries.com>
///
/// Only the fields Geosync stores are modelled; everything else in the
/// payload is ignored.
///
/// # Examples
///
/// ```
/// use geosync_client::restcountries::RawCountry;
///
/// let json = r#"{
///     "name": {"common": "Argentina", "official": "Argentine Republic"},
///     "cca3": "ARG",
///     "capital": ["Buenos Aires"],
///     "region": "Americas",
///     "population": 45376763
/// }"#;
///
/// let raw: RawCountry = serde_json::from_str(json).unwrap();
/// assert_eq!(raw.cca3.as_deref(), Some("ARG"));
/// assert_eq!(raw.population, Some(45376763));
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawCountry {
    pub name: Option<RawName>,
    pub cca3: Option<String>,
    pub capital: Option<Vec<String>>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<i64>,
    pub area: Option<f64>,
    pub flags: Option<RawFlags>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawName {
    #[serde(default)]
    pub common: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawFlags {
    pub png: Option<String>,
    pub svg: Option<String>,
}

/// HTTP client for the public REST Countries API.
///
/// Makes a single GET per [`fetch_all`](CountrySource::fetch_all) with a
/// bounded timeout. Failures are reported as [`AppError::ExternalService`] and
/// never retried.
///
/// # Examples
///
/// ```no_run
/// use geosync_client::RestCountriesClient;
/// use geosync_core::{CountrySource, HttpConfig, DEFAULT_SOURCE_URL};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RestCountriesClient::new(DEFAULT_SOURCE_URL, &HttpConfig::default())?;
/// let countries = client.fetch_all().await?;
/// println!("Fetched {} countries", countries.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RestCountriesClient {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl RestCountriesClient {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is malformed.
    /// Returns `AppError::Generic` if the HTTP client cannot be built.
    pub fn new(url_str: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let url = Url::parse(url_str).map_err(|_| AppError::InvalidUrl(url_str.to_string()))?;

        let client = Client::builder()
            .user_agent("Geosync/0.1 (reference-data-sync)")
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Generic(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            timeout: config.timeout,
        })
    }

    /// Fetches and decodes the raw upstream payload.
    pub async fn fetch_raw(&self) -> Result<Vec<RawCountry>, AppError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "upstream responded with HTTP {}",
                status.as_u16()
            )));
        }

        resp.json::<Vec<RawCountry>>()
            .await
            .map_err(|e| AppError::ExternalService(format!("invalid response body: {}", e)))
    }

    fn request_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::ExternalService(format!(
                "request timed out after {} seconds",
                self.timeout.as_secs_f32()
            ))
        } else if e.is_connect() {
            AppError::ExternalService(format!("could not connect to {}: {}", self.url, e))
        } else {
            AppError::ExternalService(e.to_string())
        }
    }

    /// Converts raw entries into candidates, dropping entries without a code.
    ///
    /// # Examples
    ///
    /// ```
    /// use geosync_client::RestCountriesClient;
    /// use geosync_client::restcountries::RawCountry;
    ///
    /// let raw: Vec<RawCountry> = serde_json::from_str(r#"[
    ///     {"name": {"common": " Chile "}, "cca3": "CHL", "capital": ["Santiago"]},
    ///     {"name": {"common": "Nowhere"}, "cca3": ""}
    /// ]"#).unwrap();
    ///
    /// let candidates = RestCountriesClient::into_candidates(raw);
    /// assert_eq!(candidates.len(), 1);
    /// assert_eq!(candidates[0].name, "Chile");
    /// assert_eq!(candidates[0].capital.as_deref(), Some("Santiago"));
    /// ```
    pub fn into_candidates(raw: Vec<RawCountry>) -> Vec<CandidateCountry> {
        raw.into_iter().filter_map(Self::into_candidate).collect()
    }

    fn into_candidate(raw: RawCountry) -> Option<CandidateCountry> {
        let code = raw.cca3.as_deref().unwrap_or_default().trim().to_string();
        if code.is_empty() {
            return None;
        }

        let flags = raw.flags.unwrap_or_default();

        Some(CandidateCountry {
            name: raw
                .name
                .map(|n| n.common.trim().to_string())
                .unwrap_or_default(),
            code,
            capital: raw.capital.and_then(|list| list.into_iter().next()),
            region: raw.region.filter(|r| !r.is_empty()),
            subregion: raw.subregion.filter(|s| !s.is_empty()),
            population: raw.population,
            area: raw.area,
            flag_url: flags
                .png
                .filter(|u| !u.is_empty())
                .or_else(|| flags.svg.filter(|u| !u.is_empty())),
        })
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_all(&self) -> Result<Vec<CandidateCountry>, AppError> {
        let raw = match self.fetch_raw().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetching countries from {} failed: {}", self.url, e);
                return Err(e);
            }
        };

        let received = raw.len();
        let candidates = Self::into_candidates(raw);
        info!(
            "Received {} entries from upstream, {} with a country code",
            received,
            candidates.len()
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v3.1/all", addr)
    }

    fn sample_payload() -> serde_json::Value {
        json!([
            {
                "name": {"common": "Argentina", "official": "Argentine Republic"},
                "cca3": "ARG",
                "capital": ["Buenos Aires"],
                "region": "Americas",
                "subregion": "South America",
                "population": 45376763,
                "area": 2780400.0,
                "flags": {"png": "https://flagcdn.com/w320/ar.png", "svg": "https://flagcdn.com/ar.svg"}
            },
            {
                "name": {"common": "South Africa"},
                "cca3": "ZAF",
                "capital": ["Pretoria", "Bloemfontein", "Cape Town"],
                "region": "Africa",
                "subregion": "",
                "population": 59308690,
                "area": 1221037.0,
                "flags": {"svg": "https://flagcdn.com/za.svg"}
            },
            {
                "name": {"common": "Unknown"},
                "cca3": "  ",
                "region": "Europe"
            }
        ])
    }

    #[test]
    fn test_new_with_valid_url() {
        let client = RestCountriesClient::new(
            "https://restcountries.com/v3.1/all",
            &HttpConfig::default(),
        )
        .unwrap();
        assert_eq!(client.url.as_str(), "https://restcountries.com/v3.1/all");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_new_with_invalid_url() {
        let result = RestCountriesClient::new("not-a-valid-url", &HttpConfig::default());
        match result {
            Err(AppError::InvalidUrl(url)) => assert_eq!(url, "not-a-valid-url"),
            _ => panic!("Expected AppError::InvalidUrl"),
        }
    }

    #[test]
    fn test_into_candidates_parsing_rules() {
        let raw: Vec<RawCountry> = serde_json::from_value(sample_payload()).unwrap();
        let candidates = RestCountriesClient::into_candidates(raw);

        assert_eq!(candidates.len(), 2);

        let arg = &candidates[0];
        assert_eq!(arg.code, "ARG");
        assert_eq!(arg.name, "Argentina");
        assert_eq!(arg.capital.as_deref(), Some("Buenos Aires"));
        assert_eq!(arg.subregion.as_deref(), Some("South America"));
        assert_eq!(arg.population, Some(45376763));
        assert_eq!(arg.flag_url.as_deref(), Some("https://flagcdn.com/w320/ar.png"));

        let zaf = &candidates[1];
        assert_eq!(zaf.capital.as_deref(), Some("Pretoria"));
        assert_eq!(zaf.subregion, None);
        assert_eq!(zaf.flag_url.as_deref(), Some("https://flagcdn.com/za.svg"));
    }

    #[test]
    fn test_into_candidates_missing_fields() {
        let raw: Vec<RawCountry> =
            serde_json::from_value(json!([{"cca3": "ata", "capital": []}])).unwrap();
        let candidates = RestCountriesClient::into_candidates(raw);

        assert_eq!(candidates.len(), 1);
        let ata = &candidates[0];
        assert_eq!(ata.code, "ata");
        assert_eq!(ata.name, "");
        assert_eq!(ata.capital, None);
        assert_eq!(ata.region, None);
        assert_eq!(ata.population, None);
        assert_eq!(ata.flag_url, None);
    }

    #[tokio::test]
    async fn test_fetch_all_success() {
        let payload = sample_payload();
        let url = serve(Router::new().route(
            "/v3.1/all",
            get(move || {
                let payload = payload.clone();
                async move { Json(payload) }
            }),
        ))
        .await;

        let client = RestCountriesClient::new(&url, &HttpConfig::default()).unwrap();
        let candidates = client.fetch_all().await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].code, "ARG");
    }

    #[tokio::test]
    async fn test_fetch_all_server_error() {
        let url = serve(Router::new().route(
            "/v3.1/all",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;

        let client = RestCountriesClient::new(&url, &HttpConfig::default()).unwrap();
        let err = client.fetch_all().await.unwrap_err();

        match err {
            AppError::ExternalService(msg) => assert!(msg.contains("HTTP 500")),
            other => panic!("Expected ExternalService, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_invalid_body() {
        let url = serve(Router::new().route(
            "/v3.1/all",
            get(|| async { Json(json!({"status": 400, "message": "Bad Request"})) }),
        ))
        .await;

        let client = RestCountriesClient::new(&url, &HttpConfig::default()).unwrap();
        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn test_fetch_all_timeout() {
        let url = serve(Router::new().route(
            "/v3.1/all",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!([]))
            }),
        ))
        .await;

        let config = HttpConfig {
            timeout: Duration::from_millis(100),
        };
        let client = RestCountriesClient::new(&url, &config).unwrap();
        let err = client.fetch_all().await.unwrap_err();

        match err {
            AppError::ExternalService(msg) => assert!(msg.contains("timed out")),
            other => panic!("Expected ExternalService, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/v3.1/all", addr);
        let client = RestCountriesClient::new(&url, &HttpConfig::default()).unwrap();
        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
