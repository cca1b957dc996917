//! Elevation providers.
//!
//! An [`ElevationProvider`] answers one ordered list of coordinates with one
//! ordered list of elevations. [`GoogleElevationApi`] is the HTTP
//! implementation backed by the Google Elevation API.
//!
//! # Wire Format
//!
//! Requests are `GET {endpoint}?locations=lat,lon|lat,lon|...&key=KEY`.
//! Responses are JSON:
//!
//! ```json
//! {
//!   "status": "OK",
//!   "results": [
//!     { "elevation": 8729.5, "location": { "lat": 27.98, "lng": 86.92 }, "resolution": 152.7 }
//!   ]
//! }
//! ```
//!
//! Failures carry a non-`OK` `status` and usually an `error_message`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{PeakGridError, Result};
use crate::grid::LatLon;

/// Google Elevation API JSON endpoint.
pub const GOOGLE_ELEVATION_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Environment variable overriding the endpoint URL.
pub const ENDPOINT_ENV: &str = "PEAKGRID_ENDPOINT";

/// Default timeout for HTTP requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that turns coordinates into elevations.
pub trait ElevationProvider {
    /// Look up elevations for `locations`, returning one value per location
    /// in the same order.
    fn lookup(&self, locations: &[LatLon]) -> Result<Vec<f64>>;
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for &P {
    fn lookup(&self, locations: &[LatLon]) -> Result<Vec<f64>> {
        (**self).lookup(locations)
    }
}

/// Connection settings for [`GoogleElevationApi`].
#[derive(Clone)]
pub struct ApiConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Endpoint URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Create a configuration for the public Google endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`PeakGridError::MissingApiKey`] if the key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(PeakGridError::MissingApiKey);
        }
        Ok(Self {
            api_key,
            endpoint: GOOGLE_ELEVATION_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GOOGLE_MAPS_API_KEY` | API key | Required |
    /// | `PEAKGRID_ENDPOINT` | Elevation endpoint URL | Google endpoint |
    ///
    /// # Errors
    ///
    /// Returns [`PeakGridError::MissingApiKey`] if `GOOGLE_MAPS_API_KEY` is
    /// unset or blank.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| PeakGridError::MissingApiKey)?;
        let mut config = Self::new(api_key)?;
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    results: Vec<ElevationResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: f64,
}

/// Format coordinates as the `locations` query parameter.
///
/// # Examples
///
/// ```
/// use peakgrid::{provider::format_locations, LatLon};
///
/// let s = format_locations(&[LatLon::new(27.9881, 86.925), LatLon::new(-1.5, 0.0)]);
/// assert_eq!(s, "27.9881,86.925|-1.5,0");
/// ```
pub fn format_locations(locations: &[LatLon]) -> String {
    locations
        .iter()
        .map(|p| format!("{},{}", p.lat, p.lon))
        .collect::<Vec<_>>()
        .join("|")
}

/// Map a non-`OK` API status to an error.
fn classify_api_status(status: &str, message: Option<String>) -> PeakGridError {
    let message = message.unwrap_or_else(|| "No error message provided".to_string());

    match status {
        "REQUEST_DENIED" if message.to_lowercase().contains("api key") => {
            PeakGridError::Auth { message }
        }
        "REQUEST_DENIED" | "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
            PeakGridError::QuotaOrPermission {
                status: status.to_string(),
                message,
            }
        }
        "UNKNOWN_ERROR" => PeakGridError::TransientNetwork {
            reason: format!("{status}: {message}"),
        },
        _ => PeakGridError::InvalidResponse {
            reason: format!("{status}: {message}"),
        },
    }
}

/// Map a non-success HTTP status to an error.
///
/// 401, 408, 429 and 5xx are decided by the status code alone. Otherwise an
/// API status in the body (e.g. `REQUEST_DENIED` sent with a 400) takes
/// precedence over the HTTP code.
fn classify_http_status(status: StatusCode, body: &str) -> PeakGridError {
    let snippet: String = body.chars().take(500).collect();
    let response = serde_json::from_str::<ElevationResponse>(body).ok();

    match status {
        StatusCode::UNAUTHORIZED => {
            return PeakGridError::Auth {
                message: response
                    .and_then(|r| r.error_message)
                    .unwrap_or(snippet),
            }
        }
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            return PeakGridError::TransientNetwork {
                reason: format!("HTTP {status}"),
            }
        }
        s if s.is_server_error() => {
            return PeakGridError::TransientNetwork {
                reason: format!("HTTP {status}"),
            }
        }
        _ => {}
    }

    match response {
        Some(r) if r.status != "OK" => classify_api_status(&r.status, r.error_message),
        r if status == StatusCode::FORBIDDEN => PeakGridError::QuotaOrPermission {
            status: status.to_string(),
            message: r.and_then(|r| r.error_message).unwrap_or(snippet),
        },
        _ => PeakGridError::InvalidResponse {
            reason: format!("HTTP {status}: {snippet}"),
        },
    }
}

/// Decode a response body into elevations, checking the API status and the
/// result count.
pub fn parse_response(body: &str, expected: usize) -> Result<Vec<f64>> {
    let response: ElevationResponse =
        serde_json::from_str(body).map_err(|e| PeakGridError::InvalidResponse {
            reason: format!("malformed JSON: {e}"),
        })?;

    if response.status != "OK" {
        return Err(classify_api_status(
            &response.status,
            response.error_message,
        ));
    }

    if response.results.len() != expected {
        return Err(PeakGridError::InvalidResponse {
            reason: format!(
                "requested {} locations, got {} results",
                expected,
                response.results.len()
            ),
        });
    }

    Ok(response.results.into_iter().map(|r| r.elevation).collect())
}

/// Client for the Google Elevation API.
pub struct GoogleElevationApi {
    client: Client,
    config: ApiConfig,
}

impl GoogleElevationApi {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PeakGridError::TransientNetwork {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// The endpoint requests go to.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

impl ElevationProvider for GoogleElevationApi {
    fn lookup(&self, locations: &[LatLon]) -> Result<Vec<f64>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("locations", format_locations(locations)),
                ("key", self.config.api_key.clone()),
            ])
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(classify_http_status(status, &body));
        }

        parse_response(&body, locations.len())
    }
}
