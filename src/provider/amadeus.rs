//! Amadeus Self-Service API client.
//!
//! Authentication is OAuth2 client-credentials; the bearer token is cached
//! and refreshed shortly before it expires. Consecutive requests are spaced
//! by the configured rate-limit hint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::types::{
    AirlinesResponse, ErrorResponse, FlightDatesResponse, FlightOffersResponse, LocationsResponse,
    TokenResponse,
};
use super::FlightProvider;
use crate::error::ServiceError;
use crate::flights::requests::{AirportSearchRequest, CheapestDatesRequest, FlightSearchRequest};

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Refresh tokens this long before the provider says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const LOCATIONS_PATH: &str = "/v1/reference-data/locations";
const AIRLINES_PATH: &str = "/v1/reference-data/airlines";
const FLIGHT_DATES_PATH: &str = "/v1/shopping/flight-dates";

/// Connection settings for [`AmadeusClient`].
#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    /// API key.
    pub client_id: String,
    /// API secret.
    pub client_secret: String,
    /// Scheme and host, without trailing slash.
    pub base_url: String,
    /// Minimum spacing between consecutive requests.
    pub min_request_interval: Duration,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// HTTP client for the Amadeus travel APIs.
pub struct AmadeusClient {
    http: HttpClient,
    config: AmadeusConfig,
    token: Mutex<Option<CachedToken>>,
    last_request: Mutex<Option<Instant>>,
}

impl AmadeusClient {
    /// Builds a client. No request is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(mut config: AmadeusConfig) -> Result<Self, ServiceError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::unknown(format!("failed to build HTTP client: {e}")))?;

        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
            last_request: Mutex::new(None),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Waits until the rate-limit spacing since the previous request has passed.
    async fn throttle(&self) {
        let interval = self.config.min_request_interval;
        if interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Returns a valid bearer token, fetching a new one when needed.
    async fn access_token(&self) -> Result<String, ServiceError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting provider access token");
        self.throttle().await;
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let token: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Authenticated GET returning a decoded JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, ServiceError> {
        let token = self.access_token().await?;
        self.throttle().await;

        debug!(path, params = query.len(), "Calling provider");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // token revoked or expired early; fetch a fresh one next time
            *self.token.lock().await = None;
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Turns a non-2xx response into a [`ServiceError::Provider`].
async fn error_from_response(response: Response) -> ServiceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<ErrorResponse> = serde_json::from_str(&body).ok();
    let first = parsed.and_then(|p| p.errors.into_iter().next());

    let code = first.as_ref().and_then(|e| e.code.as_ref()).map(|code| match code {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    });
    let message = first
        .and_then(|e| match (e.title, e.detail) {
            (Some(title), Some(detail)) => Some(format!("{title}: {detail}")),
            (title, detail) => detail.or(title),
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });

    ServiceError::Provider {
        status: status.as_u16(),
        code,
        message,
    }
}

#[async_trait]
impl FlightProvider for AmadeusClient {
    fn name(&self) -> &'static str {
        "Amadeus"
    }

    async fn search_flight_offers(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<FlightOffersResponse, ServiceError> {
        self.get_json(FLIGHT_OFFERS_PATH, &request.query_params())
            .await
    }

    async fn search_locations(
        &self,
        request: &AirportSearchRequest,
    ) -> Result<LocationsResponse, ServiceError> {
        self.get_json(LOCATIONS_PATH, &request.query_params()).await
    }

    async fn lookup_airlines(&self, codes: &[String]) -> Result<AirlinesResponse, ServiceError> {
        self.get_json(AIRLINES_PATH, &[("airlineCodes", codes.join(","))])
            .await
    }

    async fn search_flight_dates(
        &self,
        request: &CheapestDatesRequest,
    ) -> Result<FlightDatesResponse, ServiceError> {
        self.get_json(FLIGHT_DATES_PATH, &request.query_params())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> AmadeusConfig {
        AmadeusConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            base_url: base_url.to_string(),
            min_request_interval: Duration::ZERO,
        }
    }

    #[test]
    fn client_creation() {
        let client = AmadeusClient::new(config("https://test.api.amadeus.com"));
        assert!(client.is_ok());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = AmadeusClient::new(config("https://test.api.amadeus.com//")).unwrap();
        assert_eq!(client.base_url(), "https://test.api.amadeus.com");
        assert_eq!(
            client.url(FLIGHT_OFFERS_PATH),
            "https://test.api.amadeus.com/v2/shopping/flight-offers"
        );
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let client = AmadeusClient::new(config("http://127.0.0.1:9")).unwrap();
        let err = client.lookup_airlines(&["BA".to_string()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Network { .. }), "{err:?}");
        assert!(err.is_retryable());
    }
}
