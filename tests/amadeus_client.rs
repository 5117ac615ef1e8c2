//! Integration tests for the Amadeus client against a local mock provider.

mod helpers;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use flight_search_mcp::error::ServiceError;
use flight_search_mcp::flights::requests::{FlightSearchRequest, OfferLookupRequest};
use flight_search_mcp::flights::FlightService;
use flight_search_mcp::provider::{AmadeusClient, AmadeusConfig, FlightProvider};
use flight_search_mcp::retry::RetryPolicy;

use helpers::{offer, offers_body};

/// Scripted stand-in for the Amadeus endpoints.
#[derive(Default)]
struct MockAmadeus {
    token_calls: AtomicUsize,
    offer_calls: AtomicUsize,
    token_failure: Mutex<Option<(StatusCode, Value)>>,
    offer_failures: Mutex<VecDeque<(StatusCode, Value)>>,
    last_auth: Mutex<Option<String>>,
    last_query: Mutex<HashMap<String, String>>,
}

impl MockAmadeus {
    fn fail_offers(&self, status: StatusCode, body: Value) {
        self.offer_failures.lock().unwrap().push_back((status, body));
    }
}

async fn token(State(mock): State<Arc<MockAmadeus>>) -> (StatusCode, Json<Value>) {
    let n = mock.token_calls.fetch_add(1, Ordering::SeqCst) + 1;
    if let Some((status, body)) = mock.token_failure.lock().unwrap().clone() {
        return (status, Json(body));
    }
    (
        StatusCode::OK,
        Json(json!({
            "type": "amadeusOAuth2Token",
            "access_token": format!("tok-{n}"),
            "token_type": "Bearer",
            "expires_in": 1799,
            "state": "approved"
        })),
    )
}

async fn flight_offers(
    State(mock): State<Arc<MockAmadeus>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    mock.offer_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *mock.last_query.lock().unwrap() = query;

    if let Some((status, body)) = mock.offer_failures.lock().unwrap().pop_front() {
        return (status, Json(body));
    }
    (
        StatusCode::OK,
        Json(offers_body(&[offer("1", "500.00"), offer("2", "300.00")])),
    )
}

async fn airlines() -> Json<Value> {
    Json(json!({
        "data": [{"iataCode": "BA", "icaoCode": "BAW", "businessName": "BRITISH AIRWAYS"}]
    }))
}

/// Starts the mock on an ephemeral port and returns its base URL.
async fn start(mock: &Arc<MockAmadeus>) -> String {
    let app = Router::new()
        .route("/v1/security/oauth2/token", post(token))
        .route("/v2/shopping/flight-offers", get(flight_offers))
        .route("/v1/reference-data/airlines", get(airlines))
        .with_state(Arc::clone(mock));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, interval: Duration) -> AmadeusClient {
    AmadeusClient::new(AmadeusConfig {
        client_id: "test-id".to_string(),
        client_secret: "test-secret".to_string(),
        base_url: base_url.to_string(),
        min_request_interval: interval,
    })
    .unwrap()
}

fn search() -> FlightSearchRequest {
    FlightSearchRequest::from_arguments(&json!({
        "origin": "lhr",
        "destination": "JFK",
        "departureDate": "2025-01-15",
        "nonStop": true
    }))
    .unwrap()
}

#[tokio::test]
async fn test_token_is_cached_across_requests() {
    let mock = Arc::new(MockAmadeus::default());
    let client = client(&start(&mock).await, Duration::ZERO);

    let first = tokio_test::assert_ok!(client.search_flight_offers(&search()).await);
    tokio_test::assert_ok!(client.search_flight_offers(&search()).await);

    assert_eq!(first.data.len(), 2);
    assert_eq!(mock.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.offer_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        mock.last_auth.lock().unwrap().as_deref(),
        Some("Bearer tok-1")
    );
}

#[tokio::test]
async fn test_query_parameters_sent() {
    let mock = Arc::new(MockAmadeus::default());
    let client = client(&start(&mock).await, Duration::ZERO);

    tokio_test::assert_ok!(client.search_flight_offers(&search()).await);

    let query = mock.last_query.lock().unwrap().clone();
    assert_eq!(query["originLocationCode"], "LHR");
    assert_eq!(query["destinationLocationCode"], "JFK");
    assert_eq!(query["departureDate"], "2025-01-15");
    assert_eq!(query["adults"], "1");
    assert_eq!(query["nonStop"], "true");
    assert!(!query.contains_key("returnDate"));
}

#[tokio::test]
async fn test_error_body_mapped_to_provider_error() {
    let mock = Arc::new(MockAmadeus::default());
    mock.fail_offers(
        StatusCode::BAD_REQUEST,
        json!({
            "errors": [{
                "status": 400,
                "code": 477,
                "title": "INVALID FORMAT",
                "detail": "departureDate must be in the future"
            }]
        }),
    );
    let client = client(&start(&mock).await, Duration::ZERO);

    let err = tokio_test::assert_err!(client.search_flight_offers(&search()).await);
    match err {
        ServiceError::Provider {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code.as_deref(), Some("477"));
            assert_eq!(message, "INVALID FORMAT: departureDate must be in the future");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_without_body_uses_status_reason() {
    let mock = Arc::new(MockAmadeus::default());
    mock.fail_offers(StatusCode::SERVICE_UNAVAILABLE, json!({}));
    let client = client(&start(&mock).await, Duration::ZERO);

    let err = tokio_test::assert_err!(client.search_flight_offers(&search()).await);
    assert!(err.is_retryable());
    assert!(
        matches!(&err, ServiceError::Provider { status: 503, code: None, message } if message == "Service Unavailable"),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_unauthorized_forces_new_token() {
    let mock = Arc::new(MockAmadeus::default());
    mock.fail_offers(
        StatusCode::UNAUTHORIZED,
        json!({"errors": [{"code": 38190, "title": "Invalid access token"}]}),
    );
    let client = client(&start(&mock).await, Duration::ZERO);

    let err = tokio_test::assert_err!(client.search_flight_offers(&search()).await);
    assert!(!err.is_retryable());
    tokio_test::assert_ok!(client.search_flight_offers(&search()).await);

    assert_eq!(mock.token_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        mock.last_auth.lock().unwrap().as_deref(),
        Some("Bearer tok-2")
    );
}

#[tokio::test]
async fn test_token_failure_is_provider_error() {
    let mock = Arc::new(MockAmadeus::default());
    *mock.token_failure.lock().unwrap() = Some((
        StatusCode::UNAUTHORIZED,
        json!({"errors": [{"code": 38187, "title": "invalid_client", "detail": "Client credentials are invalid"}]}),
    ));
    let client = client(&start(&mock).await, Duration::ZERO);

    let err = tokio_test::assert_err!(client.search_flight_offers(&search()).await);
    assert!(matches!(err, ServiceError::Provider { status: 401, .. }), "{err:?}");
    assert_eq!(mock.offer_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_requests_are_spaced() {
    let mock = Arc::new(MockAmadeus::default());
    let client = client(&start(&mock).await, Duration::from_millis(50));

    let started = Instant::now();
    tokio_test::assert_ok!(client.lookup_airlines(&["BA".to_string()]).await);
    tokio_test::assert_ok!(client.lookup_airlines(&["BA".to_string()]).await);

    // token, then two lookups: two enforced gaps
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_service_retries_transient_provider_errors() {
    let mock = Arc::new(MockAmadeus::default());
    mock.fail_offers(StatusCode::SERVICE_UNAVAILABLE, json!({}));
    let provider = Arc::new(client(&start(&mock).await, Duration::ZERO));
    let service = FlightService::new(provider, RetryPolicy::immediate(3));

    let summary = tokio_test::assert_ok!(service.search_flights(&search()).await);
    assert_eq!(summary.total_offers, 2);
    assert_eq!(summary.offers[0].id, "2");
    assert_eq!(mock.offer_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_service_does_not_retry_client_errors() {
    let mock = Arc::new(MockAmadeus::default());
    mock.fail_offers(
        StatusCode::BAD_REQUEST,
        json!({"errors": [{"code": 4926, "title": "INVALID DATA RECEIVED"}]}),
    );
    let provider = Arc::new(client(&start(&mock).await, Duration::ZERO));
    let service = FlightService::new(provider, RetryPolicy::immediate(3));

    let err = tokio_test::assert_err!(service.search_flights(&search()).await);
    assert_eq!(err.code(), "PROVIDER_ERROR");
    assert_eq!(mock.offer_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_offer_details_through_provider() {
    let mock = Arc::new(MockAmadeus::default());
    let provider = Arc::new(client(&start(&mock).await, Duration::ZERO));
    let service = FlightService::new(provider, RetryPolicy::immediate(3));

    let request = OfferLookupRequest::from_arguments(&json!({
        "offerId": "2",
        "origin": "LHR",
        "destination": "JFK",
        "departureDate": "2025-01-15"
    }))
    .unwrap();

    let details = tokio_test::assert_ok!(service.offer_details(&request).await);
    assert_eq!(details.summary.id, "2");
    assert_eq!(details.summary.price.total, "300.00");
}
