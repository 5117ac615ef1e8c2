//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use flight_search_mcp::error::ServiceError;
use flight_search_mcp::flights::requests::{
    AirportSearchRequest, CheapestDatesRequest, FlightSearchRequest,
};
use flight_search_mcp::flights::FlightService;
use flight_search_mcp::mcp::server::{McpServer, ServerInfo};
use flight_search_mcp::provider::types::{
    AirlinesResponse, FlightDatesResponse, FlightOffersResponse, LocationsResponse,
};
use flight_search_mcp::provider::FlightProvider;
use flight_search_mcp::retry::RetryPolicy;

/// A one-segment offer LHR to JFK at `total` EUR.
pub fn offer(id: &str, total: &str) -> Value {
    json!({
        "id": id,
        "oneWay": false,
        "lastTicketingDate": "2025-01-10",
        "numberOfBookableSeats": 4,
        "validatingAirlineCodes": ["BA"],
        "itineraries": [{
            "duration": "PT7H55M",
            "segments": [{
                "departure": {"iataCode": "LHR", "terminal": "5", "at": "2025-01-15T08:00:00"},
                "arrival": {"iataCode": "JFK", "terminal": "7", "at": "2025-01-15T10:55:00"},
                "carrierCode": "BA",
                "number": "117",
                "aircraft": {"code": "777"},
                "duration": "PT7H55M"
            }]
        }],
        "price": {
            "currency": "EUR",
            "total": total,
            "base": total,
            "grandTotal": total,
            "fees": [{"amount": "0.00", "type": "SUPPLIER"}]
        },
        "travelerPricings": [{"travelerId": "1"}]
    })
}

/// A flight-offers body holding `offers`.
pub fn offers_body(offers: &[Value]) -> Value {
    json!({
        "data": offers,
        "dictionaries": {
            "carriers": {"BA": "BRITISH AIRWAYS"},
            "aircraft": {"777": "BOEING 777-200/300"}
        }
    })
}

/// Provider error with `status`.
pub fn provider_error(status: u16) -> ServiceError {
    ServiceError::Provider {
        status,
        code: Some("38189".to_string()),
        message: "stub failure".to_string(),
    }
}

/// In-memory provider with canned responses and call accounting.
#[derive(Default)]
pub struct StubProvider {
    offers: FlightOffersResponse,
    locations: LocationsResponse,
    airlines: AirlinesResponse,
    dates: FlightDatesResponse,
    failures: Mutex<VecDeque<ServiceError>>,
    calls: AtomicUsize,
    searches: Mutex<Vec<FlightSearchRequest>>,
}

impl StubProvider {
    /// A provider answering offer searches with `offers`.
    pub fn with_offers(offers: &[Value]) -> Self {
        Self {
            offers: serde_json::from_value(offers_body(offers)).unwrap(),
            ..Self::default()
        }
    }

    /// Sets the locations response.
    pub fn locations(mut self, body: Value) -> Self {
        self.locations = serde_json::from_value(body).unwrap();
        self
    }

    /// Sets the airlines response.
    pub fn airlines(mut self, body: Value) -> Self {
        self.airlines = serde_json::from_value(body).unwrap();
        self
    }

    /// Sets the flight-dates response.
    pub fn dates(mut self, body: Value) -> Self {
        self.dates = serde_json::from_value(body).unwrap();
        self
    }

    /// Makes the next calls fail with `errors`, in order.
    pub fn failing_with(self, errors: Vec<ServiceError>) -> Self {
        *self.failures.lock().unwrap() = errors.into();
        self
    }

    /// Total provider calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Flight searches received so far.
    pub fn searches(&self) -> Vec<FlightSearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    fn record(&self) -> Result<(), ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FlightProvider for StubProvider {
    fn name(&self) -> &'static str {
        "Stub"
    }

    async fn search_flight_offers(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<FlightOffersResponse, ServiceError> {
        self.searches.lock().unwrap().push(request.clone());
        self.record()?;
        Ok(self.offers.clone())
    }

    async fn search_locations(
        &self,
        _request: &AirportSearchRequest,
    ) -> Result<LocationsResponse, ServiceError> {
        self.record()?;
        Ok(self.locations.clone())
    }

    async fn lookup_airlines(&self, _codes: &[String]) -> Result<AirlinesResponse, ServiceError> {
        self.record()?;
        Ok(self.airlines.clone())
    }

    async fn search_flight_dates(
        &self,
        _request: &CheapestDatesRequest,
    ) -> Result<FlightDatesResponse, ServiceError> {
        self.record()?;
        Ok(self.dates.clone())
    }
}

/// A service over `provider` that retries 3 times without waiting.
pub fn service(provider: &Arc<StubProvider>) -> Arc<FlightService> {
    let provider: Arc<dyn FlightProvider> = Arc::clone(provider) as Arc<dyn FlightProvider>;
    Arc::new(FlightService::new(provider, RetryPolicy::immediate(3)))
}

/// A fresh, uninitialised server over `provider`.
pub fn server(provider: &Arc<StubProvider>) -> McpServer {
    McpServer::new(ServerInfo::default(), service(provider))
}

/// A server that has completed the initialize handshake.
pub async fn initialised_server(provider: &Arc<StubProvider>) -> McpServer {
    let mut server = server(provider);
    let reply = server
        .handle_line(
            &json!({
                "jsonrpc": "2.0",
                "id": 0,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-06-18",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0.0"}
                }
            })
            .to_string(),
        )
        .await;
    assert!(reply.is_some_and(|r| r.get("result").is_some()));
    let ack = server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    assert!(ack.is_none());
    server
}

/// Sends `tools/call` and returns the `result` object.
pub async fn call_tool(server: &mut McpServer, name: &str, arguments: Value) -> Value {
    let reply = server
        .handle_line(
            &json!({
                "jsonrpc": "2.0",
                "id": 42,
                "method": "tools/call",
                "params": {"name": name, "arguments": arguments}
            })
            .to_string(),
        )
        .await
        .unwrap();
    reply["result"].clone()
}

/// The text of the first content item of a tool result.
pub fn result_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap()
}

/// The JSON payload of a successful tool result.
pub fn result_json(result: &Value) -> Value {
    assert_ne!(result["isError"], true, "tool failed: {}", result_text(result));
    serde_json::from_str(result_text(result)).unwrap()
}
