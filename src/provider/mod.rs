//! Flight-data provider access.
//!
//! The rest of the crate talks to the provider only through
//! [`FlightProvider`], which keeps the HTTP client swappable for a stub in
//! tests. [`AmadeusClient`] is the production implementation.

pub mod amadeus;
pub mod types;

pub use amadeus::{AmadeusClient, AmadeusConfig};

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::flights::requests::{AirportSearchRequest, CheapestDatesRequest, FlightSearchRequest};
use types::{AirlinesResponse, FlightDatesResponse, FlightOffersResponse, LocationsResponse};

/// A source of flight offers and travel reference data.
///
/// Implementations normalise their failures into [`ServiceError`] so that
/// retry classification works the same for every provider.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Display name of the provider (e.g. "Amadeus").
    fn name(&self) -> &'static str;

    /// Searches priced flight offers.
    async fn search_flight_offers(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<FlightOffersResponse, ServiceError>;

    /// Searches airports and cities by keyword.
    async fn search_locations(
        &self,
        request: &AirportSearchRequest,
    ) -> Result<LocationsResponse, ServiceError>;

    /// Looks airlines up by IATA or ICAO code.
    async fn lookup_airlines(&self, codes: &[String]) -> Result<AirlinesResponse, ServiceError>;

    /// Finds the cheapest travel dates on a route.
    async fn search_flight_dates(
        &self,
        request: &CheapestDatesRequest,
    ) -> Result<FlightDatesResponse, ServiceError>;
}
