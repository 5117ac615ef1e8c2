//! Flight operations: validated request in, formatted summary out.
//!
//! Each operation is one retry-wrapped provider call followed by a
//! formatter. Validation happens earlier, in [`requests`], so nothing here
//! ever sees unchecked arguments.

pub mod format;
pub mod requests;

use std::sync::Arc;

use tracing::debug;

use crate::error::ServiceError;
use crate::provider::FlightProvider;
use crate::retry::{with_retry, RetryPolicy};
use format::{
    AirlineLookupSummary, CheapestDatesSummary, FlightSearchSummary, LocationSearchSummary,
    OfferDetails,
};
use requests::{
    AirlineLookupRequest, AirportSearchRequest, CheapestDatesRequest, FlightSearchRequest,
    OfferLookupRequest,
};

/// The flight-search pipeline shared by every session.
#[derive(Clone)]
pub struct FlightService {
    provider: Arc<dyn FlightProvider>,
    retry: RetryPolicy,
}

impl FlightService {
    /// Creates a service over `provider`.
    pub fn new(provider: Arc<dyn FlightProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    /// Name of the underlying provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Searches offers and returns the cheapest ones.
    ///
    /// # Errors
    ///
    /// Returns the provider error once retries are exhausted.
    pub async fn search_flights(
        &self,
        request: &FlightSearchRequest,
    ) -> Result<FlightSearchSummary, ServiceError> {
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            "Searching flights"
        );
        let response = with_retry(&self.retry, "search_flights", || {
            self.provider.search_flight_offers(request)
        })
        .await?;
        Ok(format::format_flight_offers(
            &response.data,
            &response.dictionaries,
        ))
    }

    /// Searches airports and cities.
    ///
    /// # Errors
    ///
    /// Returns the provider error once retries are exhausted.
    pub async fn search_airports(
        &self,
        request: &AirportSearchRequest,
    ) -> Result<LocationSearchSummary, ServiceError> {
        debug!(keyword = %request.keyword, "Searching locations");
        let response = with_retry(&self.retry, "search_airports", || {
            self.provider.search_locations(request)
        })
        .await?;
        Ok(format::format_locations(&response.data))
    }

    /// Looks airlines up by code.
    ///
    /// # Errors
    ///
    /// Returns the provider error once retries are exhausted.
    pub async fn airline_info(
        &self,
        request: &AirlineLookupRequest,
    ) -> Result<AirlineLookupSummary, ServiceError> {
        debug!(codes = ?request.airline_codes, "Looking up airlines");
        let response = with_retry(&self.retry, "get_airline_info", || {
            self.provider.lookup_airlines(&request.airline_codes)
        })
        .await?;
        Ok(format::format_airlines(
            &response.data,
            &request.airline_codes,
        ))
    }

    /// Finds the cheapest dates on a route.
    ///
    /// # Errors
    ///
    /// Returns the provider error once retries are exhausted.
    pub async fn cheapest_dates(
        &self,
        request: &CheapestDatesRequest,
    ) -> Result<CheapestDatesSummary, ServiceError> {
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            "Searching cheapest dates"
        );
        let response = with_retry(&self.retry, "find_cheapest_dates", || {
            self.provider.search_flight_dates(request)
        })
        .await?;
        Ok(format::format_flight_dates(&response.data))
    }

    /// Re-runs the original search and returns the offer with the given ID.
    ///
    /// # Errors
    ///
    /// Returns the provider error once retries are exhausted, or
    /// [`ServiceError::Unknown`] when the ID is not in the fresh results.
    pub async fn offer_details(
        &self,
        request: &OfferLookupRequest,
    ) -> Result<OfferDetails, ServiceError> {
        debug!(offer_id = %request.offer_id, "Looking up flight offer");
        let response = with_retry(&self.retry, "get_flight_offer_details", || {
            self.provider.search_flight_offers(&request.search)
        })
        .await?;

        let offer = response
            .data
            .iter()
            .find(|offer| offer.id == request.offer_id)
            .ok_or_else(|| {
                ServiceError::unknown(format!(
                    "offer '{}' not found in current results for {} to {}; offers change \
                     frequently, run search_flights again",
                    request.offer_id, request.search.origin, request.search.destination
                ))
            })?;

        Ok(format::format_offer_details(offer, &response.dictionaries))
    }
}

impl std::fmt::Debug for FlightService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightService")
            .field("provider", &self.provider.name())
            .field("retry", &self.retry)
            .finish()
    }
}
