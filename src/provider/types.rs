//! Provider payloads as they arrive on the wire.
//!
//! Only the fields the formatter reads are modelled; everything is
//! `#[serde(default)]` so a sparse or evolving payload still decodes.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// `GET /v2/shopping/flight-offers` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightOffersResponse {
    /// The offers, in provider order.
    pub data: Vec<FlightOffer>,
    /// Code-to-name lookups shared by all offers.
    pub dictionaries: Dictionaries,
}

/// Reference dictionaries attached to a search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dictionaries {
    /// Carrier code to carrier name.
    pub carriers: HashMap<String, String>,
    /// Aircraft code to aircraft name.
    pub aircraft: HashMap<String, String>,
}

/// A priced, bookable itinerary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightOffer {
    /// Offer ID, unique within one search response.
    pub id: String,
    /// Whether the offer is one-way.
    pub one_way: bool,
    /// Last date the offer can be ticketed (YYYY-MM-DD).
    pub last_ticketing_date: Option<String>,
    /// Seats still bookable at this price.
    pub number_of_bookable_seats: Option<u32>,
    /// Outbound (and return) journeys.
    pub itineraries: Vec<Itinerary>,
    /// Price summary.
    pub price: Price,
    /// Airlines that validate the ticket.
    pub validating_airline_codes: Vec<String>,
    /// Per-traveler price breakdown, kept opaque.
    pub traveler_pricings: Vec<Value>,
}

/// One journey (outbound or return).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Itinerary {
    /// ISO-8601 duration, e.g. `PT7H55M`.
    pub duration: Option<String>,
    /// Flight legs.
    pub segments: Vec<Segment>,
}

/// One flight leg.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Segment {
    /// Where the leg departs.
    pub departure: FlightEndpoint,
    /// Where the leg lands.
    pub arrival: FlightEndpoint,
    /// Marketing carrier code.
    pub carrier_code: String,
    /// Flight number (without carrier prefix).
    pub number: String,
    /// Equipment.
    pub aircraft: Option<Aircraft>,
    /// ISO-8601 duration.
    pub duration: Option<String>,
    /// Technical stops on this leg.
    pub number_of_stops: u32,
}

/// Departure or arrival point of a leg.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightEndpoint {
    /// IATA airport code.
    pub iata_code: String,
    /// Terminal, when known.
    pub terminal: Option<String>,
    /// Local date-time, e.g. `2025-01-15T08:00:00`.
    pub at: String,
}

/// Aircraft reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Aircraft {
    /// Aircraft code, resolved through [`Dictionaries::aircraft`].
    pub code: String,
}

/// Price of an offer. Amounts are decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Price {
    /// ISO currency code.
    pub currency: String,
    /// Total price.
    pub total: String,
    /// Base fare.
    pub base: Option<String>,
    /// Grand total including fees.
    pub grand_total: Option<String>,
    /// Fee lines.
    pub fees: Vec<Fee>,
}

/// A fee line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fee {
    /// Decimal amount.
    pub amount: String,
    /// Fee kind (e.g. `SUPPLIER`, `TICKETING`).
    #[serde(rename = "type")]
    pub kind: String,
}

/// `GET /v1/reference-data/locations` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationsResponse {
    /// Matching locations.
    pub data: Vec<Location>,
}

/// An airport or city.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    /// `AIRPORT` or `CITY`.
    pub sub_type: String,
    /// Display name.
    pub name: String,
    /// Long name with city/country prefix.
    pub detailed_name: Option<String>,
    /// IATA code.
    pub iata_code: String,
    /// UTC offset, e.g. `+01:00`.
    pub time_zone_offset: Option<String>,
    /// Postal details.
    pub address: Address,
}

/// City/country details of a location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    /// City name.
    pub city_name: Option<String>,
    /// City IATA code.
    pub city_code: Option<String>,
    /// Country name.
    pub country_name: Option<String>,
    /// ISO country code.
    pub country_code: Option<String>,
}

/// `GET /v1/reference-data/airlines` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirlinesResponse {
    /// Matching airlines.
    pub data: Vec<Airline>,
}

/// Airline reference data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Airline {
    /// 2-character IATA code.
    pub iata_code: Option<String>,
    /// 3-character ICAO code.
    pub icao_code: Option<String>,
    /// Registered business name.
    pub business_name: Option<String>,
    /// Everyday name.
    pub common_name: Option<String>,
}

/// `GET /v1/shopping/flight-dates` response body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightDatesResponse {
    /// Cheapest fare per date (pair).
    pub data: Vec<FlightDate>,
}

/// Cheapest fare found for a departure (and return) date.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightDate {
    /// Origin IATA code.
    pub origin: String,
    /// Destination IATA code.
    pub destination: String,
    /// Departure date.
    pub departure_date: String,
    /// Return date for round trips.
    pub return_date: Option<String>,
    /// Fare.
    pub price: FlightDatePrice,
}

/// Fare of a [`FlightDate`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FlightDatePrice {
    /// Decimal total.
    pub total: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    /// Error entries; the first one is reported.
    pub errors: Vec<ErrorEntry>,
}

/// One provider error entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorEntry {
    /// Vendor error code (numeric on the wire, sometimes a string).
    pub code: Option<Value>,
    /// Short title.
    pub title: Option<String>,
    /// Longer explanation.
    pub detail: Option<String>,
}

/// OAuth2 token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}
