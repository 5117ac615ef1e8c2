//! Typed, validated tool arguments.
//!
//! Each request is built once from the raw `tools/call` arguments through
//! [`Validator`], is immutable afterwards, and is dropped when the call ends.

use chrono::NaiveDate;
use serde_json::Value;

use crate::validation::{Presence, ValidationErrors, Validator, DATE_FORMAT};

/// Most seated travelers (adults + children) one search may carry.
pub const MAX_SEATED_TRAVELERS: u8 = 9;

/// Cabin class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelClass {
    /// Economy.
    Economy,
    /// Premium economy.
    PremiumEconomy,
    /// Business.
    Business,
    /// First.
    First,
}

impl TravelClass {
    /// Wire names, also used as the enum in the tool schema.
    pub const NAMES: [&'static str; 4] = ["ECONOMY", "PREMIUM_ECONOMY", "BUSINESS", "FIRST"];

    /// The provider's spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "ECONOMY",
            Self::PremiumEconomy => "PREMIUM_ECONOMY",
            Self::Business => "BUSINESS",
            Self::First => "FIRST",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ECONOMY" => Some(Self::Economy),
            "PREMIUM_ECONOMY" => Some(Self::PremiumEconomy),
            "BUSINESS" => Some(Self::Business),
            "FIRST" => Some(Self::First),
            _ => None,
        }
    }
}

/// Arguments of `search_flights`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSearchRequest {
    /// Origin IATA code, upper case.
    pub origin: String,
    /// Destination IATA code, upper case.
    pub destination: String,
    /// Outbound date.
    pub departure_date: NaiveDate,
    /// Return date; strictly after `departure_date`.
    pub return_date: Option<NaiveDate>,
    /// Adults (12+).
    pub adults: u8,
    /// Children (2-11).
    pub children: u8,
    /// Infants on lap (under 2).
    pub infants: u8,
    /// Cabin restriction.
    pub travel_class: Option<TravelClass>,
    /// Only direct flights.
    pub non_stop: bool,
    /// Preferred currency.
    pub currency_code: Option<String>,
    /// Price ceiling per traveler.
    pub max_price: Option<u32>,
    /// How many offers to ask the provider for.
    pub max_results: u16,
}

impl FlightSearchRequest {
    /// Validates `search_flights` arguments.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new(arguments);
        let request = Self::collect(&mut v);
        match request {
            Some(request) => v.finish().map(|()| request),
            None => Err(v.into_errors()),
        }
    }

    /// Applies the search rules, leaving violations in `v`.
    ///
    /// Returns `None` when a required field could not be produced.
    fn collect(v: &mut Validator<'_>) -> Option<Self> {
        let origin = v.airport_code("origin", Presence::Required);
        let destination = v.airport_code("destination", Presence::Required);
        let departure_date = v.date("departureDate", Presence::Required);
        let return_date = v.date("returnDate", Presence::Optional);
        let adults = v.integer("adults", 1..=9, Some(1));
        let children = v.integer("children", 0..=9, Some(0));
        let infants = v.integer("infants", 0..=9, Some(0));
        let travel_class = v
            .one_of("travelClass", &TravelClass::NAMES, None)
            .and_then(TravelClass::from_name);
        let non_stop = v.boolean("nonStop", false);
        let currency_code = v.letter_code("currencyCode", Presence::Optional, 3);
        let max_price = v.positive_integer("maxPrice");
        let max_results = v.integer("max", 1..=250, Some(50));

        if let (Some(origin), Some(destination)) = (&origin, &destination) {
            v.check(
                origin != destination,
                "destination",
                "must differ from origin",
            );
        }
        if let (Some(departure), Some(ret)) = (departure_date, return_date) {
            v.check(
                ret > departure,
                "returnDate",
                "must be after departureDate",
            );
        }
        if let (Some(adults), Some(children), Some(infants)) = (adults, children, infants) {
            v.check(
                infants <= adults,
                "infants",
                "cannot exceed the number of adults",
            );
            v.check(
                adults + children <= i64::from(MAX_SEATED_TRAVELERS),
                "children",
                "adults plus children cannot exceed 9",
            );
        }

        Some(Self {
            origin: origin?,
            destination: destination?,
            departure_date: departure_date?,
            return_date,
            adults: u8::try_from(adults?).ok()?,
            children: u8::try_from(children?).ok()?,
            infants: u8::try_from(infants?).ok()?,
            travel_class,
            non_stop,
            currency_code,
            max_price,
            max_results: u16::try_from(max_results?).ok()?,
        })
    }

    /// Provider query string for this search.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originLocationCode", self.origin.clone()),
            ("destinationLocationCode", self.destination.clone()),
            (
                "departureDate",
                self.departure_date.format(DATE_FORMAT).to_string(),
            ),
            ("adults", self.adults.to_string()),
        ];
        if let Some(ret) = self.return_date {
            params.push(("returnDate", ret.format(DATE_FORMAT).to_string()));
        }
        if self.children > 0 {
            params.push(("children", self.children.to_string()));
        }
        if self.infants > 0 {
            params.push(("infants", self.infants.to_string()));
        }
        if let Some(class) = self.travel_class {
            params.push(("travelClass", class.as_str().to_string()));
        }
        if self.non_stop {
            params.push(("nonStop", "true".to_string()));
        }
        if let Some(currency) = &self.currency_code {
            params.push(("currencyCode", currency.clone()));
        }
        if let Some(max_price) = self.max_price {
            params.push(("maxPrice", max_price.to_string()));
        }
        params.push(("max", self.max_results.to_string()));
        params
    }
}

/// Which kinds of location an airport search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Airports only.
    Airport,
    /// Cities only.
    City,
    /// Both.
    Any,
}

impl LocationKind {
    /// Names accepted in the `subType` argument.
    pub const NAMES: [&'static str; 3] = ["AIRPORT", "CITY", "ANY"];

    /// Provider `subType` value.
    #[must_use]
    pub const fn provider_sub_type(self) -> &'static str {
        match self {
            Self::Airport => "AIRPORT",
            Self::City => "CITY",
            Self::Any => "AIRPORT,CITY",
        }
    }
}

/// Arguments of `search_airports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportSearchRequest {
    /// Name fragment or code.
    pub keyword: String,
    /// Location kinds to return.
    pub kind: LocationKind,
    /// ISO 3166-1 alpha-2 country filter.
    pub country_code: Option<String>,
    /// Page size requested from the provider.
    pub max_results: u8,
}

impl AirportSearchRequest {
    /// Validates `search_airports` arguments.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new(arguments);
        let keyword = v.string("keyword", Presence::Required, 1..=50);
        let kind = match v.one_of("subType", &LocationKind::NAMES, Some("ANY")) {
            Some("AIRPORT") => LocationKind::Airport,
            Some("CITY") => LocationKind::City,
            _ => LocationKind::Any,
        };
        let country_code = v.letter_code("countryCode", Presence::Optional, 2);
        let max_results = v.integer("max", 1..=50, Some(10));

        let (Some(keyword), Some(max_results)) = (keyword, max_results) else {
            return Err(v.into_errors());
        };
        v.finish()?;
        Ok(Self {
            keyword,
            kind,
            country_code,
            max_results: u8::try_from(max_results).unwrap_or(10),
        })
    }

    /// Provider query string for this search.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("keyword", self.keyword.clone()),
            ("subType", self.kind.provider_sub_type().to_string()),
            ("page[limit]", self.max_results.to_string()),
            ("view", "LIGHT".to_string()),
        ];
        if let Some(country) = &self.country_code {
            params.push(("countryCode", country.clone()));
        }
        params
    }
}

/// Arguments of `get_airline_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirlineLookupRequest {
    /// IATA (2-char) or ICAO (3-char) codes, upper case, deduplicated.
    pub airline_codes: Vec<String>,
}

impl AirlineLookupRequest {
    /// Validates `get_airline_info` arguments.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new(arguments);
        let codes = v.string_list("airlineCodes", Presence::Required, 1..=20);

        let mut airline_codes: Vec<String> = Vec::new();
        if let Some(codes) = codes {
            let malformed: Vec<&String> = codes
                .iter()
                .filter(|c| {
                    !(2..=3).contains(&c.len()) || !c.chars().all(|ch| ch.is_ascii_alphanumeric())
                })
                .collect();
            v.check(
                malformed.is_empty(),
                "airlineCodes",
                "each code must be 2 (IATA) or 3 (ICAO) letters or digits",
            );
            for code in codes {
                let code = code.to_ascii_uppercase();
                if !airline_codes.contains(&code) {
                    airline_codes.push(code);
                }
            }
        }

        v.finish()?;
        Ok(Self { airline_codes })
    }
}

/// Arguments of `find_cheapest_dates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheapestDatesRequest {
    /// Origin IATA code.
    pub origin: String,
    /// Destination IATA code.
    pub destination: String,
    /// Departure date to centre the search on.
    pub departure_date: Option<NaiveDate>,
    /// One-way fares instead of round trips.
    pub one_way: bool,
    /// Only direct flights.
    pub non_stop: bool,
    /// Price ceiling.
    pub max_price: Option<u32>,
}

impl CheapestDatesRequest {
    /// Validates `find_cheapest_dates` arguments.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new(arguments);
        let origin = v.airport_code("origin", Presence::Required);
        let destination = v.airport_code("destination", Presence::Required);
        let departure_date = v.date("departureDate", Presence::Optional);
        let one_way = v.boolean("oneWay", false);
        let non_stop = v.boolean("nonStop", false);
        let max_price = v.positive_integer("maxPrice");

        let (Some(origin), Some(destination)) = (origin, destination) else {
            return Err(v.into_errors());
        };
        v.check(
            origin != destination,
            "destination",
            "must differ from origin",
        );
        v.finish()?;
        Ok(Self {
            origin,
            destination,
            departure_date,
            one_way,
            non_stop,
            max_price,
        })
    }

    /// Provider query string for this search.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origin", self.origin.clone()),
            ("destination", self.destination.clone()),
            ("oneWay", self.one_way.to_string()),
            ("nonStop", self.non_stop.to_string()),
        ];
        if let Some(date) = self.departure_date {
            params.push(("departureDate", date.format(DATE_FORMAT).to_string()));
        }
        if let Some(max_price) = self.max_price {
            params.push(("maxPrice", max_price.to_string()));
        }
        params
    }
}

/// Arguments of `get_flight_offer_details`: an offer ID plus the search it
/// came from. The provider cannot look offers up by ID, so the search is
/// re-run and filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferLookupRequest {
    /// Offer ID from a previous `search_flights` result.
    pub offer_id: String,
    /// The original search.
    pub search: FlightSearchRequest,
}

impl OfferLookupRequest {
    /// Validates `get_flight_offer_details` arguments.
    ///
    /// # Errors
    ///
    /// Returns every violated rule.
    pub fn from_arguments(arguments: &Value) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new(arguments);
        let offer_id = v.string("offerId", Presence::Required, 1..=64);
        let search = FlightSearchRequest::collect(&mut v);

        let (Some(offer_id), Some(search)) = (offer_id, search) else {
            return Err(v.into_errors());
        };
        v.finish()?;
        Ok(Self { offer_id, search })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search(args: &Value) -> Result<FlightSearchRequest, ValidationErrors> {
        FlightSearchRequest::from_arguments(args)
    }

    #[test]
    fn minimal_search_gets_defaults() {
        let req = search(&json!({
            "origin": "lhr",
            "destination": "JFK",
            "departureDate": "2025-01-15"
        }))
        .unwrap();
        assert_eq!(req.origin, "LHR");
        assert_eq!(req.adults, 1);
        assert_eq!(req.children, 0);
        assert_eq!(req.max_results, 50);
        assert!(!req.non_stop);
        assert_eq!(req.return_date, None);
    }

    #[test]
    fn wrong_length_airport_code_fails() {
        let errors = search(&json!({
            "origin": "LHRX",
            "destination": "JFK",
            "departureDate": "2025-01-15"
        }))
        .unwrap_err();
        assert!(errors.has_field("origin"));
    }

    #[test]
    fn malformed_date_fails() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-1-15"
        }))
        .unwrap_err();
        assert!(errors.has_field("departureDate"));
    }

    #[test]
    fn return_must_follow_departure() {
        for ret in ["2025-01-15", "2025-01-14"] {
            let errors = search(&json!({
                "origin": "LHR",
                "destination": "JFK",
                "departureDate": "2025-01-15",
                "returnDate": ret
            }))
            .unwrap_err();
            assert!(errors.has_field("returnDate"), "return {ret} accepted");
        }
    }

    #[test]
    fn passenger_counts_out_of_range_fail() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15",
            "adults": 10,
            "children": -1
        }))
        .unwrap_err();
        let adults = errors
            .violations()
            .iter()
            .find(|v| v.field == "adults")
            .unwrap();
        assert_eq!(adults.message, "must be between 1 and 9");
        assert!(errors.has_field("children"));
    }

    #[test]
    fn children_without_adults_fail() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15",
            "adults": 0,
            "children": 2
        }))
        .unwrap_err();
        let adults: Vec<_> = errors
            .violations()
            .iter()
            .filter(|v| v.field == "adults")
            .collect();
        assert_eq!(adults.len(), 1);
        assert_eq!(adults[0].message, "must be between 1 and 9");
    }

    #[test]
    fn zero_adults_alone_fails() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15",
            "adults": 0
        }))
        .unwrap_err();
        assert!(errors.has_field("adults"));
    }

    #[test]
    fn infants_cannot_outnumber_adults() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15",
            "adults": 1,
            "infants": 2
        }))
        .unwrap_err();
        assert!(errors.has_field("infants"));
    }

    #[test]
    fn same_origin_and_destination_fail() {
        let errors = search(&json!({
            "origin": "LHR",
            "destination": "lhr",
            "departureDate": "2025-01-15"
        }))
        .unwrap_err();
        assert!(errors.has_field("destination"));
    }

    #[test]
    fn query_params_include_optional_filters() {
        let req = search(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15",
            "returnDate": "2025-01-22",
            "adults": 2,
            "children": 1,
            "travelClass": "business",
            "nonStop": true,
            "currencyCode": "gbp",
            "maxPrice": 900
        }))
        .unwrap();
        let params = req.query_params();
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("originLocationCode"), Some("LHR"));
        assert_eq!(get("returnDate"), Some("2025-01-22"));
        assert_eq!(get("travelClass"), Some("BUSINESS"));
        assert_eq!(get("nonStop"), Some("true"));
        assert_eq!(get("currencyCode"), Some("GBP"));
        assert_eq!(get("maxPrice"), Some("900"));
        assert_eq!(get("infants"), None);
    }

    #[test]
    fn airport_search_defaults() {
        let req = AirportSearchRequest::from_arguments(&json!({"keyword": " London "})).unwrap();
        assert_eq!(req.keyword, "London");
        assert_eq!(req.kind, LocationKind::Any);
        assert_eq!(req.max_results, 10);
        assert_eq!(req.kind.provider_sub_type(), "AIRPORT,CITY");
    }

    #[test]
    fn airport_search_requires_keyword() {
        let errors = AirportSearchRequest::from_arguments(&json!({"keyword": "  "})).unwrap_err();
        assert!(errors.has_field("keyword"));
    }

    #[test]
    fn airline_codes_from_string_or_array() {
        let a = AirlineLookupRequest::from_arguments(&json!({"airlineCodes": "ba, baw, ba"}))
            .unwrap();
        assert_eq!(a.airline_codes, vec!["BA".to_string(), "BAW".to_string()]);

        let b = AirlineLookupRequest::from_arguments(&json!({"airlineCodes": ["LH"]})).unwrap();
        assert_eq!(b.airline_codes, vec!["LH".to_string()]);
    }

    #[test]
    fn airline_codes_reject_bad_lengths() {
        let errors =
            AirlineLookupRequest::from_arguments(&json!({"airlineCodes": ["BRITISH"]}))
                .unwrap_err();
        assert!(errors.has_field("airlineCodes"));
    }

    #[test]
    fn cheapest_dates_validates_route() {
        let errors =
            CheapestDatesRequest::from_arguments(&json!({"origin": "MAD"})).unwrap_err();
        assert!(errors.has_field("destination"));

        let ok = CheapestDatesRequest::from_arguments(&json!({
            "origin": "MAD",
            "destination": "MUC",
            "oneWay": true
        }))
        .unwrap();
        assert!(ok.one_way);
        assert_eq!(ok.departure_date, None);
    }

    #[test]
    fn offer_lookup_needs_id_and_search() {
        let errors = OfferLookupRequest::from_arguments(&json!({
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15"
        }))
        .unwrap_err();
        assert!(errors.has_field("offerId"));

        let ok = OfferLookupRequest::from_arguments(&json!({
            "offerId": "3",
            "origin": "LHR",
            "destination": "JFK",
            "departureDate": "2025-01-15"
        }))
        .unwrap();
        assert_eq!(ok.offer_id, "3");
        assert_eq!(ok.search.destination, "JFK");
    }
}
