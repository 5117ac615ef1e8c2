//! Response shaping.
//!
//! Provider payloads are large; clients get a reduced projection. Offer and
//! fare lists are sorted by ascending numeric price and capped at
//! [`MAX_RESULTS`] entries, and always report the pre-cap total alongside.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::provider::types::{
    Airline, Dictionaries, FlightDate, FlightOffer, Itinerary, Location, Segment,
};

/// Maximum entries in any formatted list.
pub const MAX_RESULTS: usize = 10;

/// Formatted `search_flights` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchSummary {
    /// Offers returned by the provider, before capping.
    pub total_offers: usize,
    /// Offers included below.
    pub showing: usize,
    /// Cheapest offers first.
    pub offers: Vec<OfferSummary>,
}

/// Display projection of one offer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSummary {
    /// Provider offer ID.
    pub id: String,
    /// Total price.
    pub price: PriceSummary,
    /// Seats left at this price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookable_seats: Option<u32>,
    /// Ticketing airline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validating_airline: Option<String>,
    /// Outbound first, then return.
    pub itineraries: Vec<ItinerarySummary>,
}

/// Price with its currency.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSummary {
    /// Decimal total, as the provider sent it.
    pub total: String,
    /// ISO currency code.
    pub currency: String,
}

/// One journey of an offer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySummary {
    /// `outbound` or `return`.
    pub direction: &'static str,
    /// Human-readable duration (e.g. `7h 55m`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Connections plus technical stops.
    pub stops: usize,
    /// Legs in flying order.
    pub segments: Vec<SegmentSummary>,
}

/// One leg of a journey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    /// Departure airport.
    pub from: String,
    /// Departure terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_terminal: Option<String>,
    /// Local departure time.
    pub departure: String,
    /// Arrival airport.
    pub to: String,
    /// Arrival terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_terminal: Option<String>,
    /// Local arrival time.
    pub arrival: String,
    /// Carrier code.
    pub carrier: String,
    /// Carrier name from the response dictionaries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    /// Carrier code plus number, e.g. `BA117`.
    pub flight_number: String,
    /// Aircraft name (or code when unknown).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    /// Human-readable duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Formatted `get_flight_offer_details` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDetails {
    /// Everything the search summary shows.
    #[serde(flatten)]
    pub summary: OfferSummary,
    /// Whether the offer is one-way.
    pub one_way: bool,
    /// Last date the offer can be ticketed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ticketing_date: Option<String>,
    /// Number of travelers priced.
    pub traveler_count: usize,
    /// Base, fees and grand total.
    pub price_breakdown: PriceBreakdown,
}

/// Price components.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Base fare.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Fee lines with a non-zero amount.
    pub fees: Vec<FeeSummary>,
    /// Grand total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<String>,
    /// ISO currency code.
    pub currency: String,
}

/// One fee line.
#[derive(Debug, Clone, Serialize)]
pub struct FeeSummary {
    /// Fee kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Decimal amount.
    pub amount: String,
}

/// Formatted `search_airports` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchSummary {
    /// Locations returned by the provider.
    pub total_results: usize,
    /// Locations included below.
    pub showing: usize,
    /// Locations in provider relevance order.
    pub locations: Vec<LocationSummary>,
}

/// Display projection of an airport or city.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    /// IATA code.
    pub code: String,
    /// Name.
    pub name: String,
    /// `AIRPORT` or `CITY`.
    #[serde(rename = "type")]
    pub kind: String,
    /// City name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Country name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// ISO country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// UTC offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_offset: Option<String>,
}

/// Formatted `get_airline_info` result.
#[derive(Debug, Clone, Serialize)]
pub struct AirlineLookupSummary {
    /// Airlines found.
    pub airlines: Vec<AirlineSummary>,
    /// Requested codes the provider did not know.
    #[serde(rename = "notFound", skip_serializing_if = "Vec::is_empty")]
    pub not_found: Vec<String>,
}

/// Display projection of an airline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineSummary {
    /// IATA code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
    /// ICAO code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao_code: Option<String>,
    /// Best available name.
    pub name: String,
    /// Registered business name, when it differs from `name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// Formatted `find_cheapest_dates` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheapestDatesSummary {
    /// Date options returned by the provider.
    pub total_results: usize,
    /// Options included below.
    pub showing: usize,
    /// Cheapest first.
    pub dates: Vec<DateFareSummary>,
}

/// Cheapest fare for one date (pair).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFareSummary {
    /// Origin IATA code.
    pub origin: String,
    /// Destination IATA code.
    pub destination: String,
    /// Departure date.
    pub departure_date: String,
    /// Return date for round trips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    /// Decimal total.
    pub price: String,
}

/// Parses a provider decimal amount. Unparseable or non-finite amounts yield `None`.
#[must_use]
pub fn parse_amount(amount: &str) -> Option<f64> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Ascending by amount; unparseable amounts go last.
fn compare_amounts(a: &str, b: &str) -> Ordering {
    match (parse_amount(a), parse_amount(b)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Turns an ISO-8601 duration like `PT7H55M` into `7h 55m`.
///
/// Anything that doesn't look like a `PT..H..M` duration is returned as-is.
#[must_use]
pub fn humanize_duration(iso: &str) -> String {
    let Some(rest) = iso.strip_prefix("PT") else {
        return iso.to_string();
    };
    let mut parts = Vec::new();
    let mut number = String::new();
    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }
        let unit = match ch {
            'H' => "h",
            'M' => "m",
            'S' => "s",
            _ => return iso.to_string(),
        };
        if number.is_empty() {
            return iso.to_string();
        }
        parts.push(format!("{number}{unit}"));
        number.clear();
    }
    if parts.is_empty() || !number.is_empty() {
        return iso.to_string();
    }
    parts.join(" ")
}

fn summarize_segment(segment: &Segment, dictionaries: &Dictionaries) -> SegmentSummary {
    let aircraft = segment.aircraft.as_ref().map(|a| {
        dictionaries
            .aircraft
            .get(&a.code)
            .cloned()
            .unwrap_or_else(|| a.code.clone())
    });
    SegmentSummary {
        from: segment.departure.iata_code.clone(),
        from_terminal: segment.departure.terminal.clone(),
        departure: segment.departure.at.clone(),
        to: segment.arrival.iata_code.clone(),
        to_terminal: segment.arrival.terminal.clone(),
        arrival: segment.arrival.at.clone(),
        carrier: segment.carrier_code.clone(),
        carrier_name: dictionaries.carriers.get(&segment.carrier_code).cloned(),
        flight_number: format!("{}{}", segment.carrier_code, segment.number),
        aircraft,
        duration: segment.duration.as_deref().map(humanize_duration),
    }
}

fn summarize_itinerary(
    index: usize,
    itinerary: &Itinerary,
    dictionaries: &Dictionaries,
) -> ItinerarySummary {
    let technical_stops: usize = itinerary
        .segments
        .iter()
        .map(|s| s.number_of_stops as usize)
        .sum();
    ItinerarySummary {
        direction: if index == 0 { "outbound" } else { "return" },
        duration: itinerary.duration.as_deref().map(humanize_duration),
        stops: itinerary.segments.len().saturating_sub(1) + technical_stops,
        segments: itinerary
            .segments
            .iter()
            .map(|s| summarize_segment(s, dictionaries))
            .collect(),
    }
}

/// Projects one offer to its display fields.
#[must_use]
pub fn summarize_offer(offer: &FlightOffer, dictionaries: &Dictionaries) -> OfferSummary {
    OfferSummary {
        id: offer.id.clone(),
        price: PriceSummary {
            total: offer.price.total.clone(),
            currency: offer.price.currency.clone(),
        },
        bookable_seats: offer.number_of_bookable_seats,
        validating_airline: offer.validating_airline_codes.first().cloned(),
        itineraries: offer
            .itineraries
            .iter()
            .enumerate()
            .map(|(i, it)| summarize_itinerary(i, it, dictionaries))
            .collect(),
    }
}

/// Sorts offers by ascending price, keeps the cheapest [`MAX_RESULTS`].
///
/// Ties keep provider order.
#[must_use]
pub fn format_flight_offers(offers: &[FlightOffer], dictionaries: &Dictionaries) -> FlightSearchSummary {
    let mut sorted: Vec<&FlightOffer> = offers.iter().collect();
    sorted.sort_by(|a, b| compare_amounts(&a.price.total, &b.price.total));

    let offers_out: Vec<OfferSummary> = sorted
        .into_iter()
        .take(MAX_RESULTS)
        .map(|offer| summarize_offer(offer, dictionaries))
        .collect();

    FlightSearchSummary {
        total_offers: offers.len(),
        showing: offers_out.len(),
        offers: offers_out,
    }
}

/// Full projection of a single offer, price breakdown included.
#[must_use]
pub fn format_offer_details(offer: &FlightOffer, dictionaries: &Dictionaries) -> OfferDetails {
    let fees = offer
        .price
        .fees
        .iter()
        .filter(|fee| parse_amount(&fee.amount).is_some_and(|amount| amount != 0.0))
        .map(|fee| FeeSummary {
            kind: fee.kind.clone(),
            amount: fee.amount.clone(),
        })
        .collect();

    OfferDetails {
        summary: summarize_offer(offer, dictionaries),
        one_way: offer.one_way,
        last_ticketing_date: offer.last_ticketing_date.clone(),
        traveler_count: offer.traveler_pricings.len(),
        price_breakdown: PriceBreakdown {
            base: offer.price.base.clone(),
            fees,
            grand_total: offer.price.grand_total.clone(),
            currency: offer.price.currency.clone(),
        },
    }
}

/// Keeps the first [`MAX_RESULTS`] locations in provider order.
#[must_use]
pub fn format_locations(locations: &[Location]) -> LocationSearchSummary {
    let shown: Vec<LocationSummary> = locations
        .iter()
        .take(MAX_RESULTS)
        .map(|loc| LocationSummary {
            code: loc.iata_code.clone(),
            name: loc.name.clone(),
            kind: loc.sub_type.clone(),
            city: loc.address.city_name.clone(),
            country: loc.address.country_name.clone(),
            country_code: loc.address.country_code.clone(),
            time_zone_offset: loc.time_zone_offset.clone(),
        })
        .collect();

    LocationSearchSummary {
        total_results: locations.len(),
        showing: shown.len(),
        locations: shown,
    }
}

/// Projects airlines and lists requested codes nobody matched.
#[must_use]
pub fn format_airlines(airlines: &[Airline], requested: &[String]) -> AirlineLookupSummary {
    let mut found: HashSet<&str> = HashSet::new();
    for airline in airlines {
        for code in [&airline.iata_code, &airline.icao_code].into_iter().flatten() {
            found.insert(code.as_str());
        }
    }

    let summaries = airlines
        .iter()
        .map(|airline| {
            let name = airline
                .common_name
                .clone()
                .or_else(|| airline.business_name.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let business_name = airline
                .business_name
                .clone()
                .filter(|business| *business != name);
            AirlineSummary {
                iata_code: airline.iata_code.clone(),
                icao_code: airline.icao_code.clone(),
                name,
                business_name,
            }
        })
        .collect();

    let not_found = requested
        .iter()
        .filter(|code| !found.contains(code.as_str()))
        .cloned()
        .collect();

    AirlineLookupSummary {
        airlines: summaries,
        not_found,
    }
}

/// Sorts date fares by ascending price, keeps the cheapest [`MAX_RESULTS`].
#[must_use]
pub fn format_flight_dates(dates: &[FlightDate]) -> CheapestDatesSummary {
    let mut sorted: Vec<&FlightDate> = dates.iter().collect();
    sorted.sort_by(|a, b| compare_amounts(&a.price.total, &b.price.total));

    let shown: Vec<DateFareSummary> = sorted
        .into_iter()
        .take(MAX_RESULTS)
        .map(|date| DateFareSummary {
            origin: date.origin.clone(),
            destination: date.destination.clone(),
            departure_date: date.departure_date.clone(),
            return_date: date.return_date.clone(),
            price: date.price.total.clone(),
        })
        .collect();

    CheapestDatesSummary {
        total_results: dates.len(),
        showing: shown.len(),
        dates: shown,
    }
}
