//! Tool registry and dispatch.
//!
//! Every handler failure becomes an error tool result
//! (`Error [CODE]: message`) rather than a JSON-RPC error, so clients always
//! get something they can show to the model.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ServiceError;
use crate::flights::requests::{
    AirlineLookupRequest, AirportSearchRequest, CheapestDatesRequest, FlightSearchRequest,
    LocationKind, OfferLookupRequest, TravelClass,
};
use crate::flights::FlightService;
use crate::mcp::server::{ToolCallResult, ToolDefinition};

/// Names of every tool, in the order `tools/list` reports them.
pub const TOOL_NAMES: [&str; 5] = [
    "search_flights",
    "search_airports",
    "get_airline_info",
    "find_cheapest_dates",
    "get_flight_offer_details",
];

/// JSON Schema properties shared by the flight-search tools.
fn flight_search_properties() -> serde_json::Map<String, Value> {
    let properties = json!({
        "origin": {
            "type": "string",
            "description": "Origin airport IATA code (e.g. LHR)",
            "minLength": 3,
            "maxLength": 3
        },
        "destination": {
            "type": "string",
            "description": "Destination airport IATA code (e.g. JFK)",
            "minLength": 3,
            "maxLength": 3
        },
        "departureDate": {
            "type": "string",
            "description": "Departure date (YYYY-MM-DD)",
            "format": "date"
        },
        "returnDate": {
            "type": "string",
            "description": "Optional: return date for round trips (YYYY-MM-DD), after departureDate",
            "format": "date"
        },
        "adults": {
            "type": "integer",
            "description": "Adult passengers (default: 1)",
            "minimum": 1,
            "maximum": 9
        },
        "children": {
            "type": "integer",
            "description": "Child passengers aged 2-11 (default: 0)",
            "minimum": 0,
            "maximum": 9
        },
        "infants": {
            "type": "integer",
            "description": "Infants under 2 on an adult's lap (default: 0, at most one per adult)",
            "minimum": 0,
            "maximum": 9
        },
        "travelClass": {
            "type": "string",
            "description": "Optional: cabin class",
            "enum": TravelClass::NAMES
        },
        "nonStop": {
            "type": "boolean",
            "description": "Only direct flights (default: false)"
        },
        "currencyCode": {
            "type": "string",
            "description": "Optional: ISO 4217 currency for prices (e.g. EUR)",
            "minLength": 3,
            "maxLength": 3
        },
        "maxPrice": {
            "type": "integer",
            "description": "Optional: maximum total price per traveller",
            "minimum": 1
        },
        "max": {
            "type": "integer",
            "description": "Offers to request from the provider (default: 50); the 10 cheapest are shown",
            "minimum": 1,
            "maximum": 250
        }
    });

    match properties {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Returns the list of available tools.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let search_properties = flight_search_properties();

    let mut offer_properties = search_properties.clone();
    offer_properties.insert(
        "offerId".to_string(),
        json!({
            "type": "string",
            "description": "Offer ID from a search_flights result"
        }),
    );

    vec![
        ToolDefinition {
            name: "search_flights".to_string(),
            description: Some(
                "Search priced flight offers between two airports on a date. Returns the 10 \
                 cheapest offers sorted by total price, with itineraries, segments, carriers \
                 and bookable seats, plus the total number of offers found."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": search_properties,
                "required": ["origin", "destination", "departureDate"]
            }),
        },
        ToolDefinition {
            name: "search_airports".to_string(),
            description: Some(
                "Find airports and cities by name or code fragment. Returns IATA codes, \
                 names, city, country and time zone offset."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "City or airport name, or part of an IATA code (e.g. 'Lond')",
                        "minLength": 1,
                        "maxLength": 50
                    },
                    "subType": {
                        "type": "string",
                        "description": "Location kind (default: ANY)",
                        "enum": LocationKind::NAMES
                    },
                    "countryCode": {
                        "type": "string",
                        "description": "Optional: ISO 3166-1 alpha-2 country filter (e.g. GB)",
                        "minLength": 2,
                        "maxLength": 2
                    },
                    "max": {
                        "type": "integer",
                        "description": "Maximum locations to request (default: 10)",
                        "minimum": 1,
                        "maximum": 50
                    }
                },
                "required": ["keyword"]
            }),
        },
        ToolDefinition {
            name: "get_airline_info".to_string(),
            description: Some(
                "Look up airline names by IATA (2-character) or ICAO (3-character) code. \
                 Codes with no match are listed under notFound."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "airlineCodes": {
                        "description": "Airline codes, as an array or a comma-separated string (e.g. 'BA,AF')",
                        "oneOf": [
                            {"type": "string"},
                            {
                                "type": "array",
                                "items": {"type": "string"},
                                "minItems": 1,
                                "maxItems": 20
                            }
                        ]
                    }
                },
                "required": ["airlineCodes"]
            }),
        },
        ToolDefinition {
            name: "find_cheapest_dates".to_string(),
            description: Some(
                "Find the cheapest dates to fly on a route. Returns up to 10 date options \
                 sorted by price."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "Origin airport or city IATA code",
                        "minLength": 3,
                        "maxLength": 3
                    },
                    "destination": {
                        "type": "string",
                        "description": "Destination airport or city IATA code",
                        "minLength": 3,
                        "maxLength": 3
                    },
                    "departureDate": {
                        "type": "string",
                        "description": "Optional: date to centre the search on (YYYY-MM-DD)",
                        "format": "date"
                    },
                    "oneWay": {
                        "type": "boolean",
                        "description": "One-way fares instead of round trips (default: false)"
                    },
                    "nonStop": {
                        "type": "boolean",
                        "description": "Only direct flights (default: false)"
                    },
                    "maxPrice": {
                        "type": "integer",
                        "description": "Optional: maximum price",
                        "minimum": 1
                    }
                },
                "required": ["origin", "destination"]
            }),
        },
        ToolDefinition {
            name: "get_flight_offer_details".to_string(),
            description: Some(
                "Get the full details and price breakdown of one offer. Offers cannot be \
                 fetched by ID alone: pass the offerId together with the same search \
                 parameters used for search_flights, and the search is re-run to find it."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": offer_properties,
                "required": ["offerId", "origin", "destination", "departureDate"]
            }),
        },
    ]
}

/// Runs the named tool and wraps the outcome as a tool result.
pub async fn call_tool(flights: &FlightService, name: &str, arguments: &Value) -> ToolCallResult {
    match dispatch(flights, name, arguments).await {
        Ok(text) => ToolCallResult::text(text),
        Err(e) => {
            warn!(tool = name, code = e.code(), error = %e, "Tool call failed");
            ToolCallResult::error(format!("Error [{}]: {e}", e.code()))
        }
    }
}

async fn dispatch(
    flights: &FlightService,
    name: &str,
    arguments: &Value,
) -> Result<String, ServiceError> {
    match name {
        "search_flights" => {
            let request = FlightSearchRequest::from_arguments(arguments)?;
            render(&flights.search_flights(&request).await?)
        }
        "search_airports" => {
            let request = AirportSearchRequest::from_arguments(arguments)?;
            render(&flights.search_airports(&request).await?)
        }
        "get_airline_info" => {
            let request = AirlineLookupRequest::from_arguments(arguments)?;
            render(&flights.airline_info(&request).await?)
        }
        "find_cheapest_dates" => {
            let request = CheapestDatesRequest::from_arguments(arguments)?;
            render(&flights.cheapest_dates(&request).await?)
        }
        "get_flight_offer_details" => {
            let request = OfferLookupRequest::from_arguments(arguments)?;
            render(&flights.offer_details(&request).await?)
        }
        other => Err(ServiceError::unknown(format!("Unknown tool: {other}"))),
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, ServiceError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ServiceError::unknown(format!("failed to serialise result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_definitions_valid() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TOOL_NAMES);

        for tool in &tools {
            assert!(tool.description.is_some());
            assert_eq!(tool.input_schema["type"], "object");
            for required in tool.input_schema["required"].as_array().unwrap() {
                let field = required.as_str().unwrap();
                assert!(
                    tool.input_schema["properties"].get(field).is_some(),
                    "{} requires undeclared {field}",
                    tool.name
                );
            }
        }
    }

    #[test]
    fn offer_details_schema_extends_search() {
        let tools = tool_definitions();
        let details = &tools[4].input_schema["properties"];
        assert!(details.get("offerId").is_some());
        assert!(details.get("adults").is_some());
        assert_eq!(details["travelClass"]["enum"][3], "FIRST");
    }
}
