//! Prompt templates served through `prompts/list` and `prompts/get`.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A declared prompt argument.
#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    /// Argument name.
    pub name: &'static str,
    /// What the argument means.
    pub description: &'static str,
    /// Whether `prompts/get` fails without it.
    pub required: bool,
}

/// A prompt definition for prompts/list response.
#[derive(Debug, Clone, Serialize)]
pub struct PromptDefinition {
    /// Unique prompt name.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Template arguments.
    pub arguments: Vec<PromptArgument>,
}

/// Content of a prompt message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// A role-tagged prompt message.
#[derive(Debug, Clone, Serialize)]
pub struct PromptMessage {
    /// Always `user` for these templates.
    pub role: &'static str,
    /// Message body.
    pub content: PromptContent,
}

/// Result of prompts/get.
#[derive(Debug, Clone, Serialize)]
pub struct PromptResult {
    /// Description of the rendered prompt.
    pub description: String,
    /// Messages to seed the conversation with.
    pub messages: Vec<PromptMessage>,
}

/// Why a prompt could not be rendered. Reported as invalid params.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    /// No prompt has this name.
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    /// A required argument is absent or empty.
    #[error("Missing required argument '{argument}' for prompt '{prompt}'")]
    MissingArgument {
        /// Prompt name.
        prompt: &'static str,
        /// Argument name.
        argument: &'static str,
    },
}

const fn arg(name: &'static str, description: &'static str, required: bool) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required,
    }
}

/// Returns the list of available prompts.
#[must_use]
pub fn prompt_definitions() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "find_best_flight",
            description: "Find the best flight between two airports, weighing price, duration and stops",
            arguments: vec![
                arg("origin", "Origin airport IATA code", true),
                arg("destination", "Destination airport IATA code", true),
                arg("departureDate", "Departure date (YYYY-MM-DD)", true),
                arg("returnDate", "Return date for round trips (YYYY-MM-DD)", false),
                arg("passengers", "Number of adult passengers", false),
            ],
        },
        PromptDefinition {
            name: "plan_trip",
            description: "Plan a trip to a destination within a budget",
            arguments: vec![
                arg("destination", "City or airport to travel to", true),
                arg("budget", "Total flight budget", false),
                arg("travelDates", "Preferred travel dates or date range", false),
            ],
        },
        PromptDefinition {
            name: "compare_airlines",
            description: "Compare the airlines flying a route",
            arguments: vec![arg("route", "Route as ORIGIN-DESTINATION (e.g. LHR-JFK)", true)],
        },
        PromptDefinition {
            name: "travel_tips",
            description: "General tips for finding cheaper flights with these tools",
            arguments: Vec::new(),
        },
    ]
}

/// Renders the named prompt with `arguments`.
///
/// # Errors
///
/// Returns an error if the prompt is unknown or a required argument is
/// missing.
pub fn get_prompt(name: &str, arguments: &Map<String, Value>) -> Result<PromptResult, PromptError> {
    let definition = prompt_definitions()
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| PromptError::UnknownPrompt(name.to_string()))?;

    let args = PromptArgs {
        prompt: definition.name,
        values: arguments,
    };
    for declared in definition.arguments.iter().filter(|a| a.required) {
        args.required(declared.name)?;
    }

    let text = match definition.name {
        "find_best_flight" => find_best_flight(&args)?,
        "plan_trip" => plan_trip(&args)?,
        "compare_airlines" => compare_airlines(&args)?,
        _ => TRAVEL_TIPS.to_string(),
    };

    Ok(PromptResult {
        description: definition.description.to_string(),
        messages: vec![PromptMessage {
            role: "user",
            content: PromptContent::Text { text },
        }],
    })
}

struct PromptArgs<'a> {
    prompt: &'static str,
    values: &'a Map<String, Value>,
}

impl PromptArgs<'_> {
    fn optional(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn required(&self, name: &'static str) -> Result<String, PromptError> {
        self.optional(name).ok_or(PromptError::MissingArgument {
            prompt: self.prompt,
            argument: name,
        })
    }
}

fn find_best_flight(args: &PromptArgs<'_>) -> Result<String, PromptError> {
    let origin = args.required("origin")?;
    let destination = args.required("destination")?;
    let departure = args.required("departureDate")?;
    let passengers = args.optional("passengers").unwrap_or_else(|| "1".to_string());

    let trip = match args.optional("returnDate") {
        Some(ret) => format!("departing {departure} and returning {ret}"),
        None => format!("one way on {departure}"),
    };

    Ok(format!(
        "Find the best flight from {origin} to {destination}, {trip}, for {passengers} \
         adult passenger(s).\n\n\
         1. Use search_flights with these parameters.\n\
         2. Compare the cheapest offers on total price, total duration and number of stops.\n\
         3. Use get_airline_info to name the carriers involved.\n\
         4. Recommend one option and explain the trade-offs against the runners-up.\n\
         If the dates look expensive, use find_cheapest_dates to suggest alternatives."
    ))
}

fn plan_trip(args: &PromptArgs<'_>) -> Result<String, PromptError> {
    let destination = args.required("destination")?;
    let budget = args
        .optional("budget")
        .map(|b| format!(" with a flight budget of {b}"))
        .unwrap_or_default();
    let dates = args
        .optional("travelDates")
        .map(|d| format!(" around {d}"))
        .unwrap_or_default();

    Ok(format!(
        "Help me plan a trip to {destination}{dates}{budget}.\n\n\
         1. Use search_airports to find the airports serving {destination}.\n\
         2. Ask which airport I am departing from if it is not obvious.\n\
         3. Use find_cheapest_dates to find good travel dates, then search_flights for \
         concrete offers.\n\
         4. Summarise the best options, keeping within the budget where one was given."
    ))
}

fn compare_airlines(args: &PromptArgs<'_>) -> Result<String, PromptError> {
    let route = args.required("route")?;

    Ok(format!(
        "Compare the airlines flying the route {route}.\n\n\
         1. Use search_flights for an upcoming date on this route.\n\
         2. Group the offers by validating airline and use get_airline_info for their names.\n\
         3. For each airline compare the lowest price, typical duration, stops and seats left.\n\
         4. Present the comparison as a table and name the best value carrier."
    ))
}

const TRAVEL_TIPS: &str = "Give me practical tips for finding cheap flights using the available tools:\n\n\
- search_airports finds the IATA codes for a city, including nearby alternatives.\n\
- find_cheapest_dates shows which dates on a route are cheapest.\n\
- search_flights returns the 10 cheapest offers; nonStop and travelClass narrow the results.\n\
- get_flight_offer_details shows the price breakdown of one offer when given the same search.\n\
Explain when flexible dates, nearby airports or connecting flights are worth it.";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn definitions_list_four_prompts() {
        let names: Vec<&str> = prompt_definitions().iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            ["find_best_flight", "plan_trip", "compare_airlines", "travel_tips"]
        );
    }

    #[test]
    fn find_best_flight_renders_arguments() {
        let result = get_prompt(
            "find_best_flight",
            &args(json!({
                "origin": "LHR",
                "destination": "JFK",
                "departureDate": "2025-01-15",
                "passengers": 2
            })),
        )
        .unwrap();

        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, "user");
        let PromptContent::Text { text } = &result.messages[0].content;
        assert!(text.contains("from LHR to JFK"));
        assert!(text.contains("one way on 2025-01-15"));
        assert!(text.contains("for 2 adult"));
    }

    #[test]
    fn missing_required_argument() {
        let err = get_prompt("find_best_flight", &args(json!({"origin": "LHR"}))).unwrap_err();
        assert_eq!(
            err,
            PromptError::MissingArgument {
                prompt: "find_best_flight",
                argument: "destination"
            }
        );

        let err = get_prompt("compare_airlines", &args(json!({"route": "  "}))).unwrap_err();
        assert!(matches!(err, PromptError::MissingArgument { argument: "route", .. }));
    }

    #[test]
    fn unknown_prompt() {
        let err = get_prompt("book_flight", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown prompt: book_flight");
    }

    #[test]
    fn travel_tips_needs_no_arguments() {
        let result = get_prompt("travel_tips", &Map::new()).unwrap();
        let PromptContent::Text { text } = &result.messages[0].content;
        assert!(text.contains("find_cheapest_dates"));
    }
}
