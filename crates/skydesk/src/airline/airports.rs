use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &[
    "get_airport_info",
    "check_security_wait_times",
    "find_airport_services",
];

const AIRPORTS: &[(&str, &str, &str)] = &[
    ("SFO", "San Francisco International Airport", "San Francisco, CA"),
    ("LAX", "Los Angeles International Airport", "Los Angeles, CA"),
    ("JFK", "John F. Kennedy International Airport", "New York, NY"),
    ("ORD", "O'Hare International Airport", "Chicago, IL"),
    ("ATL", "Hartsfield-Jackson Atlanta International Airport", "Atlanta, GA"),
    ("MIA", "Miami International Airport", "Miami, FL"),
    ("SEA", "Seattle-Tacoma International Airport", "Seattle, WA"),
    ("LHR", "Heathrow Airport", "London, UK"),
];

const RESTAURANTS: &[&str] = &[
    "Shake Shack",
    "Blue Bottle Coffee",
    "Farmers Fridge",
    "Sushi Counter",
    "Taqueria Express",
    "Local Brewpub",
];

const SHOPS: &[&str] = &["Hudson News", "Duty Free", "Tech on the Go", "Bookstore", "Pharmacy"];

const AMENITIES: &[&str] = &["charging stations", "pet relief area", "nursing room", "showers", "chapel"];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(get_airport_info_tool(), get_airport_info)?;
    registry.register_fn(check_security_wait_times_tool(), check_security_wait_times)?;
    registry.register_fn(find_airport_services_tool(), find_airport_services)?;
    Ok(())
}

fn describe(code: &str) -> (String, String) {
    let code = code.to_uppercase();
    AIRPORTS
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|(_, name, city)| (name.to_string(), city.to_string()))
        .unwrap_or_else(|| (format!("{} Airport", code), "Unknown".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirportArgs {
    pub airport_code: String,
}

fn get_airport_info_tool() -> Tool {
    Tool::new(
        "get_airport_info",
        "Get general information about an airport: terminals, transport and contact details",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string", "description": "IATA airport code, e.g. JFK"}
            },
            "required": ["airport_code"]
        }),
    )
}

pub fn get_airport_info(args: AirportArgs) -> Value {
    let (name, city) = describe(&args.airport_code);
    json!({
        "airport_code": args.airport_code.to_uppercase(),
        "name": name,
        "city": city,
        "terminals": synth::between(1, 8),
        "ground_transport": synth::sample(&["rail", "taxi", "rideshare", "shuttle", "bus"], 3),
        "parking_daily_rate": synth::price(18, 45),
        "wifi": "Free",
        "currency": "USD",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityWaitArgs {
    pub airport_code: String,
    #[serde(default)]
    pub terminal: Option<String>,
}

fn check_security_wait_times_tool() -> Tool {
    Tool::new(
        "check_security_wait_times",
        "Check current security checkpoint wait times at an airport",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string"},
                "terminal": {"type": "string"}
            },
            "required": ["airport_code"]
        }),
    )
}

pub fn check_security_wait_times(args: SecurityWaitArgs) -> Value {
    let checkpoints: Vec<Value> = (1..=synth::between(2, 4))
        .map(|index| {
            json!({
                "checkpoint": format!("Checkpoint {}", index),
                "standard_wait_minutes": synth::between(5, 55),
                "precheck_wait_minutes": synth::between(2, 15),
            })
        })
        .collect();

    json!({
        "airport_code": args.airport_code.to_uppercase(),
        "terminal": args.terminal,
        "checkpoints": checkpoints,
        "updated_at": synth::timestamp_in(0),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServicesArgs {
    pub airport_code: String,
    #[serde(default)]
    pub service_type: Option<String>,
}

fn find_airport_services_tool() -> Tool {
    Tool::new(
        "find_airport_services",
        "Find restaurants, shops and amenities inside an airport",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string"},
                "service_type": {"type": "string", "enum": ["restaurants", "shops", "amenities"]}
            },
            "required": ["airport_code"]
        }),
    )
}

fn located(names: Vec<&str>) -> Vec<Value> {
    names
        .into_iter()
        .map(|name| {
            json!({
                "name": name,
                "terminal": format!("Terminal {}", synth::between(1, 5)),
                "near_gate": synth::gate(),
                "open_until": format!("{}:00", synth::between(20, 23)),
            })
        })
        .collect()
}

pub fn find_airport_services(args: ServicesArgs) -> Value {
    let wanted = args.service_type.map(|s| s.to_lowercase());
    let include = |kind: &str| wanted.as_deref().map_or(true, |w| w == kind);

    let mut services = serde_json::Map::new();
    if include("restaurants") {
        services.insert("restaurants".to_string(), json!(located(synth::sample(RESTAURANTS, 4))));
    }
    if include("shops") {
        services.insert("shops".to_string(), json!(located(synth::sample(SHOPS, 3))));
    }
    if include("amenities") {
        services.insert("amenities".to_string(), json!(located(synth::sample(AMENITIES, 3))));
    }

    json!({
        "airport_code": args.airport_code.to_uppercase(),
        "services": services,
    })
}
