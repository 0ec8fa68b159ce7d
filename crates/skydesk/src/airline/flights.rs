use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &[
    "search_one_way",
    "search_round_trip",
    "search_multi_city",
    "book_flight",
    "check_flight_status",
    "get_flight_details",
    "track_flight_route",
    "rebook_flight",
];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(search_one_way_tool(), search_one_way)?;
    registry.register_fn(search_round_trip_tool(), search_round_trip)?;
    registry.register_fn(search_multi_city_tool(), search_multi_city)?;
    registry.register_fn(book_flight_tool(), book_flight)?;
    registry.register_fn(check_flight_status_tool(), check_flight_status)?;
    registry.register_fn(get_flight_details_tool(), get_flight_details)?;
    registry.register_fn(track_flight_route_tool(), track_flight_route)?;
    registry.register_fn(rebook_flight_tool(), rebook_flight)?;
    Ok(())
}

fn passengers(count: Option<u32>) -> u32 {
    count.unwrap_or(1).max(1)
}

fn cabin(class: Option<&str>) -> String {
    class.unwrap_or("economy").to_lowercase()
}

fn cabin_multiplier(class: &str) -> f64 {
    match class {
        "premium_economy" => 1.6,
        "business" => 3.2,
        "first" => 5.0,
        _ => 1.0,
    }
}

/// A handful of fabricated offers between two airports, cheapest first
fn offers(origin: &str, destination: &str, date: &str, class: &str, count: u32) -> Vec<Value> {
    let mut offers: Vec<Value> = (0..synth::between(2, 4))
        .map(|_| {
            let flight_number = synth::flight_number();
            let fare = (synth::price(89, 420) * cabin_multiplier(class) * 100.0).round() / 100.0;
            json!({
                "flight_number": flight_number,
                "airline": synth::airline_name(&flight_number),
                "origin": origin.to_uppercase(),
                "destination": destination.to_uppercase(),
                "date": date,
                "departure_time": synth::clock_time(),
                "duration": synth::duration(55, 720),
                "stops": synth::pick(&[0, 0, 0, 1, 1, 2]),
                "cabin_class": class,
                "fare_per_passenger": fare,
                "total_price": ((fare * count as f64) * 100.0).round() / 100.0,
                "currency": "USD",
                "seats_left": synth::between(1, 9),
            })
        })
        .collect();

    offers.sort_by(|a, b| {
        a["total_price"]
            .as_f64()
            .partial_cmp(&b["total_price"].as_f64())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    offers
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchOneWayArgs {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub passengers: Option<u32>,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn search_one_way_tool() -> Tool {
    Tool::new(
        "search_one_way",
        "Search one-way flights between two airports on a date",
        json!({
            "type": "object",
            "properties": {
                "origin": {"type": "string", "description": "Origin airport IATA code, e.g. SFO"},
                "destination": {"type": "string", "description": "Destination airport IATA code, e.g. LAX"},
                "departure_date": {"type": "string", "description": "Departure date in YYYY-MM-DD format"},
                "passengers": {"type": "integer", "description": "Number of passengers, default 1"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["origin", "destination", "departure_date"]
        }),
    )
}

pub fn search_one_way(args: SearchOneWayArgs) -> Value {
    let class = cabin(args.cabin_class.as_deref());
    let count = passengers(args.passengers);
    let date = synth::travel_date(Some(&args.departure_date));
    json!({
        "trip_type": "one_way",
        "passengers": count,
        "flights": offers(&args.origin, &args.destination, &date, &class, count),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRoundTripArgs {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: String,
    #[serde(default)]
    pub passengers: Option<u32>,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn search_round_trip_tool() -> Tool {
    Tool::new(
        "search_round_trip",
        "Search round-trip flights with outbound and return dates",
        json!({
            "type": "object",
            "properties": {
                "origin": {"type": "string", "description": "Origin airport IATA code"},
                "destination": {"type": "string", "description": "Destination airport IATA code"},
                "departure_date": {"type": "string", "description": "Outbound date in YYYY-MM-DD format"},
                "return_date": {"type": "string", "description": "Return date in YYYY-MM-DD format"},
                "passengers": {"type": "integer", "description": "Number of passengers, default 1"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["origin", "destination", "departure_date", "return_date"]
        }),
    )
}

pub fn search_round_trip(args: SearchRoundTripArgs) -> Value {
    let class = cabin(args.cabin_class.as_deref());
    let count = passengers(args.passengers);
    let outbound_date = synth::travel_date(Some(&args.departure_date));
    let return_date = synth::travel_date(Some(&args.return_date));
    json!({
        "trip_type": "round_trip",
        "passengers": count,
        "outbound": offers(&args.origin, &args.destination, &outbound_date, &class, count),
        "return": offers(&args.destination, &args.origin, &return_date, &class, count),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Leg {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchMultiCityArgs {
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub passengers: Option<u32>,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn search_multi_city_tool() -> Tool {
    Tool::new(
        "search_multi_city",
        "Search a multi-city itinerary made of several one-way legs",
        json!({
            "type": "object",
            "properties": {
                "legs": {
                    "type": "array",
                    "description": "Ordered legs of the trip",
                    "items": {
                        "type": "object",
                        "properties": {
                            "origin": {"type": "string"},
                            "destination": {"type": "string"},
                            "date": {"type": "string", "description": "YYYY-MM-DD"}
                        },
                        "required": ["origin", "destination", "date"]
                    }
                },
                "passengers": {"type": "integer"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["legs"]
        }),
    )
}

pub fn search_multi_city(args: SearchMultiCityArgs) -> Value {
    let class = cabin(args.cabin_class.as_deref());
    let count = passengers(args.passengers);
    let legs: Vec<Value> = args
        .legs
        .iter()
        .enumerate()
        .map(|(index, leg)| {
            let date = synth::travel_date(Some(&leg.date));
            json!({
                "leg": index + 1,
                "origin": leg.origin.to_uppercase(),
                "destination": leg.destination.to_uppercase(),
                "options": offers(&leg.origin, &leg.destination, &date, &class, count),
            })
        })
        .collect();

    let cheapest_total: f64 = legs
        .iter()
        .filter_map(|leg| leg["options"][0]["total_price"].as_f64())
        .sum();

    json!({
        "trip_type": "multi_city",
        "passengers": count,
        "legs": legs,
        "cheapest_combined_price": (cheapest_total * 100.0).round() / 100.0,
        "currency": "USD",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookFlightArgs {
    pub flight_number: String,
    pub passenger_name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn book_flight_tool() -> Tool {
    Tool::new(
        "book_flight",
        "Book a seat on a specific flight for a passenger",
        json!({
            "type": "object",
            "properties": {
                "flight_number": {"type": "string"},
                "passenger_name": {"type": "string"},
                "date": {"type": "string", "description": "Travel date in YYYY-MM-DD format"},
                "email": {"type": "string", "description": "Contact email for the confirmation"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["flight_number", "passenger_name"]
        }),
    )
}

pub fn book_flight(args: BookFlightArgs) -> Value {
    let class = cabin(args.cabin_class.as_deref());
    let fare = (synth::price(99, 480) * cabin_multiplier(&class) * 100.0).round() / 100.0;
    json!({
        "confirmation_code": synth::confirmation_code(),
        "flight_number": args.flight_number,
        "passenger_name": args.passenger_name,
        "date": synth::travel_date(args.date.as_deref()),
        "cabin_class": class,
        "seat": synth::seat(),
        "total_paid": fare,
        "currency": "USD",
        "confirmation_sent_to": args.email,
        "status": "Confirmed",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlightStatusArgs {
    pub flight_number: String,
}

fn check_flight_status_tool() -> Tool {
    Tool::new(
        "check_flight_status",
        "Check the status of a flight by flight number",
        json!({
            "type": "object",
            "properties": {
                "flight_number": {"type": "string", "description": "Flight number, e.g. UA415"}
            },
            "required": ["flight_number"]
        }),
    )
}

pub fn check_flight_status(args: FlightStatusArgs) -> Value {
    let status = synth::pick(synth::FLIGHT_STATUSES);
    let delay_minutes = if status == "Delayed" {
        synth::between(15, 180)
    } else {
        0
    };
    json!({
        "flight_number": args.flight_number,
        "airline": synth::airline_name(&args.flight_number),
        "status": status,
        "delay_minutes": delay_minutes,
        "departure": format!("{} {}", synth::pick(&["SFO", "LAX", "ORD", "JFK", "SEA"]), synth::clock_time()),
        "arrival": format!("{} {}", synth::pick(&["BOS", "DEN", "ATL", "MIA", "DFW"]), synth::clock_time()),
        "gate": synth::gate(),
    })
}

fn get_flight_details_tool() -> Tool {
    Tool::new(
        "get_flight_details",
        "Get aircraft, amenities and schedule details for a flight",
        json!({
            "type": "object",
            "properties": {
                "flight_number": {"type": "string"}
            },
            "required": ["flight_number"]
        }),
    )
}

pub fn get_flight_details(args: FlightStatusArgs) -> Value {
    json!({
        "flight_number": args.flight_number,
        "airline": synth::airline_name(&args.flight_number),
        "aircraft": synth::pick(synth::AIRCRAFT),
        "scheduled_departure": synth::clock_time(),
        "scheduled_arrival": synth::clock_time(),
        "duration": synth::duration(60, 600),
        "amenities": synth::sample(&["wifi", "power outlets", "seatback entertainment", "meal service", "snacks"], 3),
        "on_time_performance": format!("{}%", synth::between(68, 97)),
    })
}

fn track_flight_route_tool() -> Tool {
    Tool::new(
        "track_flight_route",
        "Track the live position and progress of a flight along its route",
        json!({
            "type": "object",
            "properties": {
                "flight_number": {"type": "string"}
            },
            "required": ["flight_number"]
        }),
    )
}

pub fn track_flight_route(args: FlightStatusArgs) -> Value {
    let progress = synth::between(0, 100);
    let airborne = progress > 0 && progress < 100;
    let (altitude_ft, ground_speed_mph) = if airborne {
        (synth::between(28, 39) * 1000, synth::between(420, 560))
    } else {
        (0, 0)
    };
    json!({
        "flight_number": args.flight_number,
        "progress_percent": progress,
        "altitude_ft": altitude_ft,
        "ground_speed_mph": ground_speed_mph,
        "estimated_arrival": synth::timestamp_in(synth::between(10, 300) as i64),
        "current_region": synth::pick(&["Rocky Mountains", "Great Plains", "Midwest", "Atlantic Coast", "Pacific Coast"]),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RebookFlightArgs {
    pub ticket_id: String,
    pub new_date: String,
}

fn rebook_flight_tool() -> Tool {
    Tool::new(
        "rebook_flight",
        "Rebook a flight ticket to a new date",
        json!({
            "type": "object",
            "properties": {
                "ticket_id": {"type": "string"},
                "new_date": {"type": "string", "description": "New date in YYYY-MM-DD format"}
            },
            "required": ["ticket_id", "new_date"]
        }),
    )
}

pub fn rebook_flight(args: RebookFlightArgs) -> Value {
    json!({
        "ticket_id": args.ticket_id,
        "new_date": args.new_date,
        "new_flight_number": synth::flight_number(),
        "change_fee": synth::pick(&[0.0, 0.0, 75.0, 150.0]),
        "status": "Rebooked Successfully",
    })
}
