use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["get_seat_map", "select_seat"];

const SEAT_LETTERS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F'];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(get_seat_map_tool(), get_seat_map)?;
    registry.register_fn(select_seat_tool(), select_seat)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatMapArgs {
    pub flight_number: String,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn get_seat_map_tool() -> Tool {
    Tool::new(
        "get_seat_map",
        "Show available seats on a flight",
        json!({
            "type": "object",
            "properties": {
                "flight_number": {"type": "string"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["flight_number"]
        }),
    )
}

fn seat_kind(letter: char) -> &'static str {
    match letter {
        'A' | 'F' => "window",
        'C' | 'D' => "aisle",
        _ => "middle",
    }
}

pub fn get_seat_map(args: SeatMapArgs) -> Value {
    let class = args.cabin_class.unwrap_or_else(|| "economy".to_string()).to_lowercase();
    let (first_row, last_row) = match class.as_str() {
        "first" | "business" => (1, 5),
        "premium_economy" => (6, 10),
        _ => (11, 38),
    };

    let available: Vec<Value> = (first_row..=last_row)
        .flat_map(|row| SEAT_LETTERS.iter().map(move |letter| (row, *letter)))
        .filter(|_| synth::chance(0.3))
        .map(|(row, letter)| {
            let extra_legroom = row == first_row || row == 21;
            let price = if extra_legroom { synth::price(35, 89) } else { 0.0 };
            json!({
                "seat": format!("{}{}", row, letter),
                "type": seat_kind(letter),
                "extra_legroom": extra_legroom,
                "price": price,
            })
        })
        .collect();

    json!({
        "flight_number": args.flight_number,
        "cabin_class": class,
        "rows": format!("{}-{}", first_row, last_row),
        "available_seats": available,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectSeatArgs {
    pub confirmation_code: String,
    pub seat: String,
    #[serde(default)]
    pub flight_number: Option<String>,
}

fn select_seat_tool() -> Tool {
    Tool::new(
        "select_seat",
        "Assign a specific seat on a booking",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string"},
                "seat": {"type": "string", "description": "Seat such as 14C"},
                "flight_number": {"type": "string"}
            },
            "required": ["confirmation_code", "seat"]
        }),
    )
}

pub fn select_seat(args: SelectSeatArgs) -> Value {
    let seat = args.seat.to_uppercase();
    let letter = seat.chars().last().unwrap_or('B');

    if !synth::chance(0.85) {
        return json!({
            "confirmation_code": args.confirmation_code,
            "seat": seat,
            "status": "Unavailable",
            "alternatives": [synth::seat(), synth::seat()],
        });
    }

    json!({
        "confirmation_code": args.confirmation_code,
        "flight_number": args.flight_number,
        "seat": seat,
        "seat_type": seat_kind(letter),
        "status": "Assigned",
        "fee": synth::pick(&[0.0, 0.0, 25.0, 49.0]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_map_rows_follow_cabin() {
        let result = get_seat_map(SeatMapArgs {
            flight_number: "DL456".to_string(),
            cabin_class: Some("Business".to_string()),
        });
        assert_eq!(result["rows"], "1-5");
        for seat in result["available_seats"].as_array().unwrap() {
            let row: u32 = seat["seat"].as_str().unwrap().trim_end_matches(char::is_alphabetic).parse().unwrap();
            assert!((1..=5).contains(&row));
        }
    }

    #[test]
    fn test_select_seat_normalizes_case() {
        let result = select_seat(SelectSeatArgs {
            confirmation_code: "ABC123".to_string(),
            seat: "14c".to_string(),
            flight_number: None,
        });
        assert_eq!(result["seat"], "14C");
    }
}
