use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["request_special_assistance", "book_lounge_access"];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(request_special_assistance_tool(), request_special_assistance)?;
    registry.register_fn(book_lounge_access_tool(), book_lounge_access)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistanceArgs {
    pub confirmation_code: String,
    pub assistance_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

fn request_special_assistance_tool() -> Tool {
    Tool::new(
        "request_special_assistance",
        "Request wheelchair, medical, unaccompanied minor or other special assistance",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string"},
                "assistance_type": {
                    "type": "string",
                    "enum": ["wheelchair", "medical", "unaccompanied_minor", "visual", "hearing", "service_animal"]
                },
                "notes": {"type": "string"}
            },
            "required": ["confirmation_code", "assistance_type"]
        }),
    )
}

pub fn request_special_assistance(args: AssistanceArgs) -> Value {
    let kind = args.assistance_type.to_lowercase();
    let instructions = match kind.as_str() {
        "wheelchair" => "An agent will meet you at check-in and escort you to the gate",
        "medical" => "Bring documentation for any medical devices to the check-in counter",
        "unaccompanied_minor" => "Arrive 2 hours early with the minor's ID and guardian contact details",
        "service_animal" => "Present the animal's documentation at check-in",
        _ => "Let the gate agent know on arrival and crew will be briefed",
    };
    json!({
        "request_id": synth::reference("SSR"),
        "confirmation_code": args.confirmation_code,
        "assistance_type": kind,
        "notes": args.notes,
        "status": "Confirmed",
        "instructions": instructions,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoungeArgs {
    pub airport_code: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub guests: Option<u32>,
}

fn book_lounge_access_tool() -> Tool {
    Tool::new(
        "book_lounge_access",
        "Buy a day pass for an airport lounge",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string"},
                "date": {"type": "string", "description": "Visit date in YYYY-MM-DD format"},
                "guests": {"type": "integer", "description": "Additional guests, default 0"}
            },
            "required": ["airport_code"]
        }),
    )
}

pub fn book_lounge_access(args: LoungeArgs) -> Value {
    let guests = args.guests.unwrap_or(0);
    let pass_price = synth::price(39, 69);
    let total = ((pass_price * (guests + 1) as f64) * 100.0).round() / 100.0;
    json!({
        "booking_reference": synth::reference("LNG"),
        "airport_code": args.airport_code.to_uppercase(),
        "lounge": format!("Skydesk Club, Terminal {}", synth::between(1, 5)),
        "date": synth::travel_date(args.date.as_deref()),
        "guests": guests,
        "price_per_person": pass_price,
        "total_price": total,
        "amenities": synth::sample(&["showers", "hot buffet", "bar", "quiet room", "workspaces"], 3),
        "currency": "USD",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lounge_total_counts_guests() {
        let result = book_lounge_access(LoungeArgs {
            airport_code: "sfo".to_string(),
            date: Some("2026-12-01".to_string()),
            guests: Some(2),
        });
        let each = result["price_per_person"].as_f64().unwrap();
        let total = result["total_price"].as_f64().unwrap();
        assert!((total - each * 3.0).abs() < 0.01);
        assert_eq!(result["airport_code"], "SFO");
        assert_eq!(result["date"], "2026-12-01");
    }

    #[test]
    fn test_assistance_is_confirmed() {
        let result = request_special_assistance(AssistanceArgs {
            confirmation_code: "ABC123".to_string(),
            assistance_type: "Wheelchair".to_string(),
            notes: None,
        });
        assert_eq!(result["status"], "Confirmed");
        assert_eq!(result["assistance_type"], "wheelchair");
    }
}
