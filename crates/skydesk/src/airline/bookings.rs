use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["retrieve_booking", "modify_booking", "cancel_booking"];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(retrieve_booking_tool(), retrieve_booking)?;
    registry.register_fn(modify_booking_tool(), modify_booking)?;
    registry.register_fn(cancel_booking_tool(), cancel_booking)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveBookingArgs {
    pub confirmation_code: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

fn retrieve_booking_tool() -> Tool {
    Tool::new(
        "retrieve_booking",
        "Retrieve an existing booking by its confirmation code",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string", "description": "Six character record locator, e.g. ABC123"},
                "last_name": {"type": "string", "description": "Passenger last name for verification"}
            },
            "required": ["confirmation_code"]
        }),
    )
}

pub fn retrieve_booking(args: RetrieveBookingArgs) -> Value {
    let flight_number = synth::flight_number();
    json!({
        "confirmation_code": args.confirmation_code.to_uppercase(),
        "last_name": args.last_name,
        "status": synth::pick(&["Confirmed", "Confirmed", "Ticketed", "Checked In"]),
        "flights": [{
            "flight_number": flight_number,
            "airline": synth::airline_name(&flight_number),
            "date": synth::travel_date(None),
            "departure_time": synth::clock_time(),
            "seat": synth::seat(),
        }],
        "passengers": synth::between(1, 3),
        "cabin_class": synth::pick(synth::CABINS),
        "total_paid": synth::price(150, 1400),
        "currency": "USD",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifyBookingArgs {
    pub confirmation_code: String,
    #[serde(default)]
    pub new_date: Option<String>,
    #[serde(default)]
    pub new_flight_number: Option<String>,
    #[serde(default)]
    pub cabin_class: Option<String>,
}

fn modify_booking_tool() -> Tool {
    Tool::new(
        "modify_booking",
        "Change the date, flight or cabin of an existing booking",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string"},
                "new_date": {"type": "string", "description": "New travel date in YYYY-MM-DD format"},
                "new_flight_number": {"type": "string"},
                "cabin_class": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["confirmation_code"]
        }),
    )
}

pub fn modify_booking(args: ModifyBookingArgs) -> Value {
    let mut changes = Vec::new();
    if let Some(date) = &args.new_date {
        changes.push(json!({"field": "date", "value": synth::travel_date(Some(date))}));
    }
    if let Some(flight) = &args.new_flight_number {
        changes.push(json!({"field": "flight_number", "value": flight}));
    }
    if let Some(class) = &args.cabin_class {
        changes.push(json!({"field": "cabin_class", "value": class.to_lowercase()}));
    }

    if changes.is_empty() {
        return json!({
            "confirmation_code": args.confirmation_code,
            "status": "No Changes",
            "message": "Provide a new date, flight number or cabin class to modify the booking",
        });
    }

    let change_fee = synth::pick(&[0.0, 75.0, 99.0, 150.0]);
    let fare_difference = synth::price(0, 220);
    json!({
        "confirmation_code": args.confirmation_code,
        "status": "Modified",
        "changes": changes,
        "change_fee": change_fee,
        "fare_difference": fare_difference,
        "amount_due": ((change_fee + fare_difference) * 100.0_f64).round() / 100.0,
        "currency": "USD",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CancelBookingArgs {
    pub confirmation_code: String,
    #[serde(default)]
    pub reason: Option<String>,
}

fn cancel_booking_tool() -> Tool {
    Tool::new(
        "cancel_booking",
        "Cancel a booking and calculate the refund or travel credit",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string"},
                "reason": {"type": "string"}
            },
            "required": ["confirmation_code"]
        }),
    )
}

pub fn cancel_booking(args: CancelBookingArgs) -> Value {
    let paid = synth::price(150, 1200);
    let refundable = synth::chance(0.4);
    let (refund, credit, method) = if refundable {
        (paid, 0.0, "original form of payment")
    } else {
        (0.0, paid, "travel credit valid 12 months")
    };
    json!({
        "confirmation_code": args.confirmation_code,
        "status": "Cancelled",
        "reason": args.reason,
        "original_amount": paid,
        "refund_amount": refund,
        "travel_credit": credit,
        "refund_method": method,
        "cancellation_reference": synth::reference("CXL"),
    })
}
