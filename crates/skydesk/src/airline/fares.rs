use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["get_fare_rules"];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(get_fare_rules_tool(), get_fare_rules)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FareRulesArgs {
    pub fare_class: String,
}

fn get_fare_rules_tool() -> Tool {
    Tool::new(
        "get_fare_rules",
        "Explain change, cancellation and refund rules for a fare type",
        json!({
            "type": "object",
            "properties": {
                "fare_class": {
                    "type": "string",
                    "enum": ["basic_economy", "economy", "premium_economy", "business", "first"]
                }
            },
            "required": ["fare_class"]
        }),
    )
}

/// Fixed policy per fare class. Nothing here is randomized.
pub fn get_fare_rules(args: FareRulesArgs) -> Value {
    let fare = args.fare_class.to_lowercase();
    let (changes, change_fee, refundable, seat_selection, upgrades) = match fare.as_str() {
        "basic_economy" => (false, None, false, "fee at check-in", false),
        "economy" => (true, Some(75), false, "free standard seats", true),
        "premium_economy" => (true, Some(0), false, "free", true),
        "business" | "first" => (true, Some(0), true, "free", true),
        _ => {
            return json!({
                "fare_class": fare,
                "error": format!("Unknown fare class {}", fare),
            })
        }
    };
    let cancellation = if refundable {
        "full refund"
    } else {
        "travel credit, 24 hour free cancellation"
    };
    json!({
        "fare_class": fare,
        "changes_allowed": changes,
        "change_fee": change_fee,
        "refundable": refundable,
        "cancellation": cancellation,
        "seat_selection": seat_selection,
        "upgrade_eligible": upgrades,
        "currency": "USD",
    })
}
