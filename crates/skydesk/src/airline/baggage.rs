use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &[
    "check_baggage_allowance",
    "track_baggage",
    "report_baggage_issue",
    "get_baggage_info",
];

const BAG_STATUSES: &[&str] = &[
    "Checked In",
    "Loaded on Aircraft",
    "In Transit",
    "Arrived at Destination",
    "Ready for Pickup",
];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(check_baggage_allowance_tool(), check_baggage_allowance)?;
    registry.register_fn(track_baggage_tool(), track_baggage)?;
    registry.register_fn(report_baggage_issue_tool(), report_baggage_issue)?;
    registry.register_fn(get_baggage_info_tool(), get_baggage_info)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AllowanceArgs {
    #[serde(default)]
    pub cabin_class: Option<String>,
    #[serde(default)]
    pub international: Option<bool>,
    #[serde(default)]
    pub loyalty_tier: Option<String>,
}

fn check_baggage_allowance_tool() -> Tool {
    Tool::new(
        "check_baggage_allowance",
        "Look up carry-on and checked baggage allowance and fees",
        json!({
            "type": "object",
            "properties": {
                "cabin_class": {"type": "string", "enum": synth::CABINS},
                "international": {"type": "boolean", "description": "Whether the itinerary is international"},
                "loyalty_tier": {"type": "string", "description": "Frequent flyer tier, e.g. Gold"}
            },
            "required": []
        }),
    )
}

pub fn check_baggage_allowance(args: AllowanceArgs) -> Value {
    let class = args.cabin_class.unwrap_or_else(|| "economy".to_string()).to_lowercase();
    let international = args.international.unwrap_or(false);
    let mut free_checked: u32 = match class.as_str() {
        "first" => 3,
        "business" => 2,
        "premium_economy" => 1,
        _ if international => 1,
        _ => 0,
    };
    if args.loyalty_tier.is_some() {
        free_checked += 1;
    }
    let max_weight_lbs = if class == "economy" { 50 } else { 70 };
    let first_bag_fee = if free_checked > 0 { 0 } else { 35 };
    let second_bag_fee = if free_checked > 1 { 0 } else { 45 };

    json!({
        "cabin_class": class,
        "international": international,
        "loyalty_tier": args.loyalty_tier,
        "carry_on": {"pieces": 1, "max_weight_lbs": 35, "dimensions_in": "22 x 14 x 9"},
        "personal_item": {"pieces": 1, "dimensions_in": "17 x 13 x 9"},
        "checked": {
            "free_pieces": free_checked,
            "max_weight_lbs": max_weight_lbs,
            "first_bag_fee": first_bag_fee,
            "second_bag_fee": second_bag_fee,
            "overweight_fee": 100,
        },
        "currency": "USD",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaggageTagArgs {
    pub baggage_tag: String,
}

fn track_baggage_tool() -> Tool {
    Tool::new(
        "track_baggage",
        "Track the journey of a checked bag by its tag number",
        json!({
            "type": "object",
            "properties": {
                "baggage_tag": {"type": "string", "description": "Bag tag number, e.g. 123456789"}
            },
            "required": ["baggage_tag"]
        }),
    )
}

pub fn track_baggage(args: BaggageTagArgs) -> Value {
    let stage = synth::between(1, BAG_STATUSES.len() as u32) as usize;
    let airports = synth::sample(&["SFO", "DEN", "ORD", "JFK", "ATL", "SEA"], 3);
    let history: Vec<Value> = BAG_STATUSES[..stage]
        .iter()
        .enumerate()
        .map(|(index, status)| {
            json!({
                "status": status,
                "location": airports[index.min(airports.len() - 1)],
                "time": synth::timestamp_in(-((stage - index) as i64) * 45),
            })
        })
        .collect();

    json!({
        "baggage_tag": args.baggage_tag,
        "status": BAG_STATUSES[stage - 1],
        "history": history,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportIssueArgs {
    pub baggage_tag: String,
    pub issue_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn report_baggage_issue_tool() -> Tool {
    Tool::new(
        "report_baggage_issue",
        "File a report for a delayed, damaged or lost bag",
        json!({
            "type": "object",
            "properties": {
                "baggage_tag": {"type": "string"},
                "issue_type": {"type": "string", "enum": ["delayed", "damaged", "lost", "missing_items"]},
                "description": {"type": "string"}
            },
            "required": ["baggage_tag", "issue_type"]
        }),
    )
}

pub fn report_baggage_issue(args: ReportIssueArgs) -> Value {
    let issue = args.issue_type.to_lowercase();
    let compensation = match issue.as_str() {
        "lost" => "Up to $3,800 after 21 days",
        "damaged" => "Repair or replacement after inspection",
        "delayed" => "Interim expenses up to $50 per day",
        _ => "Reviewed case by case",
    };
    json!({
        "report_id": synth::reference("BAG"),
        "baggage_tag": args.baggage_tag,
        "issue_type": issue,
        "description": args.description,
        "status": "Filed",
        "expected_response": format!("within {} hours", synth::pick(&[24, 48, 72])),
        "compensation_policy": compensation,
    })
}

fn get_baggage_info_tool() -> Tool {
    Tool::new(
        "get_baggage_info",
        "Get baggage information by baggage tag number",
        json!({
            "type": "object",
            "properties": {
                "baggage_tag": {"type": "string"}
            },
            "required": ["baggage_tag"]
        }),
    )
}

pub fn get_baggage_info(args: BaggageTagArgs) -> Value {
    json!({
        "baggage_tag": args.baggage_tag,
        "location": format!("Loaded on Flight {}", synth::flight_number()),
        "status": synth::pick(BAG_STATUSES),
        "weight_lbs": synth::between(18, 52),
    })
}
