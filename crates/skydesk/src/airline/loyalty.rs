use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["check_miles_balance", "redeem_miles", "compare_upgrade_options"];

const TIERS: &[(&str, u32)] = &[("Member", 0), ("Silver", 25_000), ("Gold", 50_000), ("Platinum", 75_000)];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(check_miles_balance_tool(), check_miles_balance)?;
    registry.register_fn(redeem_miles_tool(), redeem_miles)?;
    registry.register_fn(compare_upgrade_options_tool(), compare_upgrade_options)?;
    Ok(())
}

fn tier_for(qualifying_miles: u32) -> &'static str {
    TIERS
        .iter()
        .rev()
        .find(|(_, threshold)| qualifying_miles >= *threshold)
        .map(|(name, _)| *name)
        .unwrap_or("Member")
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MilesBalanceArgs {
    pub member_id: String,
}

fn check_miles_balance_tool() -> Tool {
    Tool::new(
        "check_miles_balance",
        "Check a frequent flyer account's miles balance and status tier",
        json!({
            "type": "object",
            "properties": {
                "member_id": {"type": "string", "description": "Frequent flyer number, e.g. FF123456"}
            },
            "required": ["member_id"]
        }),
    )
}

pub fn check_miles_balance(args: MilesBalanceArgs) -> Value {
    let qualifying = synth::between(0, 95_000);
    let tier = tier_for(qualifying);
    let next = TIERS.iter().find(|(_, threshold)| *threshold > qualifying);
    json!({
        "member_id": args.member_id,
        "miles_balance": synth::between(1_000, 250_000),
        "qualifying_miles": qualifying,
        "tier": tier,
        "next_tier": next.map(|(name, _)| *name),
        "miles_to_next_tier": next.map(|(_, threshold)| threshold - qualifying),
        "expiring_soon": synth::pick(&[0, 0, 2_500, 10_000]),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedeemMilesArgs {
    pub member_id: String,
    pub miles: u32,
    pub reward_type: String,
}

fn redeem_miles_tool() -> Tool {
    Tool::new(
        "redeem_miles",
        "Redeem miles for a flight, upgrade or other reward",
        json!({
            "type": "object",
            "properties": {
                "member_id": {"type": "string"},
                "miles": {"type": "integer", "description": "Number of miles to redeem"},
                "reward_type": {"type": "string", "enum": ["flight", "upgrade", "lounge_pass", "gift_card"]}
            },
            "required": ["member_id", "miles", "reward_type"]
        }),
    )
}

pub fn redeem_miles(args: RedeemMilesArgs) -> Value {
    let balance = synth::between(1_000, 250_000);
    if args.miles > balance {
        return json!({
            "member_id": args.member_id,
            "status": "Insufficient Miles",
            "requested": args.miles,
            "miles_balance": balance,
        });
    }
    json!({
        "member_id": args.member_id,
        "status": "Redeemed",
        "reward_type": args.reward_type,
        "miles_redeemed": args.miles,
        "remaining_balance": balance - args.miles,
        "redemption_code": synth::reference("RWD"),
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeArgs {
    pub confirmation_code: String,
    #[serde(default)]
    pub current_cabin: Option<String>,
}

fn compare_upgrade_options_tool() -> Tool {
    Tool::new(
        "compare_upgrade_options",
        "Compare cash and miles prices to upgrade a booking to a higher cabin",
        json!({
            "type": "object",
            "properties": {
                "confirmation_code": {"type": "string"},
                "current_cabin": {"type": "string", "enum": synth::CABINS}
            },
            "required": ["confirmation_code"]
        }),
    )
}

pub fn compare_upgrade_options(args: UpgradeArgs) -> Value {
    let current = args.current_cabin.unwrap_or_else(|| "economy".to_string()).to_lowercase();
    let position = synth::CABINS.iter().position(|c| *c == current).unwrap_or(0);
    let options: Vec<Value> = synth::CABINS[position + 1..]
        .iter()
        .enumerate()
        .map(|(step, cabin)| {
            let scale = (step + 1) as u32;
            json!({
                "cabin": cabin,
                "cash_price": synth::price(79 * scale, 260 * scale),
                "miles_price": synth::between(10, 25) * 1_000 * scale,
                "availability": synth::pick(&["Available", "Available", "Waitlist"]),
            })
        })
        .collect();

    json!({
        "confirmation_code": args.confirmation_code,
        "current_cabin": current,
        "options": options,
        "currency": "USD",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(tier_for(0), "Member");
        assert_eq!(tier_for(24_999), "Member");
        assert_eq!(tier_for(25_000), "Silver");
        assert_eq!(tier_for(80_000), "Platinum");
    }

    #[test]
    fn test_upgrades_only_offer_higher_cabins() {
        let result = compare_upgrade_options(UpgradeArgs {
            confirmation_code: "ABC123".to_string(),
            current_cabin: Some("business".to_string()),
        });
        let options = result["options"].as_array().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0]["cabin"], "first");
    }

    #[test]
    fn test_redeem_never_goes_negative() {
        let result = redeem_miles(RedeemMilesArgs {
            member_id: "FF123456".to_string(),
            miles: 10_000_000,
            reward_type: "flight".to_string(),
        });
        assert_eq!(result["status"], "Insufficient Miles");
    }
}
