use serde::Deserialize;
use serde_json::{json, Value};

use super::synth;
use crate::errors::AgentResult;
use crate::models::tool::Tool;
use crate::registry::ToolRegistry;

pub const TOOLS: &[&str] = &["check_weather_impact", "get_disruption_alerts"];

const CONDITIONS: &[(&str, &str)] = &[
    ("Clear", "none"),
    ("Partly Cloudy", "none"),
    ("Rain", "low"),
    ("Low Visibility", "moderate"),
    ("Thunderstorms", "high"),
    ("Snow", "high"),
];

pub(super) fn register(registry: &mut ToolRegistry) -> AgentResult<()> {
    registry.register_fn(check_weather_impact_tool(), check_weather_impact)?;
    registry.register_fn(get_disruption_alerts_tool(), get_disruption_alerts)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherArgs {
    pub airport_code: String,
    #[serde(default)]
    pub date: Option<String>,
}

fn check_weather_impact_tool() -> Tool {
    Tool::new(
        "check_weather_impact",
        "Check forecast conditions at an airport and their expected effect on flights",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string"},
                "date": {"type": "string", "description": "YYYY-MM-DD, defaults to today"}
            },
            "required": ["airport_code"]
        }),
    )
}

pub fn check_weather_impact(args: WeatherArgs) -> Value {
    let (conditions, impact) = synth::pick(CONDITIONS);
    let expected_delay_minutes = match impact {
        "high" => synth::between(60, 180),
        "moderate" => synth::between(20, 60),
        "low" => synth::between(0, 20),
        _ => 0,
    };
    json!({
        "airport_code": args.airport_code.to_uppercase(),
        "date": args.date,
        "conditions": conditions,
        "temperature_f": synth::between(20, 95),
        "wind_mph": synth::between(0, 35),
        "impact": impact,
        "expected_delay_minutes": expected_delay_minutes,
        "waiver_available": impact == "high",
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisruptionArgs {
    #[serde(default)]
    pub airport_code: Option<String>,
    #[serde(default)]
    pub flight_number: Option<String>,
}

fn get_disruption_alerts_tool() -> Tool {
    Tool::new(
        "get_disruption_alerts",
        "List active operational alerts for an airport or flight",
        json!({
            "type": "object",
            "properties": {
                "airport_code": {"type": "string"},
                "flight_number": {"type": "string"}
            },
            "required": []
        }),
    )
}

pub fn get_disruption_alerts(args: DisruptionArgs) -> Value {
    let count = synth::between(0, 3) as usize;
    let alerts: Vec<Value> = synth::sample(
        &[
            ("Ground Delay Program", "Arrivals metered due to congestion"),
            ("Equipment Swap", "Aircraft type changed, seat assignments may move"),
            ("Gate Change", "Departure gate reassigned"),
            ("Crew Delay", "Inbound crew arriving late"),
            ("Runway Closure", "One runway closed for maintenance"),
        ],
        count,
    )
    .into_iter()
    .map(|(title, detail)| {
        json!({
            "alert_id": synth::reference("ALT"),
            "title": title,
            "detail": detail,
            "issued_at": synth::timestamp_in(-(synth::between(5, 240) as i64)),
        })
    })
    .collect();

    json!({
        "airport_code": args.airport_code.map(|c| c.to_uppercase()),
        "flight_number": args.flight_number,
        "active_alerts": alerts.len(),
        "alerts": alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_impact_offers_waiver() {
        for _ in 0..20 {
            let result = check_weather_impact(WeatherArgs {
                airport_code: "ord".to_string(),
                date: None,
            });
            let high = result["impact"] == "high";
            assert_eq!(result["waiver_available"], high);
            if result["impact"] == "none" {
                assert_eq!(result["expected_delay_minutes"], 0);
            }
        }
    }

    #[test]
    fn test_alert_count_matches_list() {
        let result = get_disruption_alerts(DisruptionArgs {
            airport_code: Some("jfk".to_string()),
            flight_number: None,
        });
        assert_eq!(
            result["active_alerts"].as_u64().unwrap() as usize,
            result["alerts"].as_array().unwrap().len()
        );
    }
}
