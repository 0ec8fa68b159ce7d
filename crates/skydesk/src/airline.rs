//! The airline support tool catalog.
//!
//! Every tool returns plausible synthetic data; nothing here talks to a reservation system.
//! Tools are grouped by the kind of question they answer so front ends can show the catalog
//! the way a customer would browse it.

mod airports;
mod alerts;
mod baggage;
mod bookings;
mod fares;
mod flights;
mod loyalty;
mod seats;
mod services;
pub mod synth;

use crate::errors::AgentResult;
use crate::registry::ToolRegistry;

/// A named group of tools, in display order
pub struct Category {
    pub name: &'static str,
    pub tools: &'static [&'static str],
}

/// The catalog grouped for display
pub fn categories() -> Vec<Category> {
    vec![
        Category { name: "Flight Search & Booking", tools: flights::TOOLS },
        Category { name: "Booking Management", tools: bookings::TOOLS },
        Category { name: "Seats", tools: seats::TOOLS },
        Category { name: "Baggage", tools: baggage::TOOLS },
        Category { name: "Airport Information", tools: airports::TOOLS },
        Category { name: "Loyalty & Upgrades", tools: loyalty::TOOLS },
        Category { name: "Special Services", tools: services::TOOLS },
        Category { name: "Weather & Disruptions", tools: alerts::TOOLS },
        Category { name: "Fares", tools: fares::TOOLS },
    ]
}

/// Build a registry holding the full airline catalog
pub fn registry() -> AgentResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    flights::register(&mut registry)?;
    bookings::register(&mut registry)?;
    seats::register(&mut registry)?;
    baggage::register(&mut registry)?;
    airports::register(&mut registry)?;
    loyalty::register(&mut registry)?;
    services::register(&mut registry)?;
    alerts::register(&mut registry)?;
    fares::register(&mut registry)?;
    tracing::debug!(tools = registry.len(), "airline catalog registered");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AgentError;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_every_categorized_tool_is_registered() {
        let registry = registry().unwrap();
        let listed: Vec<&str> = categories().iter().flat_map(|c| c.tools.iter().copied()).collect();
        let unique: HashSet<&str> = listed.iter().copied().collect();

        assert_eq!(listed.len(), unique.len(), "a tool appears in two categories");
        assert_eq!(registry.len(), listed.len());
        for name in listed {
            assert!(registry.contains(name), "{} is not registered", name);
        }
    }

    #[test]
    fn test_specs_have_object_schemas() {
        let registry = registry().unwrap();
        for tool in registry.list_specs() {
            assert_eq!(tool.parameters["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty(), "{}", tool.name);
            for required in tool.required() {
                assert!(
                    tool.parameters["properties"].get(required).is_some(),
                    "{} requires undeclared {}",
                    tool.name,
                    required
                );
            }
        }
    }

    #[test]
    fn test_flight_status_through_registry() {
        let registry = registry().unwrap();
        let result = registry
            .invoke("check_flight_status", json!({"flight_number": "AA123"}))
            .unwrap();
        assert_eq!(result.value()["flight_number"], "AA123");
        assert!(synth::FLIGHT_STATUSES.contains(&result.value()["status"].as_str().unwrap()));
    }

    #[test]
    fn test_missing_required_argument_is_rejected() {
        let registry = registry().unwrap();
        let err = registry.invoke("check_flight_status", json!({})).unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters { tool, .. } if tool == "check_flight_status"));
    }

    #[test]
    fn test_unknown_tool_yields_error_payload() {
        let registry = registry().unwrap();
        let result = registry.invoke("teleport_passenger", json!({})).unwrap();
        assert_eq!(result.error(), Some("teleport_passenger not implemented yet"));
    }
}
