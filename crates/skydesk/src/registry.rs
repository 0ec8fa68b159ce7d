use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolResult};

/// A tool implementation. Handlers are plain `Fn`s so that no invocation can mutate state
/// another invocation depends on.
pub type ToolHandler = Arc<dyn Fn(Value) -> AgentResult<Value> + Send + Sync>;

struct RegisteredTool {
    tool: Tool,
    handler: ToolHandler,
}

/// A closed set of named operations the agent may invoke on the model's behalf
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with a handler that receives the raw argument object
    pub fn register(&mut self, tool: Tool, handler: ToolHandler) -> AgentResult<()> {
        if tool.name.is_empty() {
            return Err(AgentError::Internal("tool name must not be empty".to_string()));
        }
        if self.tools.contains_key(&tool.name) {
            return Err(AgentError::Internal(format!(
                "tool already registered: {}",
                tool.name
            )));
        }
        self.tools
            .insert(tool.name.clone(), RegisteredTool { tool, handler });
        Ok(())
    }

    /// Register a tool whose arguments are bound into `A` before `f` runs
    pub fn register_fn<A, F>(&mut self, tool: Tool, f: F) -> AgentResult<()>
    where
        A: DeserializeOwned + 'static,
        F: Fn(A) -> Value + Send + Sync + 'static,
    {
        let name = tool.name.clone();
        let handler: ToolHandler = Arc::new(move |arguments| {
            let bound = bind_arguments::<A>(&name, arguments)?;
            Ok(f(bound))
        });
        self.register(tool, handler)
    }

    /// The advertised catalog, sorted by name
    pub fn list_specs(&self) -> Vec<Tool> {
        let mut specs: Vec<Tool> = self.tools.values().map(|entry| entry.tool.clone()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name).map(|entry| &entry.tool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check `arguments` against the declared parameter schema of `name`.
    ///
    /// Unknown names pass: invoking them yields an error payload rather than a failure.
    pub fn bind(&self, name: &str, arguments: &Value) -> AgentResult<()> {
        match self.tools.get(name) {
            Some(entry) => check_schema(&entry.tool, arguments).map_err(|reason| {
                AgentError::InvalidParameters {
                    tool: name.to_string(),
                    reason,
                }
            }),
            None => Ok(()),
        }
    }

    /// Run a tool by name.
    ///
    /// An unknown name is not an error: the result carries an `error` field the model can
    /// read and react to. Arguments that do not bind are an `InvalidParameters` error.
    pub fn invoke(&self, name: &str, arguments: Value) -> AgentResult<ToolResult> {
        let Some(entry) = self.tools.get(name) else {
            tracing::warn!(tool = name, "model requested a tool that is not registered");
            return Ok(ToolResult::not_implemented(name));
        };

        self.bind(name, &arguments)?;
        let output = (entry.handler)(arguments)?;
        Ok(ToolResult::new(output))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_specs().iter().map(|t| &t.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Deserialize a tool's argument object into its typed parameters
pub fn bind_arguments<A: DeserializeOwned>(tool: &str, arguments: Value) -> AgentResult<A> {
    serde_json::from_value(arguments).map_err(|e| AgentError::InvalidParameters {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn check_schema(tool: &Tool, arguments: &Value) -> Result<(), String> {
    let Some(supplied) = arguments.as_object() else {
        return Err(format!("expected an object of arguments, got {}", arguments));
    };

    for name in tool.required() {
        match supplied.get(name) {
            None | Some(Value::Null) => return Err(format!("missing required argument `{}`", name)),
            Some(_) => {}
        }
    }

    let properties = tool.parameters.get("properties").and_then(Value::as_object);
    for (name, value) in supplied {
        let Some(property) = properties.and_then(|p| p.get(name)) else {
            return Err(format!("unexpected argument `{}`", name));
        };
        if value.is_null() {
            continue;
        }
        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            if !matches_type(expected, value) {
                return Err(format!(
                    "argument `{}` should be of type {}, got {}",
                    name, expected, value
                ));
            }
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct EchoArgs {
        message: String,
        #[serde(default)]
        times: Option<u32>,
    }

    fn echo_tool() -> Tool {
        Tool::new(
            "echo",
            "Echoes back the input",
            json!({
                "type": "object",
                "properties": {
                    "message": {"type": "string"},
                    "times": {"type": "integer"}
                },
                "required": ["message"]
            }),
        )
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(echo_tool(), |args: EchoArgs| {
                json!({ "echo": args.message.repeat(args.times.unwrap_or(1) as usize) })
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_invoke_known_tool() {
        let result = registry()
            .invoke("echo", json!({"message": "hi", "times": 2}))
            .unwrap();
        assert_eq!(result.value(), &json!({"echo": "hihi"}));
    }

    #[test]
    fn test_invoke_unknown_tool_returns_payload() {
        let result = registry().invoke("nonexistent_tool", json!({})).unwrap();
        assert_eq!(
            result.value(),
            &json!({"error": "nonexistent_tool not implemented yet"})
        );
    }

    #[test]
    fn test_missing_argument_is_invalid_parameters() {
        let err = registry().invoke("echo", json!({})).unwrap_err();
        match err {
            AgentError::InvalidParameters { tool, reason } => {
                assert_eq!(tool, "echo");
                assert!(reason.contains("message"));
            }
            other => panic!("Expected InvalidParameters, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_and_mistyped_arguments() {
        let registry = registry();
        assert!(matches!(
            registry.bind("echo", &json!({"message": "hi", "volume": 11})),
            Err(AgentError::InvalidParameters { .. })
        ));
        assert!(matches!(
            registry.bind("echo", &json!({"message": 42})),
            Err(AgentError::InvalidParameters { .. })
        ));
        assert!(matches!(
            registry.bind("echo", &json!(["hi"])),
            Err(AgentError::InvalidParameters { .. })
        ));
        assert!(registry.bind("echo", &json!({"message": "hi", "times": null})).is_ok());
        assert!(registry.bind("unknown", &json!({"anything": 1})).is_ok());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        let result = registry.register_fn(echo_tool(), |_: EchoArgs| json!({}));
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_specs_sorted() {
        let mut registry = registry();
        registry
            .register(
                Tool::new("alpha", "First", json!({"type": "object", "properties": {}})),
                Arc::new(|_| Ok(json!({}))),
            )
            .unwrap();
        let names: Vec<_> = registry.list_specs().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "echo"]);
    }
}
