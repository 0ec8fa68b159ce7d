use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A JSON schema object describing the parameters the tool accepts
    pub parameters: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names of the parameters the schema marks as required
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Whatever a tool hands back. No schema is enforced on results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResult(pub Value);

impl ToolResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The result the registry hands back for a name it does not know
    pub fn not_implemented(name: &str) -> Self {
        Self(serde_json::json!({ "error": format!("{} not implemented yet", name) }))
    }

    /// Serialize to the text form carried by tool messages
    pub fn to_text(&self) -> String {
        // Serializing a Value cannot fail: every map key is already a string
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    pub fn from_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The `error` field, if the tool reported one
    pub fn error(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
