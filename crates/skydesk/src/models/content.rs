use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

impl TextContent {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for TextContent {
    fn from(text: &str) -> Self {
        TextContent::new(text)
    }
}

impl From<String> for TextContent {
    fn from(text: String) -> Self {
        TextContent::new(text)
    }
}
