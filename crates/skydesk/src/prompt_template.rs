use include_dir::{include_dir, Dir};
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

use crate::models::tool::Tool;

static PROMPTS: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/prompts");

pub const DEFAULT_AIRLINE: &str = "Skydesk Air";

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

/// Render one of the templates compiled into the binary
pub fn load_prompt_file<T: Serialize>(name: &str, context_data: &T) -> Result<String, TeraError> {
    let template = PROMPTS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| TeraError::msg(format!("No prompt template named {}", name)))?;
    load_prompt(template, context_data)
}

#[derive(Serialize)]
struct SystemContext<'a> {
    airline: &'a str,
    tools: &'a [Tool],
}

/// The system prompt listing every tool in `tools`
pub fn system_prompt(airline: &str, tools: &[Tool]) -> Result<String, TeraError> {
    load_prompt_file("system.md", &SystemContext { airline, tools })
}
