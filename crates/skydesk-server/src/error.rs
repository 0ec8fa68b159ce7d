use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// The environment variable that sets a settings field.
///
/// Serde reports missing fields by bare name, and every required field lives under
/// `provider`, so bare names are resolved there.
pub fn to_env_var(field: &str) -> String {
    let path = match field {
        "provider" => "provider.type".to_string(),
        "type" | "api_key" => format!("provider.{}", field),
        other => other.to_string(),
    };
    format!("SKYDESK_{}", path.replace('.', "__").to_uppercase())
}
