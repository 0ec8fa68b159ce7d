use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use skydesk::agent::Agent;
use skydesk::airline;
use skydesk::driver::{Driver, DEFAULT_MAX_STEPS};
use skydesk::prompt_template::{system_prompt, DEFAULT_AIRLINE};
use skydesk::providers::configs::{
    OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig, OLLAMA_MODEL, OPENAI_MODEL,
};
use skydesk::providers::factory;
use skydesk::validation::ValidationChannel;

mod prompt;
mod session;

use prompt::cliclack::CliclackPrompt;
use session::Session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Provider option (open-ai or ollama)
    #[arg(short, long, default_value = "open-ai")]
    #[arg(value_enum)]
    provider: ProviderVariant,

    /// OpenAI API Key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Override the provider host
    #[arg(long)]
    host: Option<String>,

    /// Model to use (defaults to the provider's default model)
    #[arg(short, long)]
    model: Option<String>,

    /// Tool rounds allowed per question before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Airline name used in the system prompt
    #[arg(long, default_value = DEFAULT_AIRLINE)]
    airline: String,

    /// Ask a single question and exit instead of starting a chat
    #[arg(long)]
    message: Option<String>,

    /// Validation service host
    #[arg(long, env = "CODEX_HOST")]
    validation_host: Option<String>,

    /// Validation service key
    #[arg(long, env = "CODEX_API_KEY", hide_env_values = true)]
    validation_key: Option<String>,

    /// Validation project id
    #[arg(long, env = "CLEANLAB_PROJECT_ID")]
    project_id: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ProviderVariant {
    OpenAi,
    Ollama,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let driver = build_driver(&cli)?;
    let mut session = Session::new(driver, Box::new(CliclackPrompt::new()));

    match &cli.message {
        Some(message) => session.headless_start(message).await,
        None => session.start().await,
    }
}

fn build_driver(cli: &Cli) -> Result<Driver> {
    let provider = factory::get_provider(provider_config(cli)?)?;
    let registry = airline::registry()?;
    let prompt = system_prompt(&cli.airline, &registry.list_specs())?;
    let agent = Agent::new(provider, registry).with_system_prompt(prompt);

    let validation = ValidationChannel::from_credentials(
        cli.validation_host.clone(),
        cli.validation_key.clone(),
        cli.project_id.clone(),
    )?;

    Ok(Driver::new(agent, validation).with_max_steps(cli.max_steps))
}

fn provider_config(cli: &Cli) -> Result<ProviderConfig> {
    match cli.provider {
        ProviderVariant::OpenAi => {
            let api_key = cli.api_key.clone().context(
                "API key must be provided via --api-key or OPENAI_API_KEY environment variable",
            )?;
            let mut config = OpenAiProviderConfig::new(api_key);
            if let Some(host) = &cli.host {
                config.host = host.clone();
            }
            config.model = cli.model.clone().unwrap_or_else(|| OPENAI_MODEL.to_string());
            Ok(ProviderConfig::OpenAi(config))
        }
        ProviderVariant::Ollama => {
            let mut config = OllamaProviderConfig::default();
            if let Some(host) = &cli.host {
                config.host = host.clone();
            }
            config.model = cli.model.clone().unwrap_or_else(|| OLLAMA_MODEL.to_string());
            Ok(ProviderConfig::Ollama(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_key() {
        let cli = Cli::try_parse_from(["skydesk", "--provider", "ollama"]).unwrap();
        let config = provider_config(&cli).unwrap();
        assert_eq!(config.name(), "ollama");
        assert_eq!(config.model(), OLLAMA_MODEL);
        assert_eq!(cli.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn test_openai_overrides() {
        let cli = Cli::try_parse_from([
            "skydesk",
            "--api-key",
            "sk-test",
            "--model",
            "gpt-4o",
            "--host",
            "http://localhost:8080",
        ])
        .unwrap();
        let ProviderConfig::OpenAi(config) = provider_config(&cli).unwrap() else {
            panic!("expected an OpenAI config");
        };
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.host, "http://localhost:8080");
    }
}
