use super::{
    base::Provider, configs::ProviderConfig, ollama::OllamaProvider, openai::OpenAiProvider,
};
use anyhow::Result;

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig};

    #[test]
    fn test_builds_each_provider() {
        assert!(get_provider(ProviderConfig::OpenAi(OpenAiProviderConfig::new("key"))).is_ok());
        assert!(get_provider(ProviderConfig::Ollama(OllamaProviderConfig::default())).is_ok());
    }
}
