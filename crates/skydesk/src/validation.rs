//! Best-effort answer validation.
//!
//! After a tool batch or a final answer the driver can ask an external validation service
//! whether the exchange should be flagged for human review. The service only annotates: a
//! verdict never changes the answer, and a failing or missing service degrades to an
//! unflagged verdict that carries the reason.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::models::conversation::Conversation;
use crate::models::tool::Tool;
use crate::providers::utils::{messages_to_openai_spec, tools_to_openai_spec};

pub const VALIDATION_HOST: &str = "https://api-codex.cleanlab.ai";
pub const INTEGRATION: &str = "skydesk";
const VALIDATION_TIMEOUT_SECS: u64 = 60;

/// The validation service's opinion of one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub should_guardrail: bool,
    #[serde(default)]
    pub expert_answer: Option<String>,
    #[serde(default)]
    pub escalated_to_sme: bool,
    /// Set when no real verdict could be obtained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    /// An unflagged verdict explaining why validation did not happen
    pub fn degraded<S: Into<String>>(reason: S) -> Self {
        Self {
            should_guardrail: false,
            expert_answer: None,
            escalated_to_sme: false,
            error: Some(reason.into()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Everything the validation service sees about an exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRequest {
    pub query: String,
    pub context: String,
    /// The conversation in chat completions wire form
    pub messages: Vec<Value>,
    pub response: String,
    pub metadata: Value,
    pub tools: Vec<Value>,
}

impl ValidationRequest {
    pub fn new(
        query: &str,
        conversation: &Conversation,
        response: &str,
        thread_id: &str,
        tools: &[Tool],
    ) -> Self {
        Self {
            query: query.to_string(),
            context: String::new(),
            messages: messages_to_openai_spec(conversation.messages()),
            response: response.to_string(),
            metadata: json!({"integration": INTEGRATION, "thread_id": thread_id}),
            // Registry names are unique, so this cannot hit the duplicate check
            tools: tools_to_openai_spec(tools).unwrap_or_default(),
        }
    }
}

#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, request: &ValidationRequest) -> Result<Verdict>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub host: String,
    pub api_key: String,
    pub project_id: String,
    pub timeout_secs: u64,
}

impl ValidationConfig {
    pub fn new<K: Into<String>, P: Into<String>>(api_key: K, project_id: P) -> Self {
        Self {
            host: VALIDATION_HOST.to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            timeout_secs: VALIDATION_TIMEOUT_SECS,
        }
    }
}

/// A validation project reached over HTTP
pub struct HttpValidator {
    client: Client,
    config: ValidationConfig,
}

impl HttpValidator {
    pub fn new(config: ValidationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }
}

#[async_trait]
impl Validator for HttpValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<Verdict> {
        let url = format!(
            "{}/api/projects/{}/validate",
            self.config.host.trim_end_matches('/'),
            self.config.project_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<Verdict>().await?),
            status => Err(anyhow!("Validation request failed: {}", status)),
        }
    }
}

/// The validator used by a driver, if any.
///
/// [`ValidationChannel::check`] never fails.
pub struct ValidationChannel {
    validator: Option<Box<dyn Validator>>,
}

impl ValidationChannel {
    pub fn disabled() -> Self {
        Self { validator: None }
    }

    pub fn new(validator: Box<dyn Validator>) -> Self {
        Self {
            validator: Some(validator),
        }
    }

    /// An HTTP channel when both credentials are present, otherwise a disabled one
    pub fn from_credentials(
        host: Option<String>,
        api_key: Option<String>,
        project_id: Option<String>,
    ) -> Result<Self> {
        match (api_key, project_id) {
            (Some(api_key), Some(project_id)) => {
                let mut config = ValidationConfig::new(api_key, project_id);
                if let Some(host) = host {
                    config.host = host;
                }
                Ok(Self::new(Box::new(HttpValidator::new(config)?)))
            }
            _ => {
                tracing::warn!("validation key or project id missing, validation disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.validator.is_some()
    }

    pub async fn check(&self, request: &ValidationRequest) -> Verdict {
        let Some(validator) = &self.validator else {
            return Verdict::degraded("validation not configured");
        };

        match validator.validate(request).await {
            Ok(verdict) => {
                if verdict.should_guardrail {
                    tracing::info!(
                        escalated = verdict.escalated_to_sme,
                        "validation flagged the response"
                    );
                }
                verdict
            }
            Err(err) => {
                tracing::warn!(error = %err, "validation failed");
                Verdict::degraded(err.to_string())
            }
        }
    }
}

impl Default for ValidationChannel {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ValidationRequest {
        let mut conversation = Conversation::new();
        conversation.push(Message::user().with_text("Is UA415 on time?"));
        conversation.push(Message::assistant().with_text("Yes, UA415 is on time."));
        ValidationRequest::new(
            "Is UA415 on time?",
            &conversation,
            "Yes, UA415 is on time.",
            "thread-1",
            &[],
        )
    }

    fn channel(server: &MockServer) -> ValidationChannel {
        let config = ValidationConfig {
            host: server.uri(),
            ..ValidationConfig::new("codex-key", "proj-1")
        };
        ValidationChannel::new(Box::new(HttpValidator::new(config).unwrap()))
    }

    struct FailingValidator;

    #[async_trait]
    impl Validator for FailingValidator {
        async fn validate(&self, _request: &ValidationRequest) -> Result<Verdict> {
            Err(anyhow!("validation service unreachable"))
        }
    }

    #[test]
    fn test_request_shape() {
        let request = request();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0]["role"], "user");
        assert_eq!(request.metadata["integration"], INTEGRATION);
        assert_eq!(request.metadata["thread_id"], "thread-1");
        assert_eq!(request.context, "");
    }

    #[tokio::test]
    async fn test_disabled_channel_degrades() {
        let verdict = ValidationChannel::disabled().check(&request()).await;
        assert!(!verdict.should_guardrail);
        assert_eq!(verdict.error.as_deref(), Some("validation not configured"));
    }

    #[tokio::test]
    async fn test_failing_validator_degrades() {
        let channel = ValidationChannel::new(Box::new(FailingValidator));
        let verdict = channel.check(&request()).await;
        assert!(!verdict.should_guardrail);
        assert_eq!(verdict.error.as_deref(), Some("validation service unreachable"));
    }

    #[tokio::test]
    async fn test_http_verdict_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/projects/proj-1/validate"))
            .and(header("Authorization", "Bearer codex-key"))
            .and(body_partial_json(json!({"query": "Is UA415 on time?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "should_guardrail": true,
                "expert_answer": "UA415 is delayed by 40 minutes.",
                "escalated_to_sme": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = channel(&server).check(&request()).await;
        assert!(verdict.should_guardrail);
        assert!(verdict.escalated_to_sme);
        assert_eq!(
            verdict.expert_answer.as_deref(),
            Some("UA415 is delayed by 40 minutes.")
        );
        assert!(!verdict.is_degraded());
    }

    #[tokio::test]
    async fn test_http_error_degrades() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let verdict = channel(&server).check(&request()).await;
        assert!(!verdict.should_guardrail);
        assert!(verdict.error.unwrap().contains("500"));
    }

    #[test]
    fn test_missing_credentials_disable_channel() {
        let channel = ValidationChannel::from_credentials(None, Some("key".to_string()), None).unwrap();
        assert!(!channel.is_enabled());
        let channel = ValidationChannel::from_credentials(
            None,
            Some("key".to_string()),
            Some("proj".to_string()),
        )
        .unwrap();
        assert!(channel.is_enabled());
    }
}
