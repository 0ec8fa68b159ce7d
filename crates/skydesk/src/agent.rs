use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::errors::{AgentError, AgentResult};
use crate::models::conversation::Conversation;
use crate::models::message::{Message, ToolRequest};
use crate::models::tool::{Tool, ToolResult};
use crate::prompt_template::{system_prompt, DEFAULT_AIRLINE};
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;

/// One tool call the agent ran on the model's behalf
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExecution {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub result: ToolResult,
}

/// What a single step produced
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The model asked for tools; all of them ran and their results are in the conversation
    ToolsExecuted(Vec<ToolExecution>),
    /// The model answered in natural language
    Answer(String),
}

/// Agent integrates a completion endpoint with the tools it may pilot.
///
/// Each call to [`Agent::step`] makes exactly one completion request and then either runs
/// one tool batch or records a final answer. Looping until an answer is the caller's job.
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    system_prompt: Option<String>,
}

impl Agent {
    /// Create a new Agent with the specified provider and tool catalog
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            system_prompt: None,
        }
    }

    /// Use a fixed system prompt instead of the rendered default
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// The advertised tool catalog
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.list_specs()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn get_system_prompt(&self, tools: &[Tool]) -> AgentResult<String> {
        match &self.system_prompt {
            Some(prompt) => Ok(prompt.clone()),
            None => system_prompt(DEFAULT_AIRLINE, tools)
                .map_err(|e| AgentError::Internal(e.to_string())),
        }
    }

    /// Start or repeat a step for `user_input`.
    ///
    /// The user message is appended unless the conversation already ends with the same
    /// user message, so an accidental second call does not duplicate it.
    pub async fn step(
        &self,
        conversation: &mut Conversation,
        user_input: &str,
    ) -> AgentResult<Step> {
        if !conversation.push_user_once(user_input) {
            tracing::debug!("user message already last in conversation, not appending");
        }
        self.resume(conversation).await
    }

    /// Continue a turn after a tool batch without adding user input
    pub async fn resume(&self, conversation: &mut Conversation) -> AgentResult<Step> {
        let tools = self.tools();
        let system_prompt = self.get_system_prompt(&tools)?;

        let (response, usage) = self
            .provider
            .complete(&system_prompt, conversation.messages(), &tools)
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;
        tracing::debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "completion received"
        );

        let requests: Vec<ToolRequest> = response.tool_requests().into_iter().cloned().collect();
        if requests.is_empty() {
            let text = response.text();
            conversation.push(Message::assistant().with_text(text.clone()));
            tracing::info!(chars = text.len(), "model answered");
            return Ok(Step::Answer(text));
        }

        // Nothing is appended until the whole batch is known to be executable
        self.check_batch(&requests)?;
        conversation.push(response);

        let mut executions = Vec::with_capacity(requests.len());
        let mut pending = requests.into_iter();
        while let Some(request) = pending.next() {
            tracing::info!(tool = %request.name, id = %request.id, "invoking tool");
            let result = match self.registry.invoke(&request.name, request.arguments.clone()) {
                Ok(result) => result,
                Err(err) => {
                    // Answer every open request so the conversation stays well formed
                    let failed = ToolResult::new(json!({ "error": err.to_string() }));
                    conversation.push(Message::tool().with_tool_response(&request.id, &failed));
                    let skipped = ToolResult::new(json!({
                        "error": "not executed: an earlier tool call in this batch failed"
                    }));
                    for rest in pending {
                        conversation.push(Message::tool().with_tool_response(&rest.id, &skipped));
                    }
                    tracing::error!(tool = %request.name, error = %err, "tool invocation failed");
                    return Err(err);
                }
            };

            if let Some(error) = result.error() {
                tracing::warn!(tool = %request.name, error, "tool reported an error");
            }
            conversation.push(Message::tool().with_tool_response(&request.id, &result));
            executions.push(ToolExecution {
                id: request.id,
                name: request.name,
                arguments: request.arguments,
                result,
            });
        }

        Ok(Step::ToolsExecuted(executions))
    }

    /// Reject a batch whose ids cannot be paired with results or whose arguments do not bind
    fn check_batch(&self, requests: &[ToolRequest]) -> AgentResult<()> {
        let mut ids = HashSet::new();
        for request in requests {
            if request.id.is_empty() || !ids.insert(request.id.as_str()) {
                return Err(AgentError::Provider(format!(
                    "tool call ids must be present and unique, got {:?} for {}",
                    request.id, request.name
                )));
            }
            self.registry.bind(&request.name, &request.arguments)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use crate::providers::mock::MockProvider;

    fn status_registry() -> ToolRegistry {
        #[derive(serde::Deserialize)]
        struct StatusArgs {
            flight_number: String,
        }

        let mut registry = ToolRegistry::new();
        registry
            .register_fn(
                Tool::new(
                    "check_flight_status",
                    "Check the status of a flight",
                    json!({
                        "type": "object",
                        "properties": {"flight_number": {"type": "string"}},
                        "required": ["flight_number"]
                    }),
                ),
                |args: StatusArgs| json!({"flight_number": args.flight_number, "status": "On Time"}),
            )
            .unwrap();
        registry
    }

    fn agent(responses: Vec<Message>) -> Agent {
        Agent::new(Box::new(MockProvider::new(responses)), status_registry())
    }

    #[tokio::test]
    async fn test_answer_is_appended() -> AgentResult<()> {
        let agent = agent(vec![Message::assistant().with_text("Hello! How can I help?")]);
        let mut conversation = Conversation::new();

        let step = agent.step(&mut conversation, "Hi").await?;

        assert_eq!(step, Step::Answer("Hello! How can I help?".to_string()));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(conversation.messages()[1].text(), "Hello! How can I help?");
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_batch_is_answered_in_order() -> AgentResult<()> {
        let agent = agent(vec![Message::assistant()
            .with_tool_request("call_1", "check_flight_status", json!({"flight_number": "UA415"}))
            .with_tool_request("call_2", "lookup_pet_policy", json!({}))
            .with_tool_request("call_3", "check_flight_status", json!({"flight_number": "DL10"}))]);
        let mut conversation = Conversation::new();

        let Step::ToolsExecuted(executions) = agent.step(&mut conversation, "Status?").await? else {
            panic!("expected a tool batch");
        };

        let ids: Vec<&str> = executions.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["call_1", "call_2", "call_3"]);
        assert_eq!(executions[0].result.value()["flight_number"], "UA415");
        assert_eq!(
            executions[1].result.error(),
            Some("lookup_pet_policy not implemented yet")
        );

        // user, assistant, then one tool message per request
        assert_eq!(conversation.len(), 5);
        for (message, id) in conversation.messages()[2..].iter().zip(&ids) {
            assert_eq!(message.role, Role::Tool);
            assert_eq!(message.tool_responses()[0].id, *id);
        }
        assert!(conversation.unanswered_requests().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_step_does_not_duplicate_user_message() -> AgentResult<()> {
        let provider = MockProvider::scripted(vec![None, Some(Message::assistant().with_text("ok"))]);
        let agent = Agent::new(Box::new(provider), status_registry());
        let mut conversation = Conversation::new();

        assert!(agent.step(&mut conversation, "Where is my bag?").await.is_err());
        assert_eq!(conversation.len(), 1);

        agent.step(&mut conversation, "Where is my bag?").await?;
        let user_messages = conversation
            .iter()
            .filter(|m| m.is_user_text("Where is my bag?"))
            .count();
        assert_eq!(user_messages, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_partial_conversation() {
        let agent = Agent::new(
            Box::new(MockProvider::scripted(vec![None])),
            status_registry(),
        );
        let mut conversation = Conversation::new();

        let err = agent.step(&mut conversation, "Hello").await.unwrap_err();

        assert!(matches!(err, AgentError::Provider(_)));
        assert_eq!(conversation.len(), 1);
        assert!(conversation.messages()[0].is_user_text("Hello"));
    }

    #[tokio::test]
    async fn test_argument_mismatch_fails_before_appending() {
        let agent = agent(vec![Message::assistant()
            .with_tool_request("call_1", "check_flight_status", json!({"flight_number": "UA415"}))
            .with_tool_request("call_2", "check_flight_status", json!({"flight": "UA415"}))]);
        let mut conversation = Conversation::new();

        let err = agent.step(&mut conversation, "Status?").await.unwrap_err();

        assert!(matches!(err, AgentError::InvalidParameters { .. }));
        assert_eq!(conversation.len(), 1);
        assert!(conversation.unanswered_requests().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_request_ids_are_rejected() {
        let agent = agent(vec![Message::assistant()
            .with_tool_request("call_1", "check_flight_status", json!({"flight_number": "UA415"}))
            .with_tool_request("call_1", "check_flight_status", json!({"flight_number": "UA416"}))]);
        let mut conversation = Conversation::new();

        let err = agent.step(&mut conversation, "Status?").await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_resume_does_not_append_user_input() -> AgentResult<()> {
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request("call_1", "check_flight_status", json!({"flight_number": "UA415"})),
            Message::assistant().with_text("UA415 is on time."),
        ]);
        let agent = Agent::new(Box::new(provider.clone()), status_registry());
        let mut conversation = Conversation::new();

        agent.step(&mut conversation, "Is UA415 on time?").await?;
        let step = agent.resume(&mut conversation).await?;

        assert_eq!(step, Step::Answer("UA415 is on time.".to_string()));
        let roles: Vec<Role> = conversation.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]);
        // The second completion saw the tool result but no repeated user message
        assert_eq!(provider.calls(), vec![1, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_invocation_still_answers_every_request() {
        // A negative count passes the integer schema check but cannot bind to an unsigned field
        let agent = Agent::new(
            Box::new(MockProvider::new(vec![Message::assistant()
                .with_tool_request(
                    "call_1",
                    "redeem_miles",
                    json!({"member_id": "FF123456", "miles": -5, "reward_type": "upgrade"}),
                )
                .with_tool_request("call_2", "check_flight_status", json!({"flight_number": "UA415"}))])),
            crate::airline::registry().unwrap(),
        );
        let mut conversation = Conversation::new();

        let err = agent.step(&mut conversation, "Use my miles").await.unwrap_err();

        assert!(matches!(err, AgentError::InvalidParameters { ref tool, .. } if tool == "redeem_miles"));
        assert_eq!(conversation.len(), 4);
        assert!(conversation.unanswered_requests().is_empty());

        let failed = &conversation.messages()[2].tool_responses()[0];
        assert_eq!(failed.id, "call_1");
        let skipped = &conversation.messages()[3].tool_responses()[0];
        assert_eq!(skipped.id, "call_2");
        let payload = ToolResult::from_text(&skipped.output).unwrap();
        assert_eq!(
            payload.error(),
            Some("not executed: an earlier tool call in this batch failed")
        );
    }
}
