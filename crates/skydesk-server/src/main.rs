use anyhow::Result;
use skydesk::agent::Agent;
use skydesk::airline;
use skydesk::driver::Driver;
use skydesk::prompt_template::system_prompt;
use skydesk::providers::factory;
use skydesk::validation::ValidationChannel;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod configuration;
mod error;
mod routes;
mod state;

use configuration::Settings;
use state::{AppState, StatusInfo};

fn build_state(settings: Settings) -> Result<AppState> {
    let provider_config = settings.provider.into_config();
    let status_provider = provider_config.name().to_string();
    let status_model = provider_config.model().to_string();
    let provider = factory::get_provider(provider_config)?;

    let registry = airline::registry()?;
    let prompt = system_prompt(&settings.agent.airline, &registry.list_specs())?;
    let agent = Agent::new(provider, registry).with_system_prompt(prompt);

    // The validation service's own variable names work too
    let validation = settings.validation;
    let api_key = validation
        .api_key
        .or_else(|| std::env::var("CODEX_API_KEY").ok());
    let project_id = validation
        .project_id
        .or_else(|| std::env::var("CLEANLAB_PROJECT_ID").ok());
    let channel = ValidationChannel::from_credentials(validation.host, api_key, project_id.clone())?;

    let driver = Driver::new(agent, channel).with_max_steps(settings.agent.max_steps);
    let status = StatusInfo {
        provider: status_provider,
        model: status_model,
        validation_enabled: driver.validation_enabled(),
        project_id: project_id.filter(|_| driver.validation_enabled()),
        max_steps: driver.max_steps(),
    };
    Ok(AppState::new(driver, status))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr()?;
    let state = build_state(settings)?;

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use skydesk::models::message::Message;
    use skydesk::models::tool::Tool;
    use skydesk::providers::base::{Provider, Usage};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Replays canned completions; an exhausted script is a transport failure
    struct ScriptedProvider {
        responses: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[Tool],
        ) -> anyhow::Result<(Message, Usage)> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("connection refused");
            }
            Ok((responses.remove(0), Usage::default()))
        }
    }

    fn app(responses: Vec<Message>) -> (Router, AppState) {
        let provider = ScriptedProvider {
            responses: Mutex::new(responses),
        };
        let agent = Agent::new(Box::new(provider), airline::registry().unwrap());
        let driver = Driver::new(agent, ValidationChannel::disabled()).with_max_steps(2);
        let status = StatusInfo {
            provider: "scripted".to_string(),
            model: "none".to_string(),
            validation_enabled: false,
            project_id: None,
            max_steps: 2,
        };
        let state = AppState::new(driver, status);
        (routes::configure(state.clone()), state)
    }

    fn status_request(id: &str) -> Message {
        Message::assistant().with_tool_request(
            id,
            "check_flight_status",
            json!({"flight_number": "UA415"}),
        )
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let body: Value = serde_json::from_str(&body).unwrap();
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_reply_streams_tools_then_answer() {
        let (app, state) = app(vec![
            status_request("call_1"),
            Message::assistant().with_text("UA415 is on time."),
        ]);
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/reply", id),
            Some(json!({"message": "What's the status of flight UA415?"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let prefixes: Vec<&str> = body.lines().map(|line| &line[..2]).collect();
        assert_eq!(prefixes, vec!["9:", "a:", "8:", "8:", "0:", "d:"]);
        assert!(body.contains("\"toolCallId\":\"call_1\""));
        assert!(body.contains("UA415 is on time."));
        assert!(body.contains("\"finishReason\":\"stop\""));

        let session = state.sessions.get(&id).await.unwrap();
        assert_eq!(session.lock().await.conversation.len(), 4);
    }

    #[tokio::test]
    async fn test_step_cap_finishes_with_length() {
        let (app, _) = app(vec![status_request("call_1"), status_request("call_2")]);
        let id = new_session(&app).await;

        let (_, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/reply", id),
            Some(json!({"message": "Status?"})),
        )
        .await;

        assert!(body.contains("within 2 steps"));
        let last = body.lines().last().unwrap();
        assert!(last.starts_with("d:"));
        assert!(last.contains("\"finishReason\":\"length\""));
    }

    #[tokio::test]
    async fn test_provider_failure_finishes_with_error() {
        let (app, state) = app(vec![]);
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/sessions/{}/reply", id),
            Some(json!({"message": "Hello"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.lines().count(), 1);
        assert!(body.contains("\"finishReason\":\"error\""));
        let session = state.sessions.get(&id).await.unwrap();
        assert_eq!(session.lock().await.conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _) = app(vec![]);
        let (status, body) = send(
            &app,
            "POST",
            "/sessions/nope/reply",
            Some(json!({"message": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("nope"));

        let (status, _) = send(&app, "DELETE", "/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_and_history() {
        let (app, _) = app(vec![Message::assistant().with_text("Hi there!")]);
        let id = new_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/sessions/{}/reply", id),
            Some(json!({"message": "Hi"})),
        )
        .await;

        let (_, body) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
        let history: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(history["messages"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "POST", &format!("/sessions/{}/reset", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        let new_id = body["session_id"].as_str().unwrap().to_string();
        assert_ne!(new_id, id);

        let (status, _) = send(&app, "GET", &format!("/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&app, "GET", &format!("/sessions/{}", new_id), None).await;
        let history: Value = serde_json::from_str(&body).unwrap();
        assert!(history["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_session() {
        let (app, state) = app(vec![]);
        let id = new_session(&app).await;
        assert_eq!(state.sessions.len().await, 1);

        let (status, _) = send(&app, "DELETE", &format!("/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.len().await, 0);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/sessions/{}/reply", id),
            Some(json!({"message": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ask_answers_in_fresh_session() {
        let (app, state) = app(vec![
            status_request("call_1"),
            Message::assistant().with_text("UA415 is on time.\n"),
        ]);

        let (status, body) = send(&app, "POST", "/ask", Some(json!({"prompt": "UA415?"}))).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["response"], "UA415 is on time.");
        assert_eq!(body["outcome"], "answered");
        assert_eq!(body["verdict"]["should_guardrail"], false);
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_catalog_and_status() {
        let (app, _) = app(vec![]);

        let (status, body) = send(&app, "GET", "/tools", None).await;
        assert_eq!(status, StatusCode::OK);
        let categories: Value = serde_json::from_str(&body).unwrap();
        let categories = categories.as_array().unwrap();
        assert_eq!(categories.len(), airline::categories().len());
        assert_eq!(categories[0]["name"], "Flight Search & Booking");
        assert!(categories[0]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .any(|tool| tool["name"] == "check_flight_status"));

        let (_, body) = send(&app, "GET", "/status", None).await;
        let status: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status["validation_enabled"], false);
        assert_eq!(status["max_steps"], 2);
    }
}
