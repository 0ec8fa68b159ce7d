use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use skydesk::driver::{TurnEvent, TurnOutcome};
use skydesk::session::Session;
use skydesk::validation::Verdict;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;

use super::{api_error, session_not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    message: String,
}

// Custom SSE response type that implements the Vercel AI SDK protocol
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);
        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            [("x-vercel-ai-data-stream", "v1")],
            body,
        )
            .into_response()
    }
}

/// Lines of the data-stream protocol, one part per line
struct ProtocolFormatter;

impl ProtocolFormatter {
    fn format_text(text: &str) -> String {
        format!("0:{}\n", Value::String(text.to_string()))
    }

    fn format_tool_call(id: &str, name: &str, args: &Value) -> String {
        let tool_call = json!({
            "toolCallId": id,
            "toolName": name,
            "args": args
        });
        format!("9:{}\n", tool_call)
    }

    fn format_tool_response(id: &str, result: &Value) -> String {
        let response = json!({
            "toolCallId": id,
            "result": result,
        });
        format!("a:{}\n", response)
    }

    fn format_verdict(step: usize, verdict: &Verdict) -> String {
        let annotation = json!([{
            "type": "validation",
            "step": step,
            "verdict": verdict,
        }]);
        format!("8:{}\n", annotation)
    }

    fn format_finish(reason: &str) -> String {
        // Usage is not tracked per turn
        let finish = json!({
            "finishReason": reason,
            "usage": {
                "promptTokens": 0,
                "completionTokens": 0
            }
        });
        format!("d:{}\n", finish)
    }
}

async fn stream_event(
    event: &TurnEvent,
    tx: &mpsc::Sender<String>,
) -> Result<(), mpsc::error::SendError<String>> {
    match event {
        TurnEvent::ToolsUsed {
            step,
            executions,
            verdict,
        } => {
            for execution in executions {
                tx.send(ProtocolFormatter::format_tool_call(
                    &execution.id,
                    &execution.name,
                    &execution.arguments,
                ))
                .await?;
                tx.send(ProtocolFormatter::format_tool_response(
                    &execution.id,
                    execution.result.value(),
                ))
                .await?;
            }
            tx.send(ProtocolFormatter::format_verdict(*step, verdict))
                .await?;
        }
        TurnEvent::Answer {
            step,
            text,
            verdict,
        } => {
            tx.send(ProtocolFormatter::format_verdict(*step, verdict))
                .await?;
            for line in text.lines() {
                let modified_line = format!("{}\n", line);
                tx.send(ProtocolFormatter::format_text(&modified_line))
                    .await?;
            }
        }
        TurnEvent::Inconclusive { steps } => {
            let notice = format!(
                "I wasn't able to finish that request within {} steps. Could you rephrase or narrow it down?\n",
                steps
            );
            tx.send(ProtocolFormatter::format_text(&notice)).await?;
        }
    }
    Ok(())
}

async fn reply_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ReplyRequest>,
) -> Result<SseResponse, ApiError> {
    // Check protocol header (optional in our case)
    if let Some(protocol) = headers.get("x-protocol") {
        if protocol.to_str().map(|p| p != "data").unwrap_or(true) {
            return Err(api_error(StatusCode::BAD_REQUEST, "unsupported protocol"));
        }
    }
    if request.message.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message must not be empty"));
    }

    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| session_not_found(&id))?;
    let driver = state.driver.clone();

    // Create channel for streaming
    let (tx, rx) = mpsc::channel(100);
    let stream = ReceiverStream::new(rx);

    tokio::spawn(async move {
        // Held for the whole turn so turns on this session never interleave
        let mut session = session.lock().await;
        let mut finish_reason = "stop";
        let mut events = driver.run_turn(&mut session, &request.message);

        loop {
            match timeout(Duration::from_millis(500), events.next()).await {
                Ok(Some(Ok(event))) => {
                    if matches!(event, TurnEvent::Inconclusive { .. }) {
                        finish_reason = "length";
                    }
                    if let Err(e) = stream_event(&event, &tx).await {
                        tracing::error!("Error sending message through channel: {}", e);
                        break;
                    }
                }
                Ok(Some(Err(e))) => {
                    tracing::error!("Error processing turn: {}", e);
                    finish_reason = "error";
                    break;
                }
                Ok(None) => break,
                // Heartbeat, used to detect disconnected clients
                Err(_) => {
                    if tx.is_closed() {
                        break;
                    }
                }
            }
        }
        drop(events);

        let _ = tx.send(ProtocolFormatter::format_finish(finish_reason)).await;
    });

    Ok(SseResponse::new(stream))
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    response: String,
    outcome: &'static str,
    verdict: Option<Verdict>,
}

// simple ask for a response in a fresh session, non streaming
async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let mut session = Session::new();
    let outcome = state
        .driver
        .run_to_completion(&mut session, &request.prompt)
        .await
        .map_err(|e| {
            tracing::error!("Failed to answer: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let response = match outcome {
        TurnOutcome::Answered { text, verdict, .. } => AskResponse {
            response: text.trim().to_string(),
            outcome: "answered",
            verdict: Some(verdict),
        },
        TurnOutcome::Inconclusive { steps } => AskResponse {
            response: format!("No answer within {} steps", steps),
            outcome: "inconclusive",
            verdict: None,
        },
    };
    Ok(Json(response))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/sessions/:id/reply", post(reply_handler))
        .route("/ask", post(ask_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_lines() {
        assert_eq!(
            ProtocolFormatter::format_text("Gate B12\n"),
            "0:\"Gate B12\\n\"\n"
        );
        let call = ProtocolFormatter::format_tool_call(
            "call_1",
            "check_flight_status",
            &json!({"flight_number": "UA415"}),
        );
        let payload: Value = serde_json::from_str(call.strip_prefix("9:").unwrap().trim()).unwrap();
        assert_eq!(payload["toolCallId"], "call_1");
        assert_eq!(payload["toolName"], "check_flight_status");
        assert_eq!(payload["args"]["flight_number"], "UA415");
        assert!(ProtocolFormatter::format_tool_response("call_1", &json!({"status": "On Time"}))
            .starts_with("a:{"));
        assert!(ProtocolFormatter::format_finish("length").contains("\"finishReason\":\"length\""));
    }

    #[test]
    fn test_verdict_annotation_is_array() {
        let line = ProtocolFormatter::format_verdict(2, &Verdict::degraded("validation not configured"));
        let payload: Value = serde_json::from_str(line.trim_start_matches("8:").trim()).unwrap();
        assert_eq!(payload[0]["step"], 2);
        assert_eq!(payload[0]["verdict"]["should_guardrail"], false);
    }
}
