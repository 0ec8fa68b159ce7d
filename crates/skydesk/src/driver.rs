use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Serialize;

use crate::agent::{Agent, Step, ToolExecution};
use crate::errors::AgentResult;
use crate::session::Session;
use crate::validation::{ValidationChannel, ValidationRequest, Verdict};

/// Tool rounds allowed per user turn before giving up
pub const DEFAULT_MAX_STEPS: usize = 5;

/// Progress of a turn, in the order it happens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    ToolsUsed {
        step: usize,
        executions: Vec<ToolExecution>,
        verdict: Verdict,
    },
    Answer {
        step: usize,
        text: String,
        verdict: Verdict,
    },
    /// The step cap was reached without an answer
    Inconclusive { steps: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Answered {
        text: String,
        verdict: Verdict,
        steps: usize,
    },
    Inconclusive {
        steps: usize,
    },
}

/// Runs agent steps until the model answers or the step cap is hit
pub struct Driver {
    agent: Agent,
    validation: ValidationChannel,
    max_steps: usize,
}

impl Driver {
    pub fn new(agent: Agent, validation: ValidationChannel) -> Self {
        Self {
            agent,
            validation,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn validation_enabled(&self) -> bool {
        self.validation.is_enabled()
    }

    async fn validate(&self, session: &Session, query: &str, response: &str) -> Verdict {
        let request = ValidationRequest::new(
            query,
            &session.conversation,
            response,
            &session.id,
            &self.agent.tools(),
        );
        self.validation.check(&request).await
    }

    /// Run one user turn as a stream of events.
    ///
    /// An error item ends the stream; whatever the turn appended before it stays in the
    /// session's conversation.
    pub fn run_turn<'a>(
        &'a self,
        session: &'a mut Session,
        input: &'a str,
    ) -> BoxStream<'a, AgentResult<TurnEvent>> {
        Box::pin(async_stream::try_stream! {
            let mut answered = false;

            for step in 1..=self.max_steps {
                tracing::debug!(step, session = %session.id, "running step");
                let outcome = if step == 1 {
                    self.agent.step(&mut session.conversation, input).await?
                } else {
                    self.agent.resume(&mut session.conversation).await?
                };

                match outcome {
                    Step::ToolsExecuted(executions) => {
                        let used: Vec<&str> = executions.iter().map(|e| e.name.as_str()).collect();
                        let verdict = self.validate(session, input, &used.join(", ")).await;
                        yield TurnEvent::ToolsUsed { step, executions, verdict };
                    }
                    Step::Answer(text) => {
                        let verdict = self.validate(session, input, &text).await;
                        yield TurnEvent::Answer { step, text, verdict };
                        answered = true;
                        break;
                    }
                }
            }

            if !answered {
                tracing::warn!(steps = self.max_steps, "turn ended without an answer");
                yield TurnEvent::Inconclusive { steps: self.max_steps };
            }
        })
    }

    /// Run one user turn and keep only how it ended
    pub async fn run_to_completion(
        &self,
        session: &mut Session,
        input: &str,
    ) -> AgentResult<TurnOutcome> {
        let mut events = self.run_turn(session, input);
        while let Some(event) = events.next().await {
            match event? {
                TurnEvent::ToolsUsed { .. } => {}
                TurnEvent::Answer {
                    step,
                    text,
                    verdict,
                } => {
                    return Ok(TurnOutcome::Answered {
                        text,
                        verdict,
                        steps: step,
                    })
                }
                TurnEvent::Inconclusive { steps } => return Ok(TurnOutcome::Inconclusive { steps }),
            }
        }
        Ok(TurnOutcome::Inconclusive {
            steps: self.max_steps,
        })
    }
}
