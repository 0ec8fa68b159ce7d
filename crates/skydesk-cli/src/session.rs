use anyhow::Result;
use futures::StreamExt;

use crate::prompt::{InputType, Prompt};
use skydesk::airline;
use skydesk::driver::{Driver, TurnEvent};
use skydesk::models::conversation::Conversation;

#[cfg(test)]
mod mock_provider;

/// An interactive chat in the terminal
pub struct Session<'a> {
    driver: Driver,
    prompt: Box<dyn Prompt + 'a>,
    chat: skydesk::session::Session,
}

impl<'a> Session<'a> {
    pub fn new(driver: Driver, prompt: Box<impl Prompt + 'a>) -> Self {
        Session {
            driver,
            prompt,
            chat: skydesk::session::Session::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.chat.conversation
    }

    pub async fn start(&mut self) -> Result<()> {
        self.setup_session();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.process_turn(content).await;
                    }
                }
                InputType::NewConversation => {
                    self.chat.reset();
                    self.prompt.render_notice("Started a new conversation.");
                }
                InputType::ShowTools => {
                    let tools = self.driver.agent().tools();
                    self.prompt.render_catalog(&airline::categories(), &tools);
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }

        self.close_session();
        Ok(())
    }

    pub async fn headless_start(&mut self, initial_message: &str) -> Result<()> {
        self.process_turn(initial_message).await;
        self.prompt.close();
        Ok(())
    }

    async fn process_turn(&mut self, input: &str) {
        let checkpoint = self.chat.conversation.clone();
        let mut interrupted = false;

        self.prompt.show_busy(1);
        let mut events = self.driver.run_turn(&mut self.chat, input);
        loop {
            tokio::select! {
                event = events.next() => {
                    match event {
                        Some(Ok(event)) => {
                            self.prompt.hide_busy();
                            self.prompt.render_event(&event);
                            if let TurnEvent::ToolsUsed { step, .. } = event {
                                self.prompt.show_busy(step + 1);
                            }
                        }
                        Some(Err(e)) => {
                            self.prompt.hide_busy();
                            tracing::error!(error = %e, "turn failed");
                            self.prompt.render_notice(&format!("Error: {}", e));
                            break;
                        }
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    interrupted = true;
                    break;
                }
            }
        }
        drop(events);

        if interrupted {
            self.prompt.hide_busy();
            // Resets the interaction to before the interrupted user request
            self.chat.conversation = checkpoint;
            self.prompt
                .render_notice("Interrupt: Resetting conversation to before the last sent message...");
        }
    }

    fn setup_session(&mut self) {
        self.prompt.render_notice(&format!(
            "Starting session {} with {} tools.",
            self.chat.id,
            self.driver.agent().registry().len()
        ));
        if !self.driver.validation_enabled() {
            self.prompt
                .render_notice("Response validation is off (no validation key or project id).");
        }
        self.prompt.ready();
    }

    fn close_session(&mut self) {
        self.prompt
            .render_notice(&format!("Closing session {}.", self.chat.id));
        self.prompt.close();
    }
}
