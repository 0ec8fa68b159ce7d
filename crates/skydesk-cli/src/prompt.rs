use anyhow::Result;
use skydesk::airline::Category;
use skydesk::driver::TurnEvent;
use skydesk::models::tool::Tool;

pub mod cliclack;

pub trait Prompt {
    fn render_event(&mut self, event: &TurnEvent);
    /// Plain status text from the session itself
    fn render_notice(&mut self, text: &str);
    fn render_catalog(&mut self, categories: &[Category], tools: &[Tool]);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self, step: usize);
    fn hide_busy(&mut self);
    fn close(&self);
    fn ready(&self) {
        println!("\n");
        println!("Skydesk is ready! Ask about flights, bookings, seats, baggage or anything else about your trip.");
        println!("\n");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain,        // Ask the user for input again. Control flow command.
    Message,         // User sent a message
    NewConversation, // Drop the history and start a fresh session
    ShowTools,       // List the tool catalog
    Exit,            // User wants to exit the session
}

impl Input {
    pub fn command(input_type: InputType) -> Self {
        Self {
            input_type,
            content: None,
        }
    }

    pub fn message<S: Into<String>>(content: S) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }
}

pub enum Theme {
    Light,
    Dark,
}

/// Map a slash command to what the session should do, or None for chat text
pub fn parse_command(text: &str) -> Option<InputType> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("/exit") || text.eq_ignore_ascii_case("/quit") {
        Some(InputType::Exit)
    } else if text.eq_ignore_ascii_case("/new") || text.eq_ignore_ascii_case("/clear") {
        Some(InputType::NewConversation)
    } else if text.eq_ignore_ascii_case("/tools") {
        Some(InputType::ShowTools)
    } else if text.is_empty() {
        Some(InputType::AskAgain)
    } else {
        None
    }
}
