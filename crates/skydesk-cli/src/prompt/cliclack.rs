use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::style;
use skydesk::airline::Category;
use skydesk::driver::TurnEvent;
use skydesk::models::tool::Tool;
use skydesk::validation::Verdict;

use super::{parse_command, Input, InputType, Prompt, Theme};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }

    fn theme(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn print_tool_request(content: &str, theme: &str, tool_name: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(
            bat::Input::from_bytes(content.as_bytes()).name(format!("Tool Request: {}", tool_name)),
        )
        .theme(theme)
        .language("JSON")
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        tracing::warn!(error = %e, "failed to render tool request");
    }
}

fn print_tool_response(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()).name("Tool Response:"))
        .theme(theme)
        .language("JSON")
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        tracing::warn!(error = %e, "failed to render tool response");
    }
}

fn print(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        tracing::warn!(error = %e, "failed to render text");
        println!("{}", content);
    }
}

fn print_verdict(verdict: &Verdict) {
    if !verdict.should_guardrail {
        return;
    }
    println!(
        "{}",
        style("⚠ This response was flagged for review.").yellow().bold()
    );
    if verdict.escalated_to_sme {
        println!("{}", style("  It has been escalated to a support expert.").yellow());
    }
    if let Some(expert) = &verdict.expert_answer {
        println!("{} {}", style("  Expert answer:").yellow(), expert);
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl Prompt for CliclackPrompt {
    fn render_event(&mut self, event: &TurnEvent) {
        let theme = self.theme();
        match event {
            TurnEvent::ToolsUsed {
                executions,
                verdict,
                ..
            } => {
                for execution in executions {
                    print_tool_request(&pretty(&execution.arguments), theme, &execution.name);
                    print_tool_response(&pretty(execution.result.value()), theme);
                }
                print_verdict(verdict);
            }
            TurnEvent::Answer { text, verdict, .. } => {
                print(text, theme);
                print_verdict(verdict);
            }
            TurnEvent::Inconclusive { steps } => {
                println!(
                    "{}",
                    style(format!(
                        "I wasn't able to finish that request within {} steps. Could you rephrase or narrow it down?",
                        steps
                    ))
                    .dim()
                );
            }
        }

        println!();
        let _ = io::stdout().flush();
    }

    fn render_notice(&mut self, text: &str) {
        println!("{}", style(text).dim());
    }

    fn render_catalog(&mut self, categories: &[Category], tools: &[Tool]) {
        for category in categories {
            println!("{}", style(category.name).bold());
            for name in category.tools {
                let description = tools
                    .iter()
                    .find(|tool| tool.name == *name)
                    .map(|tool| tool.description.as_str())
                    .unwrap_or_default();
                println!("  {} {}", style(name).cyan(), style(description).dim());
            }
        }
        println!();
    }

    fn show_busy(&mut self, step: usize) {
        self.spinner = spinner();
        self.spinner.start(format!("Thinking... (Step {})", step));
    }

    fn hide_busy(&mut self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input("Skydesk: ✈         [Help: /?]")
            .placeholder("")
            .interact()?;
        let message_text = message_text.trim().to_string();

        if let Some(input_type) = parse_command(&message_text) {
            return Ok(Input::command(input_type));
        }

        if message_text.eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => {
                    println!("Switching to Dark theme");
                    Theme::Dark
                }
                Theme::Dark => {
                    println!("Switching to Light theme");
                    Theme::Light
                }
            };
            Ok(Input::command(InputType::AskAgain))
        } else if message_text.eq_ignore_ascii_case("/?")
            || message_text.eq_ignore_ascii_case("/help")
        {
            println!("Commands:");
            println!("/exit - Exit the session");
            println!("/new - Start a new conversation");
            println!("/tools - List the tools the assistant can use");
            println!("/t - Toggle Light/Dark theme");
            println!("/? | /help - Display this help message");
            println!("Ctrl+C - Interrupt (resets the conversation to before the interrupted message)");
            Ok(Input::command(InputType::AskAgain))
        } else {
            Ok(Input::message(message_text))
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
