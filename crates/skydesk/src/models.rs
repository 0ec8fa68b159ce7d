//! These models represent the objects passed around by the agent
//!
//! There are a few different related formats we need to interact with:
//! - openai messages/tools, sent from the agent to the completion endpoint
//! - tool requests and results, exchanged between the agent and the tool registry
//! - data-stream protocol lines, sent from the server to the browser
//!
//! We always immediately convert those wire formats into the internal structs using to/from
//! helpers. Because of the need for compatibility, the internal models are not an exact match
//! to any of these formats.
pub mod content;
pub mod conversation;
pub mod message;
pub mod role;
pub mod tool;
