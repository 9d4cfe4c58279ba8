//! Agent runners that turn an instruction into tool calls and a final answer.
//!
//! The gateway only sees the [`AgentRunner`] trait. [`OpenAiRunner`] drives an
//! OpenAI-compatible model with the local tools; tests plug in scripted
//! runners instead.

mod runner;

pub use runner::{tool_definitions, AgentRunner, OpenAiRunner, RunOutcome, ToolCallRecord};
