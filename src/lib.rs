//! Deskhand - a local agent gateway
//!
//! A small HTTP service and CLI that hands natural-language instructions to an
//! agent runner, which may create reminders, create calendar events or run SQL
//! against a local database, and answers with a short summary.
//!
//! # Architecture
//!
//! - `automation` - OS automation scripts and the `osascript` process boundary
//! - `tools` - The reminder, calendar and SQL tools plus the `Toolbox` registry
//! - `agent` - The `AgentRunner` seam and the OpenAI-compatible runner
//! - `gateway` - Request/response envelopes and dispatch to the runner
//! - `cli` - Commands, including the HTTP server
//! - `config` - Configuration management
//!
//! # Example
//!
//! ```rust,no_run
//! use deskhand::agent::OpenAiRunner;
//! use deskhand::config::Settings;
//! use deskhand::gateway::{DedalusRequest, Gateway};
//! use deskhand::tools::Toolbox;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let runner = Arc::new(OpenAiRunner::new(&settings.agent)?);
//!     let gateway = Gateway::new(runner, Toolbox::standard(&settings), "openai/gpt-5");
//!
//!     let response = gateway
//!         .dispatch(&DedalusRequest::new("remind me to call mom tomorrow at 5pm"))
//!         .await?;
//!     println!("{}", response.description);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod automation;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod openai;
pub mod tools;

pub use error::{DeskhandError, Result};
