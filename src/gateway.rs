//! Agent gateway: hands an instruction and the tools to the runner and maps
//! the result to a response envelope.

use crate::agent::{AgentRunner, RunOutcome};
use crate::error::{DeskhandError, Result};
use crate::tools::Toolbox;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Maximum length of a response description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Description used when the runner finishes without saying anything.
pub const DEFAULT_DESCRIPTION: &str = "Task completed successfully.";

/// Instruction envelope accepted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedalusRequest {
    /// Natural-language instruction.
    pub input: String,
    /// Model identifier; the configured default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DedalusRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Response envelope returned for a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedalusResponse {
    pub status: Status,
    pub description: String,
}

impl DedalusResponse {
    /// Success envelope for a finished run: the final output capped at
    /// [`MAX_DESCRIPTION_CHARS`], or [`DEFAULT_DESCRIPTION`] when empty.
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let output = outcome
            .final_output
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION);

        Self {
            status: Status::Success,
            description: truncate_chars(output, MAX_DESCRIPTION_CHARS),
        }
    }
}

/// Keep at most `max` characters, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Single entry point between the HTTP boundary and the agent runner.
pub struct Gateway {
    runner: Arc<dyn AgentRunner>,
    toolbox: Toolbox,
    default_model: String,
}

impl Gateway {
    pub fn new(runner: Arc<dyn AgentRunner>, toolbox: Toolbox, default_model: impl Into<String>) -> Self {
        Self {
            runner,
            toolbox,
            default_model: default_model.into(),
        }
    }

    /// Run an instruction and return the raw outcome.
    ///
    /// Runner failures propagate unchanged; tool failures are already part
    /// of the outcome's text.
    pub async fn execute(&self, input: &str, model: Option<&str>) -> Result<RunOutcome> {
        if input.trim().is_empty() {
            return Err(DeskhandError::InvalidInput(
                "input must not be empty".to_string(),
            ));
        }

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str());

        info!(
            "Dispatching instruction to runner (model: {}, tools: {})",
            model,
            self.toolbox.len()
        );

        match self.runner.submit(input, model, &self.toolbox).await {
            Ok(outcome) => {
                info!(
                    "Runner completed in {} iteration(s) with {} tool call(s)",
                    outcome.iterations,
                    outcome.tool_calls.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                warn!("Runner failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run an instruction and build the response envelope.
    pub async fn dispatch(&self, request: &DedalusRequest) -> Result<DedalusResponse> {
        let outcome = self.execute(&request.input, request.model.as_deref()).await?;
        Ok(DedalusResponse::from_outcome(&outcome))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::agent::ToolCallRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// One tool call the scripted runner performs before answering.
    pub struct PlannedCall {
        pub tool: &'static str,
        pub arguments: String,
    }

    /// A runner that calls a fixed list of tools, then answers with a
    /// template where `{results}` becomes the joined tool results.
    pub struct ScriptedRunner {
        plan: Vec<PlannedCall>,
        answer: Option<String>,
        failure: Option<String>,
        pub seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRunner {
        pub fn answering(answer: Option<&str>) -> Self {
            Self {
                plan: Vec::new(),
                answer: answer.map(str::to_string),
                failure: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::answering(None)
            }
        }

        pub fn calling(mut self, tool: &'static str, arguments: serde_json::Value) -> Self {
            self.plan.push(PlannedCall {
                tool,
                arguments: arguments.to_string(),
            });
            self
        }

        pub fn seen(&self) -> Vec<(String, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentRunner for ScriptedRunner {
        async fn submit(
            &self,
            instruction: &str,
            model: &str,
            tools: &Toolbox,
        ) -> Result<RunOutcome> {
            self.seen
                .lock()
                .unwrap()
                .push((instruction.to_string(), model.to_string()));

            if let Some(message) = &self.failure {
                return Err(DeskhandError::Runner(message.clone()));
            }

            let mut records = Vec::new();
            for call in &self.plan {
                let result = tools.invoke(call.tool, &call.arguments).await;
                records.push(ToolCallRecord {
                    name: call.tool.to_string(),
                    arguments: call.arguments.clone(),
                    result,
                });
            }

            let results = records
                .iter()
                .map(|r| r.result.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            Ok(RunOutcome {
                final_output: self.answer.as_ref().map(|a| a.replace("{results}", &results)),
                iterations: records.len() + 1,
                tool_calls: records,
            })
        }
    }
}
