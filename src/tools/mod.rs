//! Side-effecting tools exposed to the agent runner.
//!
//! Every tool takes JSON arguments and answers with plain text. Failures are
//! reported as text too, prefixed with [`FAILURE`], so the runner can read
//! them and react instead of aborting the whole instruction.

mod calendar;
mod reminder;
mod sql;

pub use calendar::CalendarEventTool;
pub use reminder::ReminderTool;
pub use sql::SqlTool;

use crate::automation::{OsascriptRunner, ScriptRunner};
use crate::config::Settings;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix of every successful tool result.
pub const SUCCESS: &str = "✓";
/// Prefix of every failed tool result.
pub const FAILURE: &str = "✗";

/// What the runner needs to know to offer a tool to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// A capability the agent can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to call the tool.
    fn name(&self) -> &str;

    /// What the tool does, written for the model.
    fn description(&self) -> &str;

    /// JSON schema for the arguments object.
    fn parameters(&self) -> Value;

    /// Perform the side effect and describe the outcome.
    ///
    /// Never fails: errors come back as [`FAILURE`]-prefixed text.
    async fn invoke(&self, args: Value) -> String;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Deserialize a tool's arguments, or produce the failure text for them.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, String> {
    serde_json::from_value(args)
        .map_err(|e| format!("{} Invalid arguments for {}: {}", FAILURE, tool, e))
}

/// The set of tools offered to the runner for one instruction.
#[derive(Clone)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// The reminder, calendar and SQL tools wired to `osascript` and the
    /// configured database.
    pub fn standard(settings: &Settings) -> Self {
        let runner: Arc<dyn ScriptRunner> =
            Arc::new(OsascriptRunner::new(settings.automation.osascript.clone()));
        Self::with_runner(settings, runner)
    }

    /// The standard tools with a custom script runner.
    pub fn with_runner(settings: &Settings, runner: Arc<dyn ScriptRunner>) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(ReminderTool::new(
                runner.clone(),
                settings.automation.reminders_list.clone(),
            )),
            Arc::new(CalendarEventTool::new(
                runner,
                settings.automation.default_calendar.clone(),
            )),
            Arc::new(SqlTool::new(settings.database_path())),
        ];
        Self::new(tools)
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name with raw JSON arguments as the model sent them.
    pub async fn invoke(&self, name: &str, arguments: &str) -> String {
        let Some(tool) = self.get(name) else {
            warn!("Model asked for unknown tool: {}", name);
            return format!("{} Unknown tool: {}", FAILURE, name);
        };

        let args = if arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(arguments) {
                Ok(v) => v,
                Err(e) => {
                    return format!("{} Invalid arguments for {}: {}", FAILURE, name, e);
                }
            }
        };

        info!("Invoking tool: {} with args: {}", name, arguments);
        let result = tool.invoke(args).await;
        if result.starts_with(FAILURE) {
            warn!("Tool {} reported failure: {}", name, result);
        }
        result
    }
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::RecordingRunner;

    fn toolbox() -> (Toolbox, Arc<RecordingRunner>) {
        let runner = Arc::new(RecordingRunner::succeeding());
        let mut settings = Settings::default();
        settings.database.path = "/nonexistent-dir/deskhand.db".to_string();
        (Toolbox::with_runner(&settings, runner.clone()), runner)
    }

    #[test]
    fn test_standard_descriptors() {
        let (toolbox, _) = toolbox();
        let names: Vec<String> = toolbox.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["create_reminder", "create_calendar_event", "execute_sql"]
        );
        for descriptor in toolbox.descriptors() {
            assert_eq!(descriptor.parameters["type"], "object");
            assert!(descriptor.parameters["required"].is_array());
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure_text() {
        let (toolbox, runner) = toolbox();
        let result = toolbox.invoke("send_email", "{}").await;
        assert_eq!(result, "✗ Unknown tool: send_email");
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_arguments_are_failure_text() {
        let (toolbox, runner) = toolbox();
        let result = toolbox.invoke("create_reminder", "{not json").await;
        assert!(result.starts_with("✗ Invalid arguments for create_reminder"));

        let result = toolbox.invoke("create_reminder", "").await;
        assert!(result.starts_with("✗ Invalid arguments for create_reminder"));
        assert!(result.contains("title"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_dispatches_by_name() {
        let (toolbox, runner) = toolbox();
        let result = toolbox
            .invoke("create_reminder", r#"{"title": "water plants"}"#)
            .await;
        assert_eq!(result, "✓ Reminder created: water plants");
        assert_eq!(runner.calls().len(), 1);
    }
}
