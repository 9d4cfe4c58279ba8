//! `create_reminder`: adds a reminder through the Reminders app.

use super::{parse_args, Tool, FAILURE, SUCCESS};
use crate::automation::{applescript_string, Script, ScriptRunner};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Accepted format for due dates, local time.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

const NAME: &str = "create_reminder";

#[derive(Debug, Deserialize)]
struct ReminderArgs {
    title: String,
    #[serde(default)]
    due_date: Option<String>,
}

/// Creates reminders in a fixed Reminders list.
pub struct ReminderTool {
    runner: Arc<dyn ScriptRunner>,
    list: String,
}

impl ReminderTool {
    pub fn new(runner: Arc<dyn ScriptRunner>, list: impl Into<String>) -> Self {
        Self {
            runner,
            list: list.into(),
        }
    }

    /// Create a reminder and describe the outcome.
    #[instrument(skip(self))]
    pub async fn create(&self, title: &str, due_date: Option<&str>) -> String {
        let due_date = due_date.map(str::trim).filter(|d| !d.is_empty());

        let script = match self.build_script(title, due_date) {
            Ok(s) => s,
            Err(e) => return format!("{} Error creating reminder: {}", FAILURE, e),
        };

        match self.runner.run(&script).await {
            Ok(output) if output.success => {
                let mut message = format!("{} Reminder created: {}", SUCCESS, title);
                if let Some(due) = due_date {
                    message.push_str(&format!(" (due: {})", due));
                }
                message
            }
            Ok(output) => format!(
                "{} Failed to create reminder: {}",
                FAILURE,
                output.failure_detail()
            ),
            Err(e) => format!("{} Error creating reminder: {}", FAILURE, e),
        }
    }

    fn build_script(&self, title: &str, due_date: Option<&str>) -> Result<Script, String> {
        if title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }

        let name = applescript_string(title);
        let list = applescript_string(&self.list);

        let (preamble, properties) = match due_date {
            Some(raw) => {
                let due = NaiveDateTime::parse_from_str(raw, DUE_DATE_FORMAT).map_err(|e| {
                    format!("invalid due_date '{}' (expected YYYY-MM-DD HH:MM): {}", raw, e)
                })?;
                (
                    due_date_preamble(&due),
                    format!("{{name:{}, due date:dueDate}}", name),
                )
            }
            None => (String::new(), format!("{{name:{}}}", name)),
        };

        Ok(Script::applescript(format!(
            r#"{preamble}tell application "Reminders"
    set mylist to list {list}
    tell mylist
        make new reminder with properties {properties}
    end tell
end tell"#
        )))
    }
}

/// Build the due date field by field so the user's locale never parses it.
fn due_date_preamble(due: &NaiveDateTime) -> String {
    // Day goes to 1 first so a short target month cannot overflow.
    format!(
        "set dueDate to current date
set day of dueDate to 1
set year of dueDate to {}
set month of dueDate to {}
set day of dueDate to {}
set hours of dueDate to {}
set minutes of dueDate to {}
set seconds of dueDate to 0
",
        due.year(),
        due.month(),
        due.day(),
        due.hour(),
        due.minute()
    )
}

#[async_trait]
impl Tool for ReminderTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Create a reminder in the Reminders app. \
        Use this when the user wants to be reminded of something, optionally at a specific time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The reminder text"
                },
                "due_date": {
                    "type": "string",
                    "description": "Optional due date in local time, format 'YYYY-MM-DD HH:MM'"
                }
            },
            "required": ["title"]
        })
    }

    async fn invoke(&self, args: Value) -> String {
        match parse_args::<ReminderArgs>(NAME, args) {
            Ok(args) => self.create(&args.title, args.due_date.as_deref()).await,
            Err(failure) => failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::testing::RecordingRunner;
    use crate::automation::{ScriptLanguage, ScriptOutput};

    fn tool(runner: &Arc<RecordingRunner>) -> ReminderTool {
        ReminderTool::new(runner.clone(), "Reminders")
    }

    #[tokio::test]
    async fn test_reminder_without_due_date() {
        let runner = Arc::new(RecordingRunner::succeeding());
        let result = tool(&runner).create("call mom", None).await;

        assert_eq!(result, "✓ Reminder created: call mom");
        assert!(!result.contains("due"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].language, ScriptLanguage::AppleScript);
        assert!(calls[0].source.contains(r#"set mylist to list "Reminders""#));
        assert!(calls[0].source.contains(r#"{name:"call mom"}"#));
        assert!(!calls[0].source.contains("dueDate"));
    }

    #[tokio::test]
    async fn test_reminder_with_due_date() {
        let runner = Arc::new(RecordingRunner::succeeding());
        let result = tool(&runner)
            .create("call mom", Some("2025-03-14 17:05"))
            .await;

        assert_eq!(result, "✓ Reminder created: call mom (due: 2025-03-14 17:05)");

        let source = &runner.calls()[0].source;
        assert!(source.contains("set year of dueDate to 2025"));
        assert!(source.contains("set month of dueDate to 3"));
        assert!(source.contains("set day of dueDate to 14"));
        assert!(source.contains("set hours of dueDate to 17"));
        assert!(source.contains("set minutes of dueDate to 5"));
        assert!(source.contains(r#"{name:"call mom", due date:dueDate}"#));
    }

    #[tokio::test]
    async fn test_blank_due_date_is_ignored() {
        let runner = Arc::new(RecordingRunner::succeeding());
        let result = tool(&runner).create("stretch", Some("  ")).await;
        assert_eq!(result, "✓ Reminder created: stretch");
    }

    #[tokio::test]
    async fn test_bad_due_date_fails_before_running() {
        let runner = Arc::new(RecordingRunner::succeeding());
        let result = tool(&runner).create("call mom", Some("tomorrow 5pm")).await;

        assert!(result.starts_with("✗ Error creating reminder: invalid due_date"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_quotes_in_title_are_escaped() {
        let runner = Arc::new(RecordingRunner::succeeding());
        tool(&runner).create(r#"buy "good" coffee"#, None).await;
        assert!(runner.calls()[0]
            .source
            .contains(r#"{name:"buy \"good\" coffee"}"#));
    }

    #[tokio::test]
    async fn test_script_failure_surfaces_stderr() {
        let runner = Arc::new(RecordingRunner::with_output(ScriptOutput {
            success: false,
            stdout: String::new(),
            stderr: "execution error: Not authorized to send Apple events (-1743)\n".to_string(),
        }));
        let result = tool(&runner).create("call mom", None).await;
        assert_eq!(
            result,
            "✗ Failed to create reminder: execution error: Not authorized to send Apple events (-1743)"
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_error_text() {
        let runner = Arc::new(RecordingRunner::missing_binary());
        let result = tool(&runner).create("call mom", None).await;
        assert!(result.starts_with("✗ Error creating reminder: External tool not found: osascript"));
    }

    #[tokio::test]
    async fn test_invoke_requires_title() {
        let runner = Arc::new(RecordingRunner::succeeding());
        let result = tool(&runner).invoke(json!({ "due_date": "2025-01-01 09:00" })).await;
        assert!(result.starts_with("✗ Invalid arguments for create_reminder"));
        assert!(runner.calls().is_empty());
    }
}
