//! Tool commands: list what the agent is offered, or invoke a tool by hand.

use crate::automation::{OsascriptRunner, ScriptRunner};
use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, ToolAction};
use crate::config::Settings;
use crate::tools::{CalendarEventTool, ReminderTool, SqlTool, Toolbox, FAILURE};
use anyhow::Result;
use console::style;
use std::sync::Arc;

/// List the tools and their parameters.
pub fn run_tools(settings: &Settings) -> Result<()> {
    let toolbox = Toolbox::standard(settings);

    Output::header(&format!("Tools ({})", toolbox.len()));
    for descriptor in toolbox.descriptors() {
        println!();
        println!("  {}", style(&descriptor.name).bold());
        println!("    {}", style(&descriptor.description).dim());

        let required: Vec<&str> = descriptor.parameters["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        if let Some(properties) = descriptor.parameters["properties"].as_object() {
            for (name, schema) in properties {
                let marker = if required.contains(&name.as_str()) { "" } else { "?" };
                Output::list_item(&format!(
                    "{}{}: {}",
                    name,
                    marker,
                    schema["description"].as_str().unwrap_or_default()
                ));
            }
        }
    }
    println!();

    Ok(())
}

/// Invoke one tool directly and print its result.
pub async fn run_tool(action: &ToolAction, settings: &Settings) -> Result<()> {
    let result = match action {
        ToolAction::Remind { title, due } => {
            warn_on_preflight(Operation::Automation, settings);
            ReminderTool::new(script_runner(settings), settings.automation.reminders_list.clone())
                .create(title, due.as_deref())
                .await
        }
        ToolAction::Event {
            title,
            start,
            end,
            notes,
            calendar,
        } => {
            warn_on_preflight(Operation::Automation, settings);
            CalendarEventTool::new(script_runner(settings), settings.automation.default_calendar.clone())
                .create(title, start, end, notes.as_deref(), calendar.as_deref())
                .await
        }
        ToolAction::Sql { query } => {
            warn_on_preflight(Operation::Sql, settings);
            SqlTool::new(settings.database_path()).execute(query).await
        }
    };

    Output::tool_result(&result);

    if result.starts_with(FAILURE) {
        anyhow::bail!("tool reported a failure");
    }
    Ok(())
}

fn script_runner(settings: &Settings) -> Arc<dyn ScriptRunner> {
    Arc::new(OsascriptRunner::new(settings.automation.osascript.clone()))
}

/// Tools report their own failures, so a failed check only warns.
fn warn_on_preflight(operation: Operation, settings: &Settings) {
    if let Err(e) = preflight::check(operation, settings) {
        Output::warning(&format!("{}", e));
    }
}
