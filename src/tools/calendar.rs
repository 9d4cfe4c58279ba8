//! `create_calendar_event`: adds an event through the Calendar app (JXA).

use super::{parse_args, Tool, FAILURE, SUCCESS};
use crate::automation::{javascript_string, Script, ScriptRunner};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Accepted format for event times, local time.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Timestamp format handed to JXA `new Date(...)`. No offset, so local time.
const SCRIPT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAME: &str = "create_calendar_event";

#[derive(Debug, Deserialize)]
struct CalendarEventArgs {
    title: String,
    start_time: String,
    end_time: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    calendar_name: Option<String>,
}

/// A validated event, ready to be scripted.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: Option<String>,
    pub calendar: String,
}

impl CalendarEvent {
    /// Parse and check the event times. `end` must be strictly after `start`.
    pub fn parse(
        title: &str,
        start_time: &str,
        end_time: &str,
        notes: Option<&str>,
        calendar: &str,
    ) -> Result<Self, String> {
        let start = parse_time("start_time", start_time)?;
        let end = parse_time("end_time", end_time)?;
        if end <= start {
            return Err("end_time must be after start_time".to_string());
        }

        Ok(Self {
            title: title.to_string(),
            start,
            end,
            notes: notes.map(str::to_string),
            calendar: calendar.to_string(),
        })
    }

    /// JXA that finds the calendar (falling back to the first one) and
    /// appends the event to it.
    pub fn to_script(&self) -> Script {
        let title = javascript_string(&self.title);
        let calendar = javascript_string(&self.calendar);
        let start = javascript_string(&self.start.format(SCRIPT_TIME_FORMAT).to_string());
        let end = javascript_string(&self.end.format(SCRIPT_TIME_FORMAT).to_string());
        let notes = self
            .notes
            .as_deref()
            .map(javascript_string)
            .unwrap_or_else(|| "null".to_string());

        Script::javascript(format!(
            r#"const app = Application('Calendar');
const cals = app.calendars;
const wantedName = {calendar};

const cal = (function () {{
    const matches = cals.whose({{ name: wantedName }});
    if (matches.length) return matches[0];
    return cals()[0];
}})();

const startDate = new Date({start});
const endDate = new Date({end});
if (isNaN(startDate) || isNaN(endDate)) {{
    throw new Error('Invalid date parsing in JXA');
}}

const ev = app.Event({{
    summary: {title},
    startDate: startDate,
    endDate: endDate
}});

const notes = {notes};
if (notes !== null) ev.description = notes;

cal.events.push(ev);"#
        ))
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value.trim(), EVENT_TIME_FORMAT).map_err(|e| {
        format!(
            "invalid {} '{}' (expected YYYY-MM-DD HH:MM): {}",
            field, value, e
        )
    })
}

/// Creates events in the Calendar app.
pub struct CalendarEventTool {
    runner: Arc<dyn ScriptRunner>,
    default_calendar: String,
}

impl CalendarEventTool {
    pub fn new(runner: Arc<dyn ScriptRunner>, default_calendar: impl Into<String>) -> Self {
        Self {
            runner,
            default_calendar: default_calendar.into(),
        }
    }

    /// Create an event and describe the outcome.
    ///
    /// Time validation happens here, before any process is started.
    #[instrument(skip(self, notes))]
    pub async fn create(
        &self,
        title: &str,
        start_time: &str,
        end_time: &str,
        notes: Option<&str>,
        calendar_name: Option<&str>,
    ) -> String {
        let calendar = calendar_name
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_calendar.as_str());

        let event = match CalendarEvent::parse(title, start_time, end_time, notes, calendar) {
            Ok(e) => e,
            Err(e) => return format!("{} Error creating calendar event: {}", FAILURE, e),
        };

        match self.runner.run(&event.to_script()).await {
            Ok(output) if output.success => format!(
                "{} Calendar event created: {} from {} to {}",
                SUCCESS, title, start_time, end_time
            ),
            Ok(output) => format!(
                "{} Failed to create calendar event: {}",
                FAILURE,
                output.failure_detail()
            ),
            Err(e) => format!("{} Error creating calendar event: {}", FAILURE, e),
        }
    }
}

#[async_trait]
impl Tool for CalendarEventTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Create an event in the Calendar app. \
        Use this for meetings, appointments or anything with a start and end time."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Event title"
                },
                "start_time": {
                    "type": "string",
                    "description": "Start in local time, format 'YYYY-MM-DD HH:MM'"
                },
                "end_time": {
                    "type": "string",
                    "description": "End in local time, format 'YYYY-MM-DD HH:MM'; must be after start_time"
                },
                "notes": {
                    "type": "string",
                    "description": "Optional notes or description"
                },
                "calendar_name": {
                    "type": "string",
                    "description": "Name of the calendar (default: 'Calendar')",
                    "default": self.default_calendar
                }
            },
            "required": ["title", "start_time", "end_time"]
        })
    }

    async fn invoke(&self, args: Value) -> String {
        match parse_args::<CalendarEventArgs>(NAME, args) {
            Ok(args) => {
                self.create(
                    &args.title,
                    &args.start_time,
                    &args.end_time,
                    args.notes.as_deref(),
                    args.calendar_name.as_deref(),
                )
                .await
            }
            Err(failure) => failure,
        }
    }
}
