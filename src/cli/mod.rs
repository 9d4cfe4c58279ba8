//! CLI module for Deskhand.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{preview, Output};

use clap::{Parser, Subcommand};

/// Deskhand - a local agent gateway
///
/// Turns natural-language instructions into reminders, calendar events and
/// SQL against a local database, through an agent runner.
#[derive(Parser, Debug)]
#[command(name = "deskhand")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DESKHAND_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server for the front-end
    Serve {
        /// Host to bind to (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default: server.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one instruction through the agent and print what it did
    Run {
        /// The instruction (e.g., "remind me to call mom tomorrow at 5pm")
        instruction: String,

        /// Model identifier passed to the runner
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the tools offered to the agent
    Tools,

    /// Invoke a tool directly, without the agent
    Tool {
        #[command(subcommand)]
        action: ToolAction,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ToolAction {
    /// Create a reminder
    Remind {
        /// Reminder text
        title: String,

        /// Due date, 'YYYY-MM-DD HH:MM' local time
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Create a calendar event
    Event {
        /// Event title
        title: String,

        /// Start, 'YYYY-MM-DD HH:MM' local time
        start: String,

        /// End, 'YYYY-MM-DD HH:MM' local time
        end: String,

        /// Notes attached to the event
        #[arg(short, long)]
        notes: Option<String>,

        /// Calendar name (default: automation.default_calendar)
        #[arg(long)]
        calendar: Option<String>,
    },

    /// Execute a SQL statement against the configured database
    Sql {
        /// The statement to execute
        query: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tool_event() {
        let cli = Cli::parse_from([
            "deskhand",
            "tool",
            "event",
            "Standup",
            "2025-06-02 09:00",
            "2025-06-02 09:15",
            "--calendar",
            "Work",
        ]);

        match cli.command {
            Commands::Tool {
                action: ToolAction::Event { title, calendar, notes, .. },
            } => {
                assert_eq!(title, "Standup");
                assert_eq!(calendar.as_deref(), Some("Work"));
                assert!(notes.is_none());
            }
            other => panic!("Expected tool event, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["deskhand", "-vv", "serve", "--port", "9000"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            other => panic!("Expected serve, got {:?}", other),
        }
    }
}
