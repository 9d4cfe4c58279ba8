//! Pre-flight checks before starting work that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{DeskhandError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Running instructions needs the runner API key.
    Agent,
    /// Reminders and calendar events need `osascript`.
    Automation,
    /// SQL has no external requirements beyond the database file.
    Sql,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Agent => {
            check_api_key(&settings.agent.api_key_env)?;
        }
        Operation::Automation => {
            check_osascript(&settings.automation.osascript)?;
        }
        Operation::Sql => {}
    }
    Ok(())
}

/// Check that the runner API key is present.
pub fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(DeskhandError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(DeskhandError::Config(format!(
            "{} not set. Set it with: export {}='...' or add it to .env",
            var, var
        ))),
    }
}

/// Check that `osascript` can run a trivial script.
pub fn check_osascript(program: &str) -> Result<()> {
    match Command::new(program).arg("-e").arg("return 1").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(DeskhandError::ToolNotFound(format!(
            "{} is installed but not working correctly: {}",
            program,
            String::from_utf8_lossy(&output.stderr).trim()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DeskhandError::ToolNotFound(program.to_string()))
        }
        Err(e) => Err(DeskhandError::ToolNotFound(format!("{}: {}", program, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_has_no_requirements() {
        assert!(check(Operation::Sql, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_key_reported() {
        let err = check_api_key("DESKHAND_PREFLIGHT_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("DESKHAND_PREFLIGHT_UNSET_KEY not set"));
    }

    #[test]
    fn test_missing_osascript_reported() {
        let err = check_osascript("deskhand-no-such-osascript").unwrap_err();
        assert!(matches!(err, DeskhandError::ToolNotFound(_)));
    }
}
