//! OS automation scripts and the process boundary that runs them.
//!
//! Reminders and calendar events are created by handing a generated script
//! to `osascript`. The exit status and captured output are the only feedback.

use crate::error::{DeskhandError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Scripting language understood by `osascript`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLanguage {
    AppleScript,
    JavaScript,
}

impl std::fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptLanguage::AppleScript => write!(f, "AppleScript"),
            ScriptLanguage::JavaScript => write!(f, "JavaScript"),
        }
    }
}

/// A generated automation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub language: ScriptLanguage,
    pub source: String,
}

impl Script {
    pub fn applescript(source: impl Into<String>) -> Self {
        Self {
            language: ScriptLanguage::AppleScript,
            source: source.into(),
        }
    }

    pub fn javascript(source: impl Into<String>) -> Self {
        Self {
            language: ScriptLanguage::JavaScript,
            source: source.into(),
        }
    }
}

/// Captured result of a finished script process.
#[derive(Debug, Clone, Default)]
pub struct ScriptOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    /// The most useful text for a failed run: stderr, else stdout.
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs automation scripts.
///
/// `Err` means the process could not be run at all; a script that ran and
/// failed comes back as `Ok` with `success == false`.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &Script) -> Result<ScriptOutput>;
}

/// Runs scripts through the `osascript` binary.
pub struct OsascriptRunner {
    program: String,
}

impl OsascriptRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new("osascript")
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    #[instrument(skip(self, script), fields(language = %script.language))]
    async fn run(&self, script: &Script) -> Result<ScriptOutput> {
        let mut command = Command::new(&self.program);
        if script.language == ScriptLanguage::JavaScript {
            command.arg("-l").arg("JavaScript");
        }

        let result = command
            .arg("-e")
            .arg(&script.source)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeskhandError::ToolNotFound(self.program.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        debug!("{} exited with {}", self.program, output.status);

        Ok(ScriptOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Escape text for use inside an AppleScript string literal.
pub fn applescript_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Encode text as a JavaScript string literal.
pub fn javascript_string(text: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    serde_json::Value::String(text.to_string()).to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every script and answers with a canned output.
    pub struct RecordingRunner {
        pub scripts: Mutex<Vec<Script>>,
        output: Option<ScriptOutput>,
    }

    impl RecordingRunner {
        pub fn succeeding() -> Self {
            Self::with_output(ScriptOutput {
                success: true,
                ..ScriptOutput::default()
            })
        }

        pub fn with_output(output: ScriptOutput) -> Self {
            Self {
                scripts: Mutex::new(Vec::new()),
                output: Some(output),
            }
        }

        /// A runner whose process can never be started.
        pub fn missing_binary() -> Self {
            Self {
                scripts: Mutex::new(Vec::new()),
                output: None,
            }
        }

        pub fn calls(&self) -> Vec<Script> {
            self.scripts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptRunner for RecordingRunner {
        async fn run(&self, script: &Script) -> Result<ScriptOutput> {
            self.scripts.lock().unwrap().push(script.clone());
            self.output
                .clone()
                .ok_or_else(|| DeskhandError::ToolNotFound("osascript".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applescript_string_escapes_quotes() {
        assert_eq!(applescript_string(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(applescript_string(r"C:\temp"), r#""C:\\temp""#);
        assert_eq!(applescript_string("two\nlines"), r#""two lines""#);
    }

    #[test]
    fn test_javascript_string_is_json() {
        assert_eq!(javascript_string("it's \"quoted\"\n"), r#""it's \"quoted\"\n""#);
    }

    #[test]
    fn test_failure_detail_prefers_stderr() {
        let output = ScriptOutput {
            success: false,
            stdout: "out".to_string(),
            stderr: "  err\n".to_string(),
        };
        assert_eq!(output.failure_detail(), "err");

        let output = ScriptOutput {
            success: false,
            stdout: "only stdout\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(output.failure_detail(), "only stdout");
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let runner = OsascriptRunner::new("deskhand-no-such-binary");
        let err = runner.run(&Script::applescript("return 1")).await.unwrap_err();
        assert!(matches!(err, DeskhandError::ToolNotFound(_)));
    }
}
