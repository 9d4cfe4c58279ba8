//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Deskhand Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("OS Automation").bold());
    let automation = check_osascript(&settings.automation.osascript);
    automation.print();
    checks.push(automation);

    println!();

    println!("{}", style("Agent Runner").bold());
    let key = check_api_key(&settings.agent.api_key_env);
    key.print();
    checks.push(key);
    Output::kv("Endpoint", &settings.agent.api_base);
    Output::kv("Default model", &settings.agent.default_model);

    println!();

    println!("{}", style("Database").bold());
    let database = check_database(settings);
    database.print();
    checks.push(database);

    println!();

    println!("{}", style("Configuration").bold());
    let config_file = check_config_file();
    config_file.print();
    checks.push(config_file);
    let validity = check_settings(settings);
    validity.print();
    checks.push(validity);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Deskhand.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Deskhand is ready to use.");
    }

    Ok(())
}

/// Reminders and calendar events need a working `osascript`.
fn check_osascript(program: &str) -> CheckResult {
    let hint = if cfg!(target_os = "macos") {
        "Grant Automation permission to your terminal in System Settings → Privacy & Security"
    } else {
        "Reminders and calendar events require macOS; SQL still works"
    };

    match Command::new(program).arg("-e").arg("return \"ok\"").output() {
        Ok(output) if output.status.success() => CheckResult::ok(program, "available"),
        Ok(output) => CheckResult::error(
            program,
            &format!(
                "installed but not working: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            hint,
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::warning(program, "not found", hint)
        }
        Err(e) => CheckResult::error(program, &format!("error: {}", e), hint),
    }
}

fn check_api_key(var: &str) -> CheckResult {
    let hint = format!("Set with: export {}='...' (or add it to .env)", var);
    match std::env::var(var) {
        Ok(key) if key.trim().is_empty() => CheckResult::error(var, "empty", &hint),
        Ok(key) => CheckResult::ok(var, &format!("configured ({})", mask(&key))),
        Err(_) => CheckResult::error(var, "not set", &hint),
    }
}

/// Show only the edges of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_database(settings: &Settings) -> CheckResult {
    let db_path = settings.database_path();
    if db_path.exists() {
        let size = std::fs::metadata(&db_path)
            .map(|m| format_size(m.len()))
            .unwrap_or_else(|_| "unknown size".to_string());
        CheckResult::ok("Database", &format!("{} ({})", db_path.display(), size))
    } else {
        CheckResult::warning(
            "Database",
            &format!("{} (not found)", db_path.display()),
            "SQLite creates an empty file on first use; point database.path at the real one",
        )
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override", config_path.display()),
        )
    }
}

fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok("Settings", "valid"),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the value in your config file"),
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "*****");
        assert_eq!(mask("dsk_live_abcdefghijkl"), "dsk_...ijkl");
    }

    #[test]
    fn test_missing_database_is_warning() {
        let mut settings = Settings::default();
        settings.database.path = "/nonexistent-deskhand/db.sqlite".to_string();
        assert_eq!(check_database(&settings).status, CheckStatus::Warning);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }
}
