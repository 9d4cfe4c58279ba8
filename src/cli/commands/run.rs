//! Run command: one instruction through the gateway, from the terminal.

use crate::agent::OpenAiRunner;
use crate::cli::preflight::{self, Operation};
use crate::cli::{preview, Output};
use crate::config::Settings;
use crate::gateway::{DedalusResponse, Gateway};
use crate::tools::Toolbox;
use anyhow::Result;
use std::sync::Arc;

/// Run the run command.
pub async fn run_run(instruction: &str, model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'deskhand doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let runner = Arc::new(OpenAiRunner::new(&settings.agent)?);
    let gateway = Gateway::new(
        runner,
        Toolbox::standard(&settings),
        settings.agent.default_model.clone(),
    );

    let spinner = Output::spinner("Agent working...");

    match gateway.execute(instruction, model.as_deref()).await {
        Ok(outcome) => {
            spinner.finish_and_clear();

            let response = DedalusResponse::from_outcome(&outcome);
            println!("\n{}\n", response.description);

            if !outcome.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", outcome.tool_calls.len()));
                for call in &outcome.tool_calls {
                    Output::info(&format!("  {} {}", call.name, preview(&call.arguments, 60)));
                    Output::tool_result(&format!("     {}", preview(&call.result, 100)));
                }
                println!();
            }

            Output::info(&format!("Completed in {} iteration(s)", outcome.iterations));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
