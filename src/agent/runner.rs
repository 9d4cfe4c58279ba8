//! Agent runners: the seam between the gateway and whatever does the reasoning.

use crate::config::AgentSettings;
use crate::error::{DeskhandError, Result};
use crate::openai::create_client;
use crate::tools::{ToolDescriptor, Toolbox};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info};

/// System prompt for the OpenAI-compatible runner. `{now}` is replaced with
/// the current local time on every run.
const SYSTEM_PROMPT: &str = r#"You are a helpful assistant that completes tasks on the user's computer.

You can create reminders, create calendar events and run SQL against the local database.
Do not ask the user for clarification; pick reasonable defaults and complete the task.
Dates passed to tools use local time in the format 'YYYY-MM-DD HH:MM'.
If a tool reports a failure (a result starting with '✗'), try to fix the call or explain what went wrong.

When you are done, reply with a short description of what you did.

The current date and time is {now}."#;

/// Executes one instruction, optionally calling tools along the way.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run `instruction` with `model`, offering `tools`.
    ///
    /// Tool failures are part of a successful run. `Err` means the run
    /// itself could not complete (model unavailable, transport failure, ...).
    async fn submit(&self, instruction: &str, model: &str, tools: &Toolbox) -> Result<RunOutcome>;
}

/// Result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// The runner's final text, if it produced any.
    pub final_output: Option<String>,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Runner backed by an OpenAI-compatible chat completions endpoint.
///
/// The model picks tools; the calls themselves run locally through the
/// [`Toolbox`].
pub struct OpenAiRunner {
    client: Client<OpenAIConfig>,
    max_iterations: usize,
    system_prompt: String,
}

impl OpenAiRunner {
    /// Create a runner from agent settings.
    pub fn new(settings: &AgentSettings) -> Result<Self> {
        Ok(Self::with_client(create_client(settings)?, settings.max_iterations))
    }

    pub fn with_client(client: Client<OpenAIConfig>, max_iterations: usize) -> Self {
        Self {
            client,
            max_iterations,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Set a custom system prompt. `{now}` is still substituted.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    fn system_message(&self) -> String {
        let now = chrono::Local::now().format("%A, %Y-%m-%d %H:%M").to_string();
        self.system_prompt.replace("{now}", &now)
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(
        &self,
        tools: &Toolbox,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = tools.invoke(name, arguments).await;

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

#[async_trait]
impl AgentRunner for OpenAiRunner {
    async fn submit(&self, instruction: &str, model: &str, tools: &Toolbox) -> Result<RunOutcome> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_message())
                .build()
                .map_err(|e| DeskhandError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(instruction.to_string())
                .build()
                .map_err(|e| DeskhandError::Agent(e.to_string()))?
                .into(),
        ];

        let definitions = tool_definitions(&tools.descriptors());
        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(DeskhandError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request.model(model).messages(messages.clone());
            if !definitions.is_empty() {
                request.tools(definitions.clone());
            }
            let request = request
                .build()
                .map_err(|e| DeskhandError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| DeskhandError::Runner(e.to_string()))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| DeskhandError::Runner("No response from model".to_string()))?;

            let tool_calls = match &choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(RunOutcome {
                        final_output: choice.message.content.clone(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            // Add assistant message with tool calls to history
            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| DeskhandError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tools, tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| DeskhandError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }
}

/// Convert tool descriptors to OpenAI function definitions.
pub fn tool_definitions(descriptors: &[ToolDescriptor]) -> Vec<ChatCompletionTool> {
    descriptors
        .iter()
        .map(|d| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: d.name.clone(),
                description: Some(d.description.clone()),
                parameters: Some(d.parameters.clone()),
                strict: None,
            },
        })
        .collect()
}
