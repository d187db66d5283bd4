use std::env;
use std::time::Duration;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use steward_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::process::Command;
use tokio::time::timeout;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize, JsonSchema)]
pub struct ShellParameters {
    #[schemars(description = "The command line to run.")]
    command: String,
}

/// A tool for running shell commands, capped at a 60 second wall clock.
pub struct ShellTool {
    parameter_schema: Value,
}

impl ShellTool {
    /// Creates a new shell tool.
    #[inline]
    pub fn new() -> Self {
        ShellTool {
            parameter_schema: schema_for!(ShellParameters).to_value(),
        }
    }
}

impl Default for ShellTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ShellTool {
    type Input = ShellParameters;

    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Runs a shell command and returns its stdout and stderr. Commands are killed after 60 seconds."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn requires_confirmation(&self) -> bool {
        true
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ShellParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move { run_command(&input.command, COMMAND_TIMEOUT).await }
    }
}

#[inline]
fn command_with_inferred_shell() -> Command {
    let Some(shell) = env::var_os("SHELL") else {
        return Command::new("/bin/sh");
    };
    Command::new(shell)
}

async fn run_command(command: &str, limit: Duration) -> ToolResult {
    let mut cmd = command_with_inferred_shell();
    cmd.arg("-c").arg(command).kill_on_drop(true);

    let output = match timeout(limit, cmd.output()).await {
        Err(_) => {
            return Err(ToolError::execution_error().with_reason(format!(
                "command timed out after {} seconds",
                limit.as_secs()
            )));
        }
        Ok(Err(err)) => {
            return Err(ToolError::execution_error().with_reason(format!("{err}")));
        }
        Ok(Ok(output)) => output,
    };

    let mut result = String::new();
    if !output.stdout.is_empty() {
        result.push_str(&String::from_utf8_lossy(&output.stdout));
    }
    if !output.stderr.is_empty() {
        result.push_str("\n==> STDERR <==\n");
        result.push_str(&String::from_utf8_lossy(&output.stderr));
    }
    Ok(result)
}
