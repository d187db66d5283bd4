use std::fs;
use std::path::Path;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use steward_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::task::spawn_blocking;

#[derive(Deserialize, JsonSchema)]
pub struct WriteFileParameters {
    #[schemars(description = "Path of the file to write.")]
    path: String,
    #[schemars(description = "Content to write.")]
    content: String,
}

/// A tool for writing a file, creating parent directories as needed.
/// Overwrites an existing file.
pub struct WriteFileTool {
    parameter_schema: Value,
}

impl WriteFileTool {
    /// Creates a new write file tool.
    #[inline]
    pub fn new() -> Self {
        WriteFileTool {
            parameter_schema: schema_for!(WriteFileParameters).to_value(),
        }
    }
}

impl Default for WriteFileTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WriteFileTool {
    type Input = WriteFileParameters;

    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to the file at the given path, creating parent directories and overwriting any existing file."
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
        input: WriteFileParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            spawn_blocking(move || write_file(&input.path, &input.content))
                .await
                .map_err(|_| {
                    ToolError::execution_error().with_reason("write task failed")
                })?
        }
    }
}

fn write_file(path: &str, content: &str) -> ToolResult {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("{}: {err}", parent.display()))
            })?;
        }
    }
    fs::write(path, content).map_err(|err| {
        ToolError::execution_error().with_reason(format!("{path}: {err}"))
    })?;
    Ok(format!("Wrote {} bytes to {path}", content.len()))
}
