use std::fs;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use steward_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::task::spawn_blocking;

#[derive(Deserialize, JsonSchema)]
pub struct ListDirParameters {
    #[schemars(description = "Directory to list; defaults to the current directory.")]
    path: Option<String>,
}

/// A tool for listing the entries of a directory.
pub struct ListDirTool {
    parameter_schema: Value,
}

impl ListDirTool {
    /// Creates a new list directory tool.
    #[inline]
    pub fn new() -> Self {
        ListDirTool {
            parameter_schema: schema_for!(ListDirParameters).to_value(),
        }
    }
}

impl Default for ListDirTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ListDirTool {
    type Input = ListDirParameters;

    fn name(&self) -> &str {
        "list_dir"
    }

    fn description(&self) -> &str {
        "Lists the files and directories at the given path, directories marked with a trailing slash."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ListDirParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            let path = input.path.unwrap_or_else(|| ".".to_owned());
            spawn_blocking(move || list_dir(&path))
                .await
                .map_err(|_| {
                    ToolError::execution_error().with_reason("list task failed")
                })?
        }
    }
}

fn list_dir(path: &str) -> ToolResult {
    let entries = fs::read_dir(path).map_err(|err| {
        ToolError::execution_error().with_reason(format!("{path}: {err}"))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            ToolError::execution_error().with_reason(format!("{path}: {err}"))
        })?;
        let mut name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();

    if names.is_empty() {
        Ok("Directory is empty".to_owned())
    } else {
        Ok(names.join("\n"))
    }
}
