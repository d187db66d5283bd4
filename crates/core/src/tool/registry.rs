use std::sync::Arc;

use serde_json::Value;
use steward_model::ToolSpec;

use super::{AnyTool, Tool, ToolObject};

/// Reported in place of an empty successful tool result, so the model
/// always sees some text.
pub const NO_OUTPUT: &str = "Success (no output)";

/// Holds every registered tool and executes requests by name.
///
/// The catalog preserves registration order. Registration is the only
/// mutation; once the registry is shared with an agent it is read-only,
/// so no synchronization is needed.
#[derive(Default)]
pub struct Registry {
    tools: Vec<Arc<dyn ToolObject>>,
}

impl Registry {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// Re-registering a name silently replaces the earlier tool, keeping
    /// its position in the catalog. Last registration wins.
    pub fn register<T: Tool>(&mut self, tool: T) {
        let object: Arc<dyn ToolObject> = Arc::new(AnyTool(tool));
        match self.tools.iter().position(|t| t.name() == object.name()) {
            Some(idx) => {
                warn!("replacing already registered tool: {}", object.name());
                self.tools[idx] = object;
            }
            None => self.tools.push(object),
        }
    }

    /// Returns the catalog entries to advertise to the model, in
    /// registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Arc<dyn ToolObject>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Executes a tool by name with raw JSON-text arguments.
    ///
    /// This never fails from the caller's point of view: an unknown tool,
    /// undecodable arguments, or any handler failure all come back as a
    /// descriptive `Error: ...` string, and an empty successful result is
    /// normalized to [`NO_OUTPUT`]. The model, not the process, is
    /// expected to react to failures described in plain text.
    pub async fn execute(&self, name: &str, raw_arguments: &str) -> String {
        let Some(tool) = self.lookup(name) else {
            return format!("Error: unknown tool '{name}'");
        };

        let arguments: Value = if raw_arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            match serde_json::from_str(raw_arguments) {
                Ok(value) => value,
                Err(err) => {
                    return format!("Error: tool arguments are not valid JSON: {err}");
                }
            }
        };

        trace!("executing tool {name} with arguments: {arguments}");
        match tool.execute(arguments).await {
            Ok(output) if output.is_empty() => NO_OUTPUT.to_owned(),
            Ok(output) => output,
            Err(err) => format!("Error: {}", err.reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::tool::{Error, ToolResult};

    #[derive(Deserialize)]
    struct EchoInput {
        text: String,
    }

    struct EchoTool {
        schema: Value,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                schema: json!({
                    "type": "object",
                    "properties": {
                        "text": { "type": "string" }
                    },
                    "required": ["text"]
                }),
            }
        }
    }

    impl Tool for EchoTool {
        type Input = EchoInput;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the given text back."
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(input.text))
        }
    }

    struct FailingTool {
        schema: Value,
    }

    impl Tool for FailingTool {
        type Input = Value;

        fn name(&self) -> &str {
            "fail"
        }

        fn description(&self) -> &str {
            "Always fails."
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            _input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Err(Error::execution_error().with_reason("it broke")))
        }
    }

    struct QuietTool {
        schema: Value,
    }

    impl Tool for QuietTool {
        type Input = Value;

        fn name(&self) -> &str {
            "quiet"
        }

        fn description(&self) -> &str {
            "Succeeds without output."
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            _input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(String::new()))
        }
    }

    #[tokio::test]
    async fn test_execute() {
        let mut registry = Registry::new();
        registry.register(EchoTool::new());

        let result = registry.execute("echo", "{\"text\": \"hi\"}").await;
        assert_eq!(result, "hi");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_string() {
        let registry = Registry::new();
        let result = registry.execute("missing_tool", "{}").await;
        assert!(result.starts_with("Error:"));
        assert!(result.contains("missing_tool"));
    }

    #[tokio::test]
    async fn test_handler_failure_is_an_error_string() {
        let mut registry = Registry::new();
        registry.register(FailingTool { schema: json!({}) });

        let result = registry.execute("fail", "{}").await;
        assert_eq!(result, "Error: it broke");
    }

    #[tokio::test]
    async fn test_bad_arguments_are_an_error_string() {
        let mut registry = Registry::new();
        registry.register(EchoTool::new());

        let result = registry.execute("echo", "{\"text\": 42}").await;
        assert!(result.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_empty_output_normalized() {
        let mut registry = Registry::new();
        registry.register(QuietTool { schema: json!({}) });

        let result = registry.execute("quiet", "{}").await;
        assert_eq!(result, NO_OUTPUT);
    }

    #[test]
    fn test_catalog_order_and_overwrite() {
        let mut registry = Registry::new();
        registry.register(EchoTool::new());
        registry.register(FailingTool { schema: json!({}) });
        registry.register(QuietTool { schema: json!({}) });

        let names: Vec<String> =
            registry.specs().into_iter().map(|spec| spec.name).collect();
        assert_eq!(names, vec!["echo", "fail", "quiet"]);

        // Last registration wins, keeping the original position.
        struct EchoV2 {
            schema: Value,
        }
        impl Tool for EchoV2 {
            type Input = Value;

            fn name(&self) -> &str {
                "echo"
            }

            fn description(&self) -> &str {
                "A replacement."
            }

            fn parameter_schema(&self) -> &Value {
                &self.schema
            }

            fn execute(
                &self,
                _input: Self::Input,
            ) -> impl Future<Output = ToolResult> + Send + 'static {
                ready(Ok("v2".to_owned()))
            }
        }
        registry.register(EchoV2 { schema: json!({}) });

        let specs = registry.specs();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].name, "echo");
        assert_eq!(specs[0].description, "A replacement.");
    }
}
