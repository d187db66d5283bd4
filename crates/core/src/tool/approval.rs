use std::fmt::{self, Debug, Display};

use serde_json::Value;

/// A pending tool invocation awaiting the user's decision.
///
/// Carries exactly what a confirmation prompt should show: the tool name
/// and the decoded argument payload.
#[derive(Clone, Debug)]
pub struct Approval {
    tool: String,
    arguments: Value,
}

impl Approval {
    pub(crate) fn new<S: Into<String>>(tool: S, arguments: Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }

    /// The name of the tool about to run.
    #[inline]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The arguments the tool would run with.
    #[inline]
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

impl Display for Approval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments = serde_json::to_string_pretty(&self.arguments)
            .unwrap_or_else(|_| self.arguments.to_string());
        write!(f, "{}: {arguments}", self.tool)
    }
}
