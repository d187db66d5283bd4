use std::fs;

use regex::RegexBuilder;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use steward_core::tool::{Error as ToolError, Tool, ToolResult};
use tokio::task::spawn_blocking;
use walkdir::{DirEntry, WalkDir};

const MAX_MATCHES: usize = 50;
const MAX_LINE_LEN: usize = 100;
const SKIP_DIRS: &[&str] = &["node_modules", "target", "__pycache__", "venv"];
const TRUNCATION_MARKER: &str = "... (too many matches, truncated)";

#[derive(Deserialize, JsonSchema)]
pub struct SearchFilesParameters {
    #[schemars(description = "Directory to search in.")]
    path: String,
    #[schemars(description = "Regular expression to match, case-insensitive.")]
    pattern: String,
    #[schemars(description = "Only search files with this extension, e.g. \".rs\".")]
    file_extension: Option<String>,
}

/// A tool for searching file contents recursively.
pub struct SearchFilesTool {
    parameter_schema: Value,
}

impl SearchFilesTool {
    /// Creates a new search tool.
    #[inline]
    pub fn new() -> Self {
        SearchFilesTool {
            parameter_schema: schema_for!(SearchFilesParameters).to_value(),
        }
    }
}

impl Default for SearchFilesTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SearchFilesTool {
    type Input = SearchFilesParameters;

    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Searches files under a directory for lines matching a case-insensitive pattern, reporting up to 50 matches as path:line: text."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: SearchFilesParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async move {
            spawn_blocking(move || search(&input))
                .await
                .map_err(|_| {
                    ToolError::execution_error().with_reason("search task failed")
                })?
        }
    }
}

/// Hidden entries and well-known build/dependency directories are never
/// descended into. The search root itself is always kept, so searching
/// `.` works.
fn is_skipped(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && SKIP_DIRS.contains(&name.as_ref())
}

fn search(params: &SearchFilesParameters) -> ToolResult {
    let regex = RegexBuilder::new(&params.pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| {
            ToolError::invalid_input()
                .with_reason(format!("invalid pattern {:?}: {err}", params.pattern))
        })?;

    let mut matches = Vec::new();
    let walker = WalkDir::new(&params.path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(entry));
    for entry in walker {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(extension) = &params.file_extension {
            if !entry.file_name().to_string_lossy().ends_with(extension.as_str()) {
                continue;
            }
        }
        // Unreadable and non-UTF-8 files are silently skipped.
        let Ok(contents) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for (index, line) in contents.lines().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            let shown: String = line.trim().chars().take(MAX_LINE_LEN).collect();
            matches.push(format!(
                "{}:{}: {shown}",
                entry.path().display(),
                index + 1
            ));
            if matches.len() >= MAX_MATCHES {
                matches.push(TRUNCATION_MARKER.to_owned());
                return Ok(matches.join("\n"));
            }
        }
    }

    if matches.is_empty() {
        Ok("No matches found".to_owned())
    } else {
        Ok(matches.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(path: &str, pattern: &str, extension: Option<&str>) -> SearchFilesParameters {
        SearchFilesParameters {
            path: path.to_owned(),
            pattern: pattern.to_owned(),
            file_extension: extension.map(str::to_owned),
        }
    }

    #[test]
    fn test_case_insensitive_match_with_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "alpha\nBRAVO charlie\n").unwrap();

        let result =
            search(&params(&dir.path().to_string_lossy(), "bravo", None)).unwrap();
        assert!(result.contains("notes.txt:2: BRAVO charlie"));
    }

    #[test]
    fn test_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "needle\n").unwrap();
        fs::write(dir.path().join("b.txt"), "needle\n").unwrap();

        let result =
            search(&params(&dir.path().to_string_lossy(), "needle", Some(".rs")))
                .unwrap();
        assert!(result.contains("a.rs"));
        assert!(!result.contains("b.txt"));
    }

    #[test]
    fn test_hidden_and_ignored_dirs_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/config"), "needle\n").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "needle\n").unwrap();
        fs::write(dir.path().join("keep.txt"), "needle\n").unwrap();

        let result =
            search(&params(&dir.path().to_string_lossy(), "needle", None)).unwrap();
        assert!(result.contains("keep.txt"));
        assert!(!result.contains(".git"));
        assert!(!result.contains("node_modules"));
    }

    #[test]
    fn test_result_cap_with_truncation_marker() {
        let dir = tempfile::tempdir().unwrap();
        let many_lines = "needle\n".repeat(MAX_MATCHES + 10);
        fs::write(dir.path().join("big.txt"), many_lines).unwrap();

        let result =
            search(&params(&dir.path().to_string_lossy(), "needle", None)).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), MAX_MATCHES + 1);
        assert_eq!(lines[MAX_MATCHES], TRUNCATION_MARKER);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = search(&params(&dir.path().to_string_lossy(), "[", None)).unwrap_err();
        assert!(err.reason().contains("["));
    }

    #[test]
    fn test_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "nothing here\n").unwrap();

        let result =
            search(&params(&dir.path().to_string_lossy(), "needle", None)).unwrap();
        assert_eq!(result, "No matches found");
    }
}
