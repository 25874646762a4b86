//! Driven port running the external transformation tool.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use super::define_port_error;

define_port_error! {
    /// Errors raised when the tool cannot be run at all.
    pub enum TransformerError {
        /// The process could not be started.
        Spawn {
            /// Program name and OS error.
            message: String,
        } => "transformation command could not start: {message}",
        /// Output could not be collected.
        Io {
            /// Program name and OS error.
            message: String,
        } => "transformation command I/O failed: {message}",
    }
}

/// Captured result of one transformation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    /// Full standard output.
    pub stdout: String,
    /// Full standard error.
    pub stderr: String,
    /// Exit status; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl TransformReport {
    /// Whether the tool exited with status zero.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}

/// Return at most the last `max_chars` characters of `text`.
///
/// # Examples
/// ```
/// use worker::domain::ports::tail;
///
/// assert_eq!(tail("abcdef", 3), "def");
/// assert_eq!(tail("ab", 3), "ab");
/// ```
#[must_use]
pub fn tail(text: &str, max_chars: usize) -> &str {
    let skip = text.chars().count().saturating_sub(max_chars);
    text.char_indices()
        .nth(skip)
        .map_or("", |(start, _)| text.get(start..).unwrap_or(text))
}

/// Port running the transformation tool inside a project directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Run the tool with `project_dir` as its working directory, capturing
    /// both output streams and the exit status.
    async fn run(&self, project_dir: &Path) -> Result<TransformReport, TransformerError>;
}

/// Fixture returning a canned report.
#[derive(Debug, Clone)]
pub struct FixtureTransformer {
    report: TransformReport,
}

impl FixtureTransformer {
    /// Always return `report`.
    #[must_use]
    pub const fn new(report: TransformReport) -> Self {
        Self { report }
    }
}

impl Default for FixtureTransformer {
    fn default() -> Self {
        Self::new(TransformReport {
            stdout: "Completed successfully".to_owned(),
            stderr: String::new(),
            exit_code: Some(0),
        })
    }
}

#[async_trait]
impl Transformer for FixtureTransformer {
    async fn run(&self, _project_dir: &Path) -> Result<TransformReport, TransformerError> {
        Ok(self.report.clone())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 5, "")]
    #[case("hello", 0, "")]
    #[case("hello", 10, "hello")]
    #[case("hello", 5, "hello")]
    #[case("hello world", 5, "world")]
    #[case("naïve café", 4, "café")]
    fn tail_counts_characters(#[case] text: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(tail(text, max), expected);
    }

    #[rstest]
    #[case(Some(0), true)]
    #[case(Some(1), false)]
    #[case(None, false)]
    fn only_exit_zero_succeeds(#[case] exit_code: Option<i32>, #[case] expected: bool) {
        let report = TransformReport {
            exit_code,
            ..TransformReport::default()
        };
        assert_eq!(report.succeeded(), expected);
    }
}
