//! Runs the transformation tool as a child process.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ports::{TransformReport, Transformer, TransformerError};

/// Command line run when none is configured.
pub const DEFAULT_TRANSFORM_COMMAND: &str = "dbt run";

/// Transformer spawning a configured command line in the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTransformer {
    program: String,
    args: Vec<String>,
}

impl ProcessTransformer {
    /// Split a whitespace-separated command line into program and arguments.
    ///
    /// # Errors
    /// Returns [`TransformerError::Spawn`] when the command line is blank.
    ///
    /// # Examples
    /// ```
    /// use worker::outbound::transformer::ProcessTransformer;
    ///
    /// let transformer = ProcessTransformer::from_command_line("dbt run --select orders_clean")
    ///     .expect("non-blank command");
    /// assert_eq!(transformer.program(), "dbt");
    /// assert_eq!(transformer.args(), ["run", "--select", "orders_clean"]);
    /// ```
    pub fn from_command_line(command_line: &str) -> Result<Self, TransformerError> {
        let mut words = command_line.split_whitespace().map(str::to_owned);
        let program = words
            .next()
            .ok_or_else(|| TransformerError::spawn("transformation command is blank"))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    /// Executable name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl Transformer for ProcessTransformer {
    async fn run(&self, project_dir: &Path) -> Result<TransformReport, TransformerError> {
        debug!(program = %self.program, dir = %project_dir.display(), "spawning transformation");
        let child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|error| TransformerError::spawn(format!("{}: {error}", self.program)))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|error| TransformerError::io(format!("{}: {error}", self.program)))?;

        Ok(TransformReport {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
