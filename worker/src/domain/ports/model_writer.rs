//! Driven port persisting generated models into the transformation project.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::GeneratedModel;

define_port_error! {
    /// Errors raised while writing a model file.
    pub enum ModelWriterError {
        /// The directory or file could not be created or written.
        Io {
            /// Underlying I/O error text.
            message: String,
        } => "model file write failed: {message}",
    }
}

/// Port writing one generated model, replacing any previous version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelWriter: Send + Sync {
    /// Write `model` and return the path it now lives at.
    async fn write(&self, model: &GeneratedModel) -> Result<PathBuf, ModelWriterError>;
}

/// Fixture keeping written models in memory.
#[derive(Debug, Default)]
pub struct FixtureModelWriter {
    written: Mutex<Vec<GeneratedModel>>,
}

impl FixtureModelWriter {
    /// Models written so far, oldest first.
    #[must_use]
    pub fn written(&self) -> Vec<GeneratedModel> {
        self.written
            .lock()
            .map(|models| models.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelWriter for FixtureModelWriter {
    async fn write(&self, model: &GeneratedModel) -> Result<PathBuf, ModelWriterError> {
        self.written
            .lock()
            .map_err(|err| ModelWriterError::io(err.to_string()))?
            .push(model.clone());
        Ok(["models", "generated", model.file_name()].iter().collect())
    }
}
