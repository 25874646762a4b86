//! Capability-scoped model writer.
//!
//! The generated models directory is created on demand; writes go through a
//! `cap_std` handle on that directory, so a file name can never address
//! anything outside it.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;

use crate::domain::ports::{ModelWriter, ModelWriterError};
use crate::domain::{GENERATED_MODELS_DIR, GeneratedModel};

/// Writes models into `<project>/models/generated/`.
#[derive(Debug, Clone)]
pub struct CapStdModelWriter {
    models_dir: PathBuf,
}

impl CapStdModelWriter {
    /// Writer targeting the generated models directory of `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        let models_dir = GENERATED_MODELS_DIR
            .iter()
            .fold(project_dir.as_ref().to_path_buf(), |dir, part| dir.join(part));
        Self { models_dir }
    }

    /// Directory models are written to.
    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }
}

fn write_model(models_dir: &Path, file_name: &str, contents: &str) -> io::Result<()> {
    Dir::create_ambient_dir_all(models_dir, ambient_authority())?;
    let dir = Dir::open_ambient_dir(models_dir, ambient_authority())?;
    dir.write(file_name, contents)
}

#[async_trait]
impl ModelWriter for CapStdModelWriter {
    async fn write(&self, model: &GeneratedModel) -> Result<PathBuf, ModelWriterError> {
        let models_dir = self.models_dir.clone();
        let file_name = model.file_name().to_owned();
        let contents = model.contents().to_owned();
        let path = models_dir.join(&file_name);
        tokio::task::spawn_blocking(move || write_model(&models_dir, &file_name, &contents))
            .await
            .map_err(|error| ModelWriterError::io(error.to_string()))?
            .map_err(|error| ModelWriterError::io(format!("{}: {error}", path.display())))?;
        Ok(path)
    }
}
