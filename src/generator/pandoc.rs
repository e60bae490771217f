use std::fs;
use std::io::ErrorKind;
use std::path::{self, Path, PathBuf};
use std::process::Command;

use crate::config::Settings;
use crate::error::{ConvertError, Result};
use crate::generator::{Backend, BackendKind};

/// Runs the external pandoc converter.
#[derive(Debug, Clone)]
pub struct PandocBackend {
    program: String,
    format: String,
    image_dir: String,
}

impl PandocBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            format: "markdown".to_string(),
            image_dir: "images".to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            program: settings.pandoc_path.clone(),
            format: settings.pandoc_format.clone(),
            image_dir: settings.image_dir.clone(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("--version").output().is_ok()
    }

    fn unavailable(&self, reason: String) -> ConvertError {
        ConvertError::BackendUnavailable {
            backend: BackendKind::HighFidelity,
            reason,
        }
    }
}

impl Backend for PandocBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::HighFidelity
    }

    fn attempt_convert(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        // pandoc resolves --extract-media against its working directory,
        // which is the output's directory so media lands next to the file
        let input = path::absolute(input).map_err(|source| ConvertError::ReadFailure {
            path: input.to_path_buf(),
            source,
        })?;
        let output = path::absolute(output).map_err(|source| ConvertError::WriteFailure {
            path: output.to_path_buf(),
            source,
        })?;
        let workdir = output.parent().map(Path::to_path_buf).unwrap_or_default();
        fs::create_dir_all(&workdir).map_err(|source| ConvertError::WriteFailure {
            path: workdir.clone(),
            source,
        })?;

        let mut cmd = Command::new(&self.program);
        cmd.arg(&input)
            .arg("-f")
            .arg("html")
            .arg("-t")
            .arg(&self.format)
            .arg("--wrap=none")
            .arg(format!("--extract-media={}", self.image_dir))
            .arg("-o")
            .arg(&output)
            .current_dir(&workdir);

        let result = match cmd.output() {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(self.unavailable(format!("{} not found", self.program)));
            }
            Err(e) => return Err(self.unavailable(format!("failed to execute {}: {e}", self.program))),
        };

        if !result.status.success() {
            return Err(ConvertError::ToolFailed {
                tool: self.program.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let written = fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            match fs::remove_file(&output) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("could not remove empty {}: {e}", output.display()),
            }
            return Err(ConvertError::EmptyOutput {
                backend: BackendKind::HighFidelity,
                path: output,
            });
        }

        Ok(output)
    }
}
