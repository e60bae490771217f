//! Backend selection: run one named backend, or try them in order.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::Settings;
use crate::error::{AttemptFailure, ConvertError, Result};
use crate::generator::{
    Backend, BackendKind, Html2mdBackend, NotebookBackend, PandocBackend, default_output_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Auto,
    Only(BackendKind),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => f.write_str("auto"),
            Mode::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(Mode::Auto)
        } else {
            s.parse().map(Mode::Only)
        }
    }
}

impl From<BackendKind> for Mode {
    fn from(kind: BackendKind) -> Self {
        Mode::Only(kind)
    }
}

/// Why a conversion produced no Markdown.
#[derive(Debug)]
pub struct ConversionFailure {
    /// The last backend that was attempted, if any ran at all.
    pub backend: Option<BackendKind>,
    pub error: ConvertError,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backend {
            Some(backend) => write!(f, "{backend} backend failed: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ConversionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

pub type ConversionResult = std::result::Result<PathBuf, ConversionFailure>;

/// A finished conversion and the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub backend: BackendKind,
    pub path: PathBuf,
}

/// Ordered list of backends, tried first to last in `auto` mode.
pub struct BackendSelector {
    backends: Vec<Box<dyn Backend>>,
}

impl BackendSelector {
    pub fn new(backends: Vec<Box<dyn Backend>>) -> Self {
        Self { backends }
    }

    /// pandoc, then html2md, then the custom pipeline.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(vec![
            Box::new(PandocBackend::from_settings(settings)),
            Box::new(Html2mdBackend::new()),
            Box::new(NotebookBackend::from_settings(settings)),
        ])
    }

    pub fn kinds(&self) -> Vec<BackendKind> {
        self.backends.iter().map(|b| b.kind()).collect()
    }

    /// Convert `input`, writing to `output` or `<stem>.md` beside the input.
    pub fn convert(&self, input: &Path, output: Option<&Path>, mode: Mode) -> ConversionResult {
        self.run(input, output, mode).map(|converted| converted.path)
    }

    /// Like [`convert`](Self::convert), also naming the backend that succeeded.
    pub fn run(
        &self,
        input: &Path,
        output: Option<&Path>,
        mode: Mode,
    ) -> std::result::Result<Converted, ConversionFailure> {
        if !input.is_file() {
            tracing::error!("HTML file not found: {}", input.display());
            return Err(ConversionFailure {
                backend: None,
                error: ConvertError::InputNotFound(input.to_path_buf()),
            });
        }

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input));
        tracing::info!("converting {} to Markdown ({mode})", input.display());

        let result = match mode {
            Mode::Only(kind) => self.convert_with(kind, input, &output),
            Mode::Auto => self.convert_auto(input, &output),
        };

        match &result {
            Ok(converted) => tracing::info!(
                "converted to: {} ({} backend)",
                converted.path.display(),
                converted.backend
            ),
            Err(failure) => tracing::error!("{failure}"),
        }
        result
    }

    fn convert_with(
        &self,
        kind: BackendKind,
        input: &Path,
        output: &Path,
    ) -> std::result::Result<Converted, ConversionFailure> {
        let Some(backend) = self.backends.iter().find(|b| b.kind() == kind) else {
            return Err(ConversionFailure {
                backend: Some(kind),
                error: ConvertError::BackendUnavailable {
                    backend: kind,
                    reason: "not registered".to_string(),
                },
            });
        };

        attempt(backend.as_ref(), input, output)
            .map(|path| Converted { backend: kind, path })
            .map_err(|error| ConversionFailure {
                backend: Some(kind),
                error,
            })
    }

    fn convert_auto(&self, input: &Path, output: &Path) -> std::result::Result<Converted, ConversionFailure> {
        let mut attempts = Vec::new();

        for backend in &self.backends {
            match attempt(backend.as_ref(), input, output) {
                Ok(path) => {
                    if !attempts.is_empty() {
                        tracing::info!("{} backend succeeded after {} failed", backend.kind(), attempts.len());
                    }
                    return Ok(Converted {
                        backend: backend.kind(),
                        path,
                    });
                }
                Err(error) => {
                    tracing::warn!("{} backend failed, trying next: {error}", backend.kind());
                    attempts.push(AttemptFailure {
                        backend: backend.kind(),
                        error,
                    });
                }
            }
        }

        Err(ConversionFailure {
            backend: attempts.last().map(|a| a.backend),
            error: ConvertError::AllBackendsFailed { attempts },
        })
    }
}

/// Run one backend, turning a panic or an empty result into an error.
fn attempt(backend: &dyn Backend, input: &Path, output: &Path) -> Result<PathBuf> {
    let kind = backend.kind();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| backend.attempt_convert(input, output)))
        .map_err(|payload| ConvertError::BackendPanicked {
            backend: kind,
            message: panic_message(payload.as_ref()),
        })?;

    let path = outcome?;
    if path.as_os_str().is_empty() {
        return Err(ConvertError::EmptyOutput { backend: kind, path });
    }
    Ok(path)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
