use std::fmt;
use std::path::PathBuf;

use crate::generator::BackendKind;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("HTML file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{backend} backend unavailable: {reason}")]
    BackendUnavailable { backend: BackendKind, reason: String },

    #[error("failed to parse document: {0}")]
    ParseFailure(String),

    #[error("failed to render cell: {0}")]
    RenderFailure(String),

    #[error("failed to extract image {index}: {reason}")]
    ImageDecodeFailure { index: usize, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{backend} backend produced no output at {}", .path.display())]
    EmptyOutput { backend: BackendKind, path: PathBuf },

    #[error("{backend} backend panicked: {message}")]
    BackendPanicked { backend: BackendKind, message: String },

    #[error("all backends failed: {}", AttemptList(.attempts))]
    AllBackendsFailed { attempts: Vec<AttemptFailure> },

    #[error("unknown conversion mode: {0}")]
    UnknownMode(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// One failed backend attempt, kept for the `auto` mode report.
#[derive(Debug)]
pub struct AttemptFailure {
    pub backend: BackendKind,
    pub error: ConvertError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.backend, self.error)
    }
}

struct AttemptList<'a>(&'a [AttemptFailure]);

impl fmt::Display for AttemptList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attempt}")?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
