//! Conversion backends. Each one turns an HTML file into a Markdown file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConvertError, Result};

pub mod html2md;
pub mod notebook;
pub mod pandoc;

pub use self::html2md::Html2mdBackend;
pub use notebook::NotebookBackend;
pub use pandoc::PandocBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// External pandoc executable.
    HighFidelity,
    /// The html2md library.
    Simplified,
    /// The cell walker pipeline.
    Custom,
}

impl BackendKind {
    /// Preference order for `auto`.
    pub const ALL: [BackendKind; 3] = [
        BackendKind::HighFidelity,
        BackendKind::Simplified,
        BackendKind::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::HighFidelity => "high-fidelity",
            BackendKind::Simplified => "simplified",
            BackendKind::Custom => "custom",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "high-fidelity" | "pandoc" => Ok(BackendKind::HighFidelity),
            "simplified" | "html2md" | "markdownify" => Ok(BackendKind::Simplified),
            "custom" => Ok(BackendKind::Custom),
            _ => Err(ConvertError::UnknownMode(s.to_string())),
        }
    }
}

/// One conversion strategy.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Convert `input` into Markdown at `output` and return the written path.
    fn attempt_convert(&self, input: &Path, output: &Path) -> Result<PathBuf>;
}

/// `<dir>/<stem>.md` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("md")
}

pub(crate) fn read_html(input: &Path) -> Result<String> {
    let bytes = fs::read(input).map_err(|source| ConvertError::ReadFailure {
        path: input.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| ConvertError::ParseFailure(format!("invalid UTF-8 encoding: {e}")))
}

pub(crate) fn write_markdown(output: &Path, markdown: &str) -> Result<PathBuf> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConvertError::WriteFailure {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output, markdown).map_err(|source| ConvertError::WriteFailure {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!("pandoc".parse::<BackendKind>().unwrap(), BackendKind::HighFidelity);
        assert_eq!("Markdownify".parse::<BackendKind>().unwrap(), BackendKind::Simplified);
        assert_eq!(BackendKind::Custom.to_string(), "custom");
        assert!("latex".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("exports/run.html")),
            PathBuf::from("exports/run.md")
        );
    }
}
