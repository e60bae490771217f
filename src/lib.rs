pub mod config;
pub mod converter;
pub mod error;
pub mod generator;
pub mod selector;

use std::path::Path;

pub use crate::config::{SETTINGS, Settings};
pub use error::{ConvertError, Result};
pub use generator::{Backend, BackendKind};
pub use selector::{BackendSelector, ConversionFailure, ConversionResult, Converted, Mode};

/// Convert an HTML file to `<stem>.md` next to it, using the global settings.
pub fn convert(path: impl AsRef<Path>, mode: Mode) -> ConversionResult {
    BackendSelector::from_settings(&SETTINGS).convert(path.as_ref(), None, mode)
}

/// Like [`convert`] with an explicit Markdown destination.
pub fn convert_to(path: impl AsRef<Path>, output: impl AsRef<Path>, mode: Mode) -> ConversionResult {
    BackendSelector::from_settings(&SETTINGS).convert(path.as_ref(), Some(output.as_ref()), mode)
}
