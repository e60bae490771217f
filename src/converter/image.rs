use base64::Engine;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
}

impl ImageFormat {
    /// Substring match on the data URI header; unknown types become png.
    pub fn from_header(header: &str) -> Self {
        if header.contains("png") {
            ImageFormat::Png
        } else if header.contains("jpeg") || header.contains("jpg") {
            ImageFormat::Jpeg
        } else if header.contains("svg") {
            ImageFormat::Svg
        } else {
            ImageFormat::Png
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }
}

/// An image written to disk.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub index: usize,
    pub format: ImageFormat,
    pub file_name: String,
    pub path: PathBuf,
    /// Path to embed in the Markdown, relative to the Markdown file.
    pub link: String,
    pub size: usize,
}

pub fn is_base64_data_uri(src: &str) -> bool {
    src.starts_with("data:")
        && src
            .split_once(',')
            .is_some_and(|(header, _)| header.ends_with(";base64"))
}

/// Split `data:<mime>;base64,<payload>` and decode the payload.
pub fn decode_data_uri(uri: &str) -> std::result::Result<(ImageFormat, Vec<u8>), String> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    if !header.starts_with("data:") {
        return Err(format!("not a data URI: {header}"));
    }

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| format!("invalid base64 payload: {e}"))?;
    if bytes.is_empty() {
        return Err("empty image payload".to_string());
    }

    Ok((ImageFormat::from_header(header), bytes))
}

/// Per-conversion image state: output directory and the running counter.
///
/// The counter advances once per extraction attempt, failed or not, so
/// an index is never handed out twice within one conversion.
#[derive(Debug)]
pub struct ImageContext {
    dir: PathBuf,
    markdown_dir: PathBuf,
    dir_name: String,
    extract: bool,
    next_index: usize,
    extracted: Vec<ImageAsset>,
    failures: usize,
}

impl ImageContext {
    pub fn new(markdown_path: &Path, dir_name: &str, extract: bool) -> Self {
        let markdown_dir = markdown_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            dir: markdown_dir.join(dir_name),
            markdown_dir,
            dir_name: dir_name.to_string(),
            extract,
            next_index: 0,
            extracted: Vec::new(),
            failures: 0,
        }
    }

    pub fn extraction_enabled(&self) -> bool {
        self.extract
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extracted(&self) -> &[ImageAsset] {
        &self.extracted
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn extract(&mut self, data_uri: &str) -> Result<ImageAsset> {
        let index = self.next_index;
        self.next_index += 1;

        match self.write_image(index, data_uri) {
            Ok(asset) => {
                tracing::debug!(file = %asset.file_name, bytes = asset.size, "extracted image");
                self.extracted.push(asset.clone());
                Ok(asset)
            }
            Err(reason) => {
                self.failures += 1;
                Err(ConvertError::ImageDecodeFailure { index, reason })
            }
        }
    }

    fn write_image(&self, index: usize, data_uri: &str) -> std::result::Result<ImageAsset, String> {
        let (format, bytes) = decode_data_uri(data_uri)?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("failed to create {}: {e}", self.dir.display()))?;

        let file_name = format!("image_{:03}.{}", index, format.extension());
        let path = self.dir.join(&file_name);
        fs::write(&path, &bytes).map_err(|e| format!("failed to write {}: {e}", path.display()))?;

        Ok(ImageAsset {
            index,
            format,
            link: self.link_for(&path, &file_name),
            file_name,
            path,
            size: bytes.len(),
        })
    }

    fn link_for(&self, path: &Path, file_name: &str) -> String {
        pathdiff::diff_paths(path, &self.markdown_dir)
            .map(|rel| {
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| format!("{}/{}", self.dir_name, file_name))
    }
}
