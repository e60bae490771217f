//! HTML → Markdown building blocks shared by the backends.

pub mod cell;
pub mod document;
pub mod image;
pub mod normalize;
pub mod table;
pub mod walker;

pub use cell::{CellOptions, RenderedBlock, render_cell};
pub use document::{Document, Element, ElementKind, classify};
pub use image::{ImageAsset, ImageContext, ImageFormat};
pub use normalize::normalize;
pub use table::render_table;
pub use walker::CellWalker;
