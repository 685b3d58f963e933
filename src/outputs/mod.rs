//! Digest output.
//!
//! - [`html`]: renders a `Digest` to an HTML document and a plain-text twin
//! - [`archive`]: keeps a dated copy of the rendered HTML on disk

pub mod archive;
pub mod html;
