//! Shelf Parser Library
//!
//! Markdown body rendering: fenced code goes through syntect with the
//! configured theme, and image nodes render through a named component.

pub mod components;
pub mod markdown;
pub mod syntax;

pub use components::{ComponentRegistry, DefaultImage, ImageComponent, ImageNode, MarkdocImage};
pub use markdown::{MarkdownRenderer, RenderedContent};
use shelf_core::{ContentType, CoreError};
pub use syntax::SyntaxHighlighter;
use thiserror::Error;

/// Parser errors.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Failed to read front-matter.
    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] CoreError),

    /// The configured image component is not registered.
    #[error("unknown image component: {0}")]
    UnknownComponent(String),

    /// Unknown file extension.
    #[error("unknown file extension: {0}")]
    UnknownExtension(String),
}

/// Result type for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Render a content file, checking its extension first.
pub fn render_path(
    renderer: &MarkdownRenderer,
    content: &str,
    path: &std::path::Path,
) -> Result<RenderedContent> {
    if ContentType::from_path(path).is_none() {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(none)".to_string());
        return Err(ParserError::UnknownExtension(ext));
    }

    renderer.render_file(content, path)
}
