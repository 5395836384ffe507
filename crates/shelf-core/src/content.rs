//! Content file kinds and entry ids.

use std::path::Path;

/// Kind of content source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Plain markdown (`.md`, `.markdown`).
    Markdown,
    /// Markdoc-flavoured markdown (`.mdoc`).
    Markdoc,
}

impl ContentType {
    /// Determine content type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "mdoc" => Some(Self::Markdoc),
            _ => None,
        }
    }

    /// Determine content type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the canonical file extension for this content type.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Markdoc => "mdoc",
        }
    }
}

/// Derive an entry id from a content file path.
///
/// The id is the path relative to the collection directory, without
/// extension and `/`-separated:
/// - `posts/hello.md` → `hello`
/// - `posts/2024/hello.mdoc` → `2024/hello`
/// - `posts/hello/index.md` → `hello`
/// - `posts/index.md` → `index`
///
/// Returns `None` for files outside `collection_dir` and non-content files.
pub fn entry_id(collection_dir: &Path, path: &Path) -> Option<String> {
    ContentType::from_path(path)?;

    let relative = path.strip_prefix(collection_dir).ok()?;
    let stem = relative.file_stem()?.to_str()?;
    let parent = relative.parent().unwrap_or(Path::new(""));

    let mut parts: Vec<String> = parent
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if stem != "index" || parts.is_empty() {
        parts.push(stem.to_string());
    }

    Some(parts.join("/"))
}
