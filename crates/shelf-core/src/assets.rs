//! Image module declarations and the extended `img` attribute set.
//!
//! Content may reference image files by module specifier (for example a post's
//! `coverImage`). Specifiers that match a declared pattern resolve to an opaque
//! [`ImageModule`]; nothing else about the file is known here.

use std::{fmt, str::FromStr};

use glob::Pattern;
use serde::{Deserialize, Serialize};

/// Declared image module patterns.
pub const IMAGE_MODULE_PATTERNS: [(&str, ImageFormat); 4] = [
    ("*.png", ImageFormat::Png),
    ("*.svg", ImageFormat::Svg),
    ("*.jpeg", ImageFormat::Jpeg),
    ("*.jpg", ImageFormat::Jpeg),
];

/// Image format implied by the matching pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Svg,
    Jpeg,
}

/// An imported image file. Opaque by declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageModule {
    specifier: String,
    format: ImageFormat,
}

impl ImageModule {
    /// The specifier the module was resolved from.
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }
}

/// The set of module patterns that resolve to image modules.
#[derive(Debug, Clone)]
pub struct ModuleDeclarations {
    patterns: Vec<(Pattern, ImageFormat)>,
}

impl Default for ModuleDeclarations {
    fn default() -> Self {
        Self {
            patterns: IMAGE_MODULE_PATTERNS
                .iter()
                .filter_map(|(p, format)| Pattern::new(p).ok().map(|p| (p, *format)))
                .collect(),
        }
    }
}

impl ModuleDeclarations {
    /// Declarations from explicit patterns.
    pub fn from_patterns<'a>(
        patterns: impl IntoIterator<Item = (&'a str, ImageFormat)>,
    ) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .into_iter()
            .map(|(p, format)| Pattern::new(p).map(|p| (p, format)))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Resolve a specifier to an image module if any pattern matches.
    ///
    /// Matching is case-sensitive and a `*` spans directory separators.
    pub fn resolve(&self, specifier: &str) -> Option<ImageModule> {
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches(specifier))
            .map(|(_, format)| ImageModule {
                specifier: specifier.to_string(),
                format: *format,
            })
    }

    /// Whether the specifier resolves to an image module.
    pub fn is_image(&self, specifier: &str) -> bool {
        self.resolve(specifier).is_some()
    }
}

/// Values of the `fetchpriority` image attribute.
///
/// `null` and `undefined` both mean "absent"; model that as `Option<FetchPriority>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPriority {
    Auto,
    Low,
    High,
}

impl FetchPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

impl fmt::Display for FetchPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "low" => Ok(Self::Low),
            "high" => Ok(Self::High),
            other => Err(format!(
                "invalid fetchpriority `{other}`, expected auto, low or high"
            )),
        }
    }
}

/// Attributes of an `img` element, including the `fetchpriority` extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImgAttributes {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
    pub loading: Option<String>,
    pub decoding: Option<String>,
    pub fetchpriority: Option<FetchPriority>,
}

impl ImgAttributes {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            ..Self::default()
        }
    }

    /// Render as an `<img>` tag. Absent attributes are omitted.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<img src=\"{}\" alt=\"{}\"",
            escape_attr(&self.src),
            escape_attr(&self.alt)
        );

        let optional = [
            ("title", self.title.as_deref()),
            ("loading", self.loading.as_deref()),
            ("decoding", self.decoding.as_deref()),
            ("fetchpriority", self.fetchpriority.as_ref().map(FetchPriority::as_str)),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                html.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
            }
        }

        html.push_str(" />");
        html
    }
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
