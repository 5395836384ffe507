//! Syntax highlighting for code blocks.

use std::{io::Cursor, path::Path};

use shelf_core::config::MarkdownConfig;
use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::SyntaxSet,
};
use tracing::{debug, warn};

/// Theme used when the configured one cannot be found.
pub const FALLBACK_THEME: &str = "base16-ocean.dark";

/// Themes shipped with shelf, by name.
const BUNDLED_THEMES: &[(&str, &[u8])] = &[(
    "one-dark-pro",
    include_bytes!("../themes/one-dark-pro.tmTheme"),
)];

/// Syntax highlighter using syntect.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    theme_name: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(FALLBACK_THEME)
    }
}

impl SyntaxHighlighter {
    /// Create a highlighter with one of syntect's bundled themes.
    pub fn new(theme: &str) -> Self {
        Self::with_theme_dir(theme, None)
    }

    /// Create a highlighter from markdown configuration.
    pub fn from_config(config: &MarkdownConfig) -> Self {
        Self::with_theme_dir(&config.theme, config.theme_dir.as_deref())
    }

    /// Create a highlighter, also looking for `<theme>.tmTheme` in `theme_dir`.
    pub fn with_theme_dir(theme: &str, theme_dir: Option<&Path>) -> Self {
        let (theme_name, theme) = resolve_theme(theme, theme_dir);
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            theme_name,
        }
    }

    /// Name of the theme actually in use.
    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    /// Highlight code with the given language.
    ///
    /// If the language is not recognized, it is highlighted as plain text.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => html,
            Err(e) => {
                debug!(error = %e, "highlighting failed, emitting plain block");
                fallback_highlight(code, lang)
            }
        }
    }
}

/// Look a theme up in syntect's defaults, then `theme_dir`, then the themes
/// shipped with shelf.
fn resolve_theme(name: &str, theme_dir: Option<&Path>) -> (String, Theme) {
    let mut defaults = ThemeSet::load_defaults();

    if let Some(theme) = defaults.themes.remove(name) {
        return (name.to_string(), theme);
    }

    if let Some(dir) = theme_dir {
        let path = dir.join(format!("{name}.tmTheme"));
        match ThemeSet::get_theme(&path) {
            Ok(theme) => return (name.to_string(), theme),
            Err(e) => debug!(path = %path.display(), error = %e, "theme file not loaded"),
        }
    }

    if let Some(theme) = bundled_theme(name) {
        return (name.to_string(), theme);
    }

    warn!(
        theme = name,
        fallback = FALLBACK_THEME,
        "syntax theme not found, using fallback"
    );
    let theme = defaults.themes.remove(FALLBACK_THEME).unwrap_or_default();
    (FALLBACK_THEME.to_string(), theme)
}

fn bundled_theme(name: &str) -> Option<Theme> {
    let (_, source) = BUNDLED_THEMES.iter().find(|(n, _)| *n == name)?;
    match ThemeSet::load_from_reader(&mut Cursor::new(*source)) {
        Ok(theme) => Some(theme),
        Err(e) => {
            warn!(theme = name, error = %e, "bundled theme failed to load");
            None
        }
    }
}

/// Plain `<pre><code>` block used when syntect fails.
fn fallback_highlight(code: &str, lang: Option<&str>) -> String {
    let escaped = html_escape(code);
    let lang_class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{escaped}</code></pre>")
}

/// Escape HTML special characters.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
