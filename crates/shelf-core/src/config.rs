//! Site configuration management.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    assets::FetchPriority,
    collections::CollectionRegistry,
    error::{CoreError, Result},
    schema::UnknownFieldPolicy,
};

/// Main configuration structure for shelf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content loading settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Markdown rendering settings.
    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Directory holding one sub-directory per collection.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
}

/// Content loading configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Site-wide policy for undeclared front-matter fields.
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,

    /// Per-collection overrides, keyed by collection name.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionOverride>,
}

/// Settings that override [`ContentConfig`] for one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionOverride {
    #[serde(default)]
    pub unknown_fields: Option<UnknownFieldPolicy>,
}

/// Markdown rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Syntax highlighting theme name.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Extra directory of `.tmTheme` files searched for `theme`.
    #[serde(default)]
    pub theme_dir: Option<PathBuf>,

    /// Component that renders image nodes.
    #[serde(default = "default_image_component")]
    pub image_component: String,

    /// `fetchpriority` given to rendered images.
    #[serde(default)]
    pub image_fetchpriority: Option<FetchPriority>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_theme() -> String {
    "one-dark-pro".to_string()
}

fn default_image_component() -> String {
    "MarkdocImage".to_string()
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            theme_dir: None,
            image_component: default_image_component(),
            image_fetchpriority: None,
        }
    }
}

impl ContentConfig {
    /// Effective unknown-field policy for a collection.
    pub fn policy_for(&self, collection: &str) -> UnknownFieldPolicy {
        self.collections
            .get(collection)
            .and_then(|o| o.unknown_fields)
            .unwrap_or(self.unknown_fields)
    }
}

impl Config {
    /// Configuration with defaults for everything but the title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                title: title.into(),
                content_dir: default_content_dir(),
            },
            content: ContentConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate(&CollectionRegistry::default())?;
        Ok(config)
    }

    /// Load configuration with `SHELF__SECTION__KEY` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SHELF").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate(&CollectionRegistry::default())?;
        Ok(config)
    }

    /// Validate the configuration against a collection registry.
    pub fn validate(&self, registry: &CollectionRegistry) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if let Some(unknown) = self
            .content
            .collections
            .keys()
            .find(|name| !registry.contains(name))
        {
            return Err(CoreError::config(format!(
                "content.collections.{unknown} does not name a registered collection"
            )));
        }

        if self.markdown.image_component.is_empty() {
            return Err(CoreError::config("markdown.image_component cannot be empty"));
        }

        if let Some(dir) = &self.markdown.theme_dir
            && !dir.is_dir()
        {
            tracing::warn!(dir = %dir.display(), "markdown.theme_dir is not a directory");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Mutex, PoisonError},
    };

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("shelf.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(content.as_bytes()).expect("write");
        (dir, config_path)
    }

    #[test]
    fn test_load_config() {
        let (_dir, path) = write_config(
            r#"
[site]
title = "Test Shelf"
content_dir = "src/content"

[content]
unknown_fields = "reject"

[content.collections.notes]
unknown_fields = "ignore"

[markdown]
theme = "InspiredGitHub"
image_component = "Figure"
image_fetchpriority = "high"
"#,
        );

        let config = Config::load(&path).expect("load config");

        assert_eq!(config.site.title, "Test Shelf");
        assert_eq!(config.site.content_dir, PathBuf::from("src/content"));
        assert_eq!(config.content.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.content.policy_for("posts"), UnknownFieldPolicy::Reject);
        assert_eq!(config.content.policy_for("notes"), UnknownFieldPolicy::Ignore);
        assert_eq!(config.markdown.theme, "InspiredGitHub");
        assert_eq!(config.markdown.image_component, "Figure");
        assert_eq!(config.markdown.image_fetchpriority, Some(FetchPriority::High));
    }

    #[test]
    fn test_config_defaults() {
        let (_dir, path) = write_config(
            r#"
[site]
title = "Minimal"
"#,
        );

        let config = Config::load(&path).expect("load config");

        assert_eq!(config.site.content_dir, PathBuf::from("content"));
        assert_eq!(config.content.unknown_fields, UnknownFieldPolicy::Ignore);
        assert_eq!(config.markdown.theme, "one-dark-pro");
        assert_eq!(config.markdown.image_component, "MarkdocImage");
        assert!(config.markdown.image_fetchpriority.is_none());
        assert!(config.markdown.theme_dir.is_none());
    }

    #[test]
    fn test_config_validation_empty_title() {
        let (_dir, path) = write_config(
            r#"
[site]
title = ""
"#,
        );

        let result = Config::load(&path);
        assert!(
            result
                .expect_err("should fail")
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_override_for_unknown_collection() {
        let (_dir, path) = write_config(
            r#"
[site]
title = "Test"

[content.collections.drafts]
unknown_fields = "reject"
"#,
        );

        let err = Config::load(&path).expect_err("should fail");
        assert!(err.to_string().contains("content.collections.drafts"));
    }

    #[test]
    fn test_invalid_policy_value() {
        let (_dir, path) = write_config(
            r#"
[site]
title = "Test"

[content]
unknown_fields = "strict"
"#,
        );

        let err = Config::load(&path).expect_err("should fail");
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/shelf.toml"));
        assert!(result.expect_err("missing").to_string().contains("not found"));
    }

    #[test]
    fn test_load_with_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let (_dir, path) = write_config(
            r#"
[site]
title = "From File"
"#,
        );

        let config = Config::load_with_env(&path).expect("load config");
        assert_eq!(config.site.title, "From File");
        assert_eq!(config.markdown.theme, "one-dark-pro");
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let (_dir, path) = write_config(
            r#"
[site]
title = "From File"

[content]
unknown_fields = "ignore"
"#,
        );

        let vars = [
            ("SHELF__SITE__TITLE", "From Env"),
            ("SHELF__CONTENT__UNKNOWN_FIELDS", "reject"),
            ("SHELF__MARKDOWN__IMAGE_FETCHPRIORITY", "low"),
        ];
        for (key, value) in vars {
            // SAFETY: tests touching the environment hold ENV_LOCK.
            unsafe { std::env::set_var(key, value) };
        }
        let result = Config::load_with_env(&path);
        for (key, _) in vars {
            // SAFETY: as above.
            unsafe { std::env::remove_var(key) };
        }

        let config = result.expect("load config");
        assert_eq!(config.site.title, "From Env");
        assert_eq!(config.content.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.markdown.image_fetchpriority, Some(FetchPriority::Low));
    }

    static ENV_LOCK: Mutex<()> = Mutex::new(());
}
