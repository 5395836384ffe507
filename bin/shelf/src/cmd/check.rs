//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use shelf_core::Config;
use shelf_loader::{CollectorError, ContentCollector};
use shelf_parser::MarkdownRenderer;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration, markdown settings and every collection entry,
/// including post cover images.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and content");

    let result = validate(config_path);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

fn validate(config_path: &Path) -> ValidationResult {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match crate::load_config(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e:#}"));
            println!("  ✗ Configuration invalid: {e}");
            return result;
        }
    };

    println!("\nChecking markdown settings...");
    check_markdown(&config, &mut result);

    println!("\nChecking collections...");
    match ContentCollector::new(config).collect() {
        Ok(content) => {
            for (name, entries) in &content.collections {
                println!("  ✓ {name}: {} entries", entries.len());
            }
            for warning in &content.warnings {
                result.add_warning(warning.to_string());
            }
        }
        Err(CollectorError::Rejected(failures)) => {
            println!("  ✗ {} content file(s) rejected", failures.len());
            for failure in failures {
                result.add_error(failure.to_string());
            }
        }
        Err(e) => {
            println!("  ✗ Failed to read content: {e}");
            result.add_error(format!("Content error: {e}"));
        }
    }

    result
}

/// Check the image component resolves and the theme exists.
fn check_markdown(config: &Config, result: &mut ValidationResult) {
    match MarkdownRenderer::from_config(&config.markdown) {
        Ok(renderer) => {
            println!("  ✓ Image nodes render via {}", renderer.image_component());
            let theme = renderer.highlighter().theme_name();
            if theme == config.markdown.theme {
                println!("  ✓ Highlight theme {theme}");
            } else {
                result.add_warning(format!(
                    "Highlight theme '{}' not found, using '{theme}'",
                    config.markdown.theme
                ));
                println!("  ⚠ Highlight theme falls back to {theme}");
            }
        }
        Err(e) => {
            result.add_error(format!("Markdown error: {e}"));
            println!("  ✗ {e}");
        }
    }
}
