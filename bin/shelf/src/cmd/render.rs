//! Render command - preview a content file's HTML

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use shelf_parser::{MarkdownRenderer, render_path};

/// Run the render command.
///
/// Prints the body HTML using the configured theme and image component.
pub fn run(config_path: &Path, file: &Path) -> Result<()> {
    let html = render(config_path, file)?;
    println!("{html}");
    Ok(())
}

fn render(config_path: &Path, file: &Path) -> Result<String> {
    tracing::info!(?config_path, ?file, "Rendering content file");

    let config = crate::load_config(config_path)?;
    let renderer =
        MarkdownRenderer::from_config(&config.markdown).wrap_err("Invalid markdown settings")?;

    let source = fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let rendered = render_path(&renderer, &source, file)?;

    tracing::debug!(
        fields = rendered.frontmatter.len(),
        bytes = rendered.html.len(),
        "Rendered content file"
    );

    Ok(rendered.html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_uses_image_component() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("shelf.toml");
        fs::write(
            &config_path,
            "[site]\ntitle = \"Test\"\n\n[markdown]\nimage_fetchpriority = \"high\"\n",
        )
        .expect("config");
        let file = dir.path().join("post.md");
        fs::write(&file, "---\ntitle: T\n---\n\n![Alt](./a.png)\n").expect("post");

        let html = render(&config_path, &file).expect("render");
        assert!(html.contains("<figure class=\"markdoc-image\">"));
        assert!(html.contains("fetchpriority=\"high\""));
    }

    #[test]
    fn test_render_rejects_unknown_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("shelf.toml");
        fs::write(&config_path, "[site]\ntitle = \"Test\"\n").expect("config");
        let file = dir.path().join("notes.txt");
        fs::write(&file, "plain").expect("file");

        assert!(render(&config_path, &file).is_err());
    }
}
