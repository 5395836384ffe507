//! Markdown rendering using pulldown-cmark.
//!
//! Code blocks go through the syntax highlighter and image nodes through the
//! configured [`ImageComponent`]; every other node uses pulldown-cmark's HTML
//! writer unchanged.

use std::{path::Path, sync::Arc};

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use shelf_core::{
    assets::FetchPriority,
    config::MarkdownConfig,
    frontmatter::{Frontmatter, parse_frontmatter},
};

use crate::{
    ParserError, Result,
    components::{ComponentRegistry, DefaultImage, ImageComponent, ImageNode},
    syntax::SyntaxHighlighter,
};

/// A rendered content file.
#[derive(Debug, Clone)]
pub struct RenderedContent {
    /// Front-matter as read, not yet validated.
    pub frontmatter: Frontmatter,
    pub html: String,
    /// Body source without front-matter.
    pub raw: String,
}

/// Markdown renderer with highlighting and an image node override.
#[derive(Debug)]
pub struct MarkdownRenderer {
    highlighter: SyntaxHighlighter,
    options: Options,
    image: Arc<dyn ImageComponent>,
    fetchpriority: Option<FetchPriority>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Renderer with the fallback theme and default `<img>` output.
    pub fn new() -> Self {
        Self {
            highlighter: SyntaxHighlighter::default(),
            options: default_options(),
            image: Arc::new(DefaultImage),
            fetchpriority: None,
        }
    }

    /// Renderer configured from `[markdown]`, using the built-in components.
    pub fn from_config(config: &MarkdownConfig) -> Result<Self> {
        Self::from_config_with(config, &ComponentRegistry::default())
    }

    /// Renderer configured from `[markdown]`, resolving the image component
    /// in `components`.
    pub fn from_config_with(config: &MarkdownConfig, components: &ComponentRegistry) -> Result<Self> {
        let image = components
            .get(&config.image_component)
            .ok_or_else(|| ParserError::UnknownComponent(config.image_component.clone()))?;

        Ok(Self {
            highlighter: SyntaxHighlighter::from_config(config),
            options: default_options(),
            image,
            fetchpriority: config.image_fetchpriority,
        })
    }

    /// Replace the image component.
    #[must_use]
    pub fn with_image_component(mut self, component: Arc<dyn ImageComponent>) -> Self {
        self.image = component;
        self
    }

    /// Name of the component image nodes render through.
    pub fn image_component(&self) -> &str {
        self.image.name()
    }

    pub fn highlighter(&self) -> &SyntaxHighlighter {
        &self.highlighter
    }

    /// Split front-matter off a content file and render its body.
    pub fn render_file(&self, content: &str, path: &Path) -> Result<RenderedContent> {
        let (frontmatter, body) = parse_frontmatter(content, path)?;
        let html = self.render(&body);

        Ok(RenderedContent {
            frontmatter,
            html,
            raw: body,
        })
    }

    /// Render a markdown body to HTML.
    pub fn render(&self, body: &str) -> String {
        let mut pieces: Vec<Piece<'_>> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        // open image and the number of images nested in its alt text
        let mut image: Option<(ImageNode, usize)> = None;

        for event in Parser::new_ext(body, self.options) {
            if let Some((node, depth)) = image.as_mut() {
                match event {
                    Event::Start(Tag::Image { .. }) => *depth += 1,
                    Event::End(TagEnd::Image) if *depth > 0 => *depth -= 1,
                    Event::End(TagEnd::Image) => {
                        pieces.push(Piece::Image(std::mem::take(node)));
                        image = None;
                    }
                    Event::Text(text) | Event::Code(text) => node.alt.push_str(&text),
                    Event::SoftBreak | Event::HardBreak => node.alt.push(' '),
                    _ => {}
                }
                continue;
            }

            if let Some((lang, code)) = code_block.as_mut() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        let html = self.highlighter.highlight(code, lang.as_deref());
                        pieces.push(Piece::Event(Event::Html(CowStr::from(html))));
                        code_block = None;
                    }
                    Event::Text(text) => code.push_str(&text),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(ToString::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    let node = ImageNode {
                        src: dest_url.to_string(),
                        alt: String::new(),
                        title: (!title.is_empty()).then(|| title.to_string()),
                        fetchpriority: self.fetchpriority,
                    };
                    image = Some((node, 0));
                }
                Event::End(TagEnd::Paragraph) => {
                    if !self.close_image_paragraph(&mut pieces) {
                        pieces.push(Piece::Event(Event::End(TagEnd::Paragraph)));
                    }
                }
                other => pieces.push(Piece::Event(other)),
            }
        }

        let events = pieces.into_iter().map(|piece| match piece {
            Piece::Event(event) => event,
            Piece::Image(node) => Event::InlineHtml(CowStr::from(self.image.render(&node))),
        });

        let mut output = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }

    /// Replace a paragraph holding nothing but an image with the component's
    /// block rendering, when it has one.
    fn close_image_paragraph(&self, pieces: &mut Vec<Piece<'_>>) -> bool {
        let block = match pieces.as_slice() {
            [.., Piece::Event(Event::Start(Tag::Paragraph)), Piece::Image(node)] => {
                self.image.render_block(node)
            }
            _ => None,
        };

        let Some(html) = block else {
            return false;
        };
        pieces.truncate(pieces.len() - 2);
        pieces.push(Piece::Event(Event::Html(CowStr::from(html))));
        true
    }
}

/// A body event, or an image waiting to be rendered by the component.
enum Piece<'a> {
    Event(Event<'a>),
    Image(ImageNode),
}

fn default_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a *test*.");

        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a <em>test</em>.</p>"));
    }

    #[test]
    fn test_default_image_rendering() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("![A cat](cat.png \"Cat\")");

        assert_eq!(renderer.image_component(), "img");
        assert!(html.contains("<img src=\"cat.png\" alt=\"A cat\" title=\"Cat\" />"));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn test_image_override_from_config() {
        let config = MarkdownConfig {
            image_fetchpriority: Some(FetchPriority::Low),
            ..MarkdownConfig::default()
        };
        let renderer = MarkdownRenderer::from_config(&config).expect("renderer");
        let html = renderer.render("Before ![A *fancy* cat](cat.png) after");

        assert_eq!(renderer.image_component(), "MarkdocImage");
        assert!(html.starts_with("<p>Before <span class=\"markdoc-image\">"));
        assert!(html.contains("alt=\"A fancy cat\""));
        assert!(html.contains("fetchpriority=\"low\""));
        assert!(html.contains("</span> after</p>"));
        assert!(!html.contains("<em>"));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn test_standalone_image_replaces_paragraph() {
        let renderer = MarkdownRenderer::from_config(&MarkdownConfig::default()).expect("renderer");
        let html = renderer.render("Intro.\n\n![A cat](cat.png \"Cat\")\n\nOutro.");

        assert!(html.contains("<p>Intro.</p>\n<figure class=\"markdoc-image\">"));
        assert!(html.contains("<figcaption>Cat</figcaption></figure>"));
        assert!(html.contains("<p>Outro.</p>"));
        assert!(!html.contains("<p><figure"));
    }

    #[test]
    fn test_default_image_keeps_paragraph() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("![A cat](cat.png)");
        assert_eq!(html, "<p><img src=\"cat.png\" alt=\"A cat\" /></p>\n");
    }

    #[test]
    fn test_nested_image_stays_in_alt_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("![outer ![inner](i.png) tail](o.png)");

        assert_eq!(html, "<p><img src=\"o.png\" alt=\"outer inner tail\" /></p>\n");
        assert!(!html.contains("i.png"));
    }

    #[test]
    fn test_unknown_component() {
        let config = MarkdownConfig {
            image_component: "Gallery".to_string(),
            ..MarkdownConfig::default()
        };
        let result = MarkdownRenderer::from_config(&config);
        assert!(matches!(result, Err(ParserError::UnknownComponent(name)) if name == "Gallery"));
    }

    #[test]
    fn test_code_block_highlighted() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust title=\"main.rs\"\nfn main() {}\n```\n");

        assert!(html.contains("<pre style="));
        assert!(html.contains("main"));
        assert!(!html.contains("<code class=\"language-rust"));
    }

    #[test]
    fn test_inline_code_untouched() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Use `cargo` here.");
        assert!(html.contains("<code>cargo</code>"));
    }

    #[test]
    fn test_render_file_splits_frontmatter() {
        let renderer = MarkdownRenderer::new();
        let content = "---\ntitle: Hello\ndate: 2024-01-01\n---\n\nBody text.";
        let rendered = renderer
            .render_file(content, Path::new("posts/hello.md"))
            .expect("render");

        assert!(rendered.frontmatter.contains("title"));
        assert_eq!(rendered.raw, "Body text.");
        assert!(rendered.html.contains("<p>Body text.</p>"));
    }
}
