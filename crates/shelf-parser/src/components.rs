//! Components that markdown nodes can be rendered through.

use std::{collections::BTreeMap, fmt, sync::Arc};

use shelf_core::assets::{FetchPriority, ImgAttributes, escape_attr};

/// An image node as it appears in markdown: `![alt](src "title")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNode {
    pub src: String,
    /// Plain text of the alt content.
    pub alt: String,
    pub title: Option<String>,
    /// Site-wide `fetchpriority` from configuration.
    pub fetchpriority: Option<FetchPriority>,
}

/// Renders image nodes to HTML.
pub trait ImageComponent: fmt::Debug + Send + Sync {
    /// Name the component is registered under.
    fn name(&self) -> &str;

    /// Phrasing content for an image inside running text.
    fn render(&self, node: &ImageNode) -> String;

    /// Block content replacing a paragraph that holds only this image.
    ///
    /// `None` keeps the paragraph and renders the image with [`render`].
    ///
    /// [`render`]: ImageComponent::render
    fn render_block(&self, _node: &ImageNode) -> Option<String> {
        None
    }
}

/// The markdown default: a bare `<img>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImage;

impl ImageComponent for DefaultImage {
    fn name(&self) -> &str {
        "img"
    }

    fn render(&self, node: &ImageNode) -> String {
        let mut attrs = ImgAttributes::new(&node.src, &node.alt);
        attrs.title.clone_from(&node.title);
        attrs.to_html()
    }
}

/// Lazy-loaded image with the title as caption.
///
/// A standalone image becomes a `<figure>`; inside running text the same
/// markup uses `<span>`s so the paragraph stays valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdocImage;

impl MarkdocImage {
    fn img(node: &ImageNode) -> String {
        let mut attrs = ImgAttributes::new(&node.src, &node.alt);
        attrs.loading = Some("lazy".to_string());
        attrs.decoding = Some("async".to_string());
        attrs.fetchpriority = node.fetchpriority;
        attrs.to_html()
    }

    fn caption(node: &ImageNode) -> Option<String> {
        node.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(escape_attr)
    }
}

impl ImageComponent for MarkdocImage {
    fn name(&self) -> &str {
        "MarkdocImage"
    }

    fn render(&self, node: &ImageNode) -> String {
        let caption = Self::caption(node)
            .map(|c| format!("<span class=\"markdoc-image-caption\">{c}</span>"))
            .unwrap_or_default();
        format!(
            "<span class=\"markdoc-image\">{}{caption}</span>",
            Self::img(node)
        )
    }

    fn render_block(&self, node: &ImageNode) -> Option<String> {
        let caption = Self::caption(node)
            .map(|c| format!("<figcaption>{c}</figcaption>"))
            .unwrap_or_default();
        Some(format!(
            "<figure class=\"markdoc-image\">{}{caption}</figure>",
            Self::img(node)
        ))
    }
}

/// Image components available by name.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    images: BTreeMap<String, Arc<dyn ImageComponent>>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self {
            images: BTreeMap::new(),
        };
        registry.register(Arc::new(DefaultImage));
        registry.register(Arc::new(MarkdocImage));
        registry
    }
}

impl ComponentRegistry {
    /// Register a component under its own name, replacing any previous one.
    pub fn register(&mut self, component: Arc<dyn ImageComponent>) {
        self.images.insert(component.name().to_string(), component);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ImageComponent>> {
        self.images.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> ImageNode {
        ImageNode {
            src: "./cover.png".to_string(),
            alt: "A cover".to_string(),
            title: Some("Cover art".to_string()),
            fetchpriority: Some(FetchPriority::High),
        }
    }

    #[test]
    fn test_default_image() {
        assert_eq!(
            DefaultImage.render(&node()),
            "<img src=\"./cover.png\" alt=\"A cover\" title=\"Cover art\" />"
        );
    }

    #[test]
    fn test_default_image_has_no_block_form() {
        assert!(DefaultImage.render_block(&node()).is_none());
    }

    #[test]
    fn test_markdoc_image_inline() {
        let html = MarkdocImage.render(&node());
        assert!(html.starts_with("<span class=\"markdoc-image\"><img "));
        assert!(html.contains("<span class=\"markdoc-image-caption\">Cover art</span>"));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn test_markdoc_image() {
        let html = MarkdocImage.render_block(&node()).expect("block");
        assert!(html.starts_with("<figure class=\"markdoc-image\">"));
        assert!(html.contains("loading=\"lazy\""));
        assert!(html.contains("decoding=\"async\""));
        assert!(html.contains("fetchpriority=\"high\""));
        assert!(html.contains("<figcaption>Cover art</figcaption>"));
        assert!(!html.contains("title="));
    }

    #[test]
    fn test_markdoc_image_without_title() {
        let mut node = node();
        node.title = None;
        node.fetchpriority = None;
        let html = MarkdocImage.render_block(&node).expect("block");
        assert!(!html.contains("figcaption"));
        assert!(!html.contains("fetchpriority"));
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ComponentRegistry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["MarkdocImage", "img"]);
        assert!(registry.get("MarkdocImage").is_some());
        assert!(registry.get("Missing").is_none());
    }
}
