// ABOUTME: ParsedDocument wraps a scraper HTML tree with the queries the strategies need.
// ABOUTME: Provides multi/first selection, visible-text extraction and sibling-text lookup.

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

use crate::dom::compiled::get_or_compile;
use crate::error::ExtractError;

/// Elements whose text is never shown to a reader.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// An already-fetched, already-parsed page.
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements matching `css`, in document order.
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, ExtractError> {
        let selector = compile(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// The first element matching `css`, if any.
    pub fn select_first(&self, css: &str) -> Result<Option<ElementRef<'_>>, ExtractError> {
        let selector = compile(css)?;
        Ok(self.html.select(&selector).next())
    }

    /// All descendants of `scope` matching `css`.
    pub fn select_in<'a>(
        &self,
        scope: ElementRef<'a>,
        css: &str,
    ) -> Result<Vec<ElementRef<'a>>, ExtractError> {
        let selector = compile(css)?;
        Ok(scope.select(&selector).collect())
    }

    /// Visible text of the whole document.
    pub fn text(&self) -> String {
        let mut out = String::new();
        push_visible_text(self.html.tree.root(), &mut out);
        out
    }

    /// Visible text of a single element.
    pub fn element_text(element: ElementRef<'_>) -> String {
        let mut out = String::new();
        push_visible_text(*element, &mut out);
        out
    }

    /// Text that follows `element` among its siblings.
    ///
    /// Returns the first non-blank sibling text node, or the visible text of the
    /// first following sibling element that has any.
    pub fn sibling_text(element: ElementRef<'_>) -> Option<String> {
        for sibling in element.next_siblings() {
            let text = match sibling.value() {
                Node::Text(text) => String::from(&**text),
                Node::Element(el) if is_hidden(el.name()) => continue,
                Node::Element(_) => {
                    let mut out = String::new();
                    push_visible_text(sibling, &mut out);
                    out
                }
                _ => continue,
            };
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        None
    }
}

fn compile(css: &str) -> Result<Selector, ExtractError> {
    get_or_compile(css).ok_or_else(|| ExtractError::InvalidSelector(css.to_string()))
}

fn is_hidden(tag: &str) -> bool {
    HIDDEN_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

fn push_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if is_hidden(el.name()) => {}
            Node::Element(_) => push_visible_text(child, out),
            _ => {}
        }
    }
}
