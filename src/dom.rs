//! Guest document and raw DOM query primitives.
//!
//! [`Document`] holds the HTML tree loaded into a frame and exposes the
//! low-level operations the executor polls: selector match counts, attribute
//! reads on the first match, and attribute mutation across every match.
//!
//! The document stores its serialized form and re-parses per operation. The
//! trees involved are small fixture pages, and keeping the parsed state out of
//! the struct keeps `Document` `Send` and guarantees selector matching never
//! sees stale attribute caches after a mutation.

// ============================================================================
// Imports
// ============================================================================

use html5ever::{LocalName, Namespace, QualName};
use scraper::{Html, Node, Selector};

use crate::error::{Error, Result};

// ============================================================================
// Document
// ============================================================================

/// An HTML document owned by a guest frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
}

impl Document {
    /// Parses a document from HTML source.
    ///
    /// The parser is forgiving in the way browsers are: missing `html`,
    /// `head` and `body` elements are synthesized.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            source: Html::parse_document(html).root_element().html(),
        }
    }

    /// Returns the neutral document a detached frame resets to.
    #[must_use]
    pub fn blank() -> Self {
        Self::parse("")
    }

    /// Parses a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectorParse`] if the selector is not valid CSS.
    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|_| Error::selector_parse(selector))
    }

    /// Counts the elements matching `selector`.
    #[must_use]
    pub fn count_matching(&self, selector: &Selector) -> u64 {
        Html::parse_document(&self.source).select(selector).count() as u64
    }

    /// Reads `attribute` from the first element matching `selector`.
    ///
    /// Returns `None` when no element matches or the first match does not
    /// carry the attribute.
    #[must_use]
    pub fn get_attribute(&self, selector: &Selector, attribute: &str) -> Option<String> {
        Html::parse_document(&self.source)
            .select(selector)
            .next()
            .and_then(|element| element.value().attr(attribute))
            .map(str::to_string)
    }

    /// Sets `attribute` to `value` on every element matching `selector`.
    ///
    /// Returns the number of elements mutated (0 when nothing matched).
    pub fn set_attribute(&mut self, selector: &Selector, attribute: &str, value: &str) -> u64 {
        let mut html = Html::parse_document(&self.source);
        let ids: Vec<_> = html.select(selector).map(|element| element.id()).collect();

        let name = QualName::new(None, Namespace::from(""), LocalName::from(attribute));
        for id in &ids {
            if let Some(mut node) = html.tree.get_mut(*id)
                && let Node::Element(element) = node.value()
            {
                element.attrs.insert(name.clone(), value.into());
            }
        }

        if !ids.is_empty() {
            self.source = html.root_element().html();
        }
        ids.len() as u64
    }

    /// Removes `attribute` from every element matching `selector`.
    ///
    /// Returns the number of matched elements, whether or not each carried
    /// the attribute.
    pub fn remove_attribute(&mut self, selector: &Selector, attribute: &str) -> u64 {
        let mut html = Html::parse_document(&self.source);
        let ids: Vec<_> = html.select(selector).map(|element| element.id()).collect();

        for id in &ids {
            if let Some(mut node) = html.tree.get_mut(*id)
                && let Node::Element(element) = node.value()
            {
                element.attrs.retain(|name, _| name.local.as_ref() != attribute);
            }
        }

        if !ids.is_empty() {
            self.source = html.root_element().html();
        }
        ids.len() as u64
    }

    /// Returns the serialized document.
    #[inline]
    #[must_use]
    pub fn html(&self) -> &str {
        &self.source
    }
}

// ============================================================================
// Tests
// ============================================================================
