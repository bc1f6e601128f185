use super::selector::Selector;
use super::Dom;
use std::collections::HashMap;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum Child {
    Element(NodeId),
    Text(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<Child>,
}

/// Tags whose text is never rendered.
const HIDDEN_TAGS: &[&str] = &["script", "style", "template", "head", "title"];

/// Tags that start a new line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "div", "p", "li", "ul", "ol", "tr", "table", "h1", "h2", "h3", "h4", "h5", "h6",
    "blockquote", "pre", "section", "article",
];

/// Element arena snapshot of a page.
///
/// Elements are kept in insertion order, which is document order for pages
/// loaded through [`Document::parse_html`].
#[derive(Debug, Clone, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element under `parent` (or as a root when `None`).
    ///
    /// A `parent` that does not belong to this document is treated as `None`.
    pub fn append_element(
        &mut self,
        parent: Option<NodeId>,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> NodeId {
        let id = NodeId(self.elements.len());
        let parent = parent.filter(|parent| parent.0 < self.elements.len());
        self.elements.push(Element {
            tag: tag.to_lowercase(),
            attributes: attributes
                .iter()
                .map(|(name, value)| (name.to_lowercase(), value.to_string()))
                .collect(),
            parent,
            children: Vec::new(),
        });
        if let Some(element) = parent.and_then(|parent| self.elements.get_mut(parent.0)) {
            element.children.push(Child::Element(id));
        }
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        match self.elements.get_mut(parent.0) {
            Some(element) => element.children.push(Child::Text(text.to_string())),
            None => log::debug!("Dropping text for unknown node {:?}", parent),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// `None` for a handle from another document; callers treat it as empty.
    fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        selector.matches(&element.tag, |name| {
            element.attributes.get(name).map(String::as_str)
        })
    }

    fn parse_selector(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::debug!("Ignoring selector '{}': {}", selector, e);
                None
            }
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(element) = self.element(node) else {
            return;
        };
        if HIDDEN_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        let block = BLOCK_TAGS.contains(&element.tag.as_str());
        if block && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        for child in &element.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(child) => self.collect_text(*child, out),
            }
        }
        if element.tag == "br" {
            out.push('\n');
        }
    }
}

impl Dom for Document {
    type Node = NodeId;

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Self::parse_selector(selector) else {
            return Vec::new();
        };
        (0..self.elements.len())
            .map(NodeId)
            .filter(|node| self.matches(*node, &selector))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let selector = Self::parse_selector(selector)?;
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self.matches(candidate, &selector) {
                return Some(candidate);
            }
            current = self.element(candidate).and_then(|element| element.parent);
        }
        None
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node)
            .map(|element| element.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?
            .attributes
            .get(&name.to_lowercase())
            .cloned()
    }

    fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out.trim().to_string()
    }

    fn value(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        match element.tag.as_str() {
            "textarea" => self.inner_text(node),
            _ => element.attributes.get("value").cloned().unwrap_or_default(),
        }
    }
}
