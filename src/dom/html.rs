use super::tree::{Document, NodeId};
use scraper::{ElementRef, Html, Node};

impl Document {
    /// Build a document snapshot from serialized page HTML.
    ///
    /// Parsing is lenient: malformed markup is repaired the way a browser
    /// would, so this never fails.
    pub fn parse_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();
        load_element(&mut doc, None, parsed.root_element());
        log::debug!("Parsed page snapshot with {} elements", doc.len());
        doc
    }
}

fn load_element(doc: &mut Document, parent: Option<NodeId>, element: ElementRef<'_>) {
    let attributes: Vec<(&str, &str)> = element.value().attrs().collect();
    let id = doc.append_element(parent, element.value().name(), &attributes);

    for child in element.children() {
        match child.value() {
            Node::Text(text) => doc.append_text(id, text),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    load_element(doc, Some(id), child_element);
                }
            }
            _ => {}
        }
    }
}
