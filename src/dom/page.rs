use super::tree::{Document, NodeId};
use super::{EventKind, EventTarget, InteractionEvent, Listener, Phase};

struct Registration {
    kind: EventKind,
    phase: Phase,
    listener: Listener<Document>,
}

/// A loaded page: document snapshot plus its document-level listeners.
///
/// Dispatch runs every capture listener before any bubble listener. All
/// listeners sit on the document, so stopping propagation only cancels the
/// bubble phase; the remaining listeners of the current phase still run.
pub struct Page {
    host: String,
    document: Document,
    listeners: Vec<Registration>,
}

impl Page {
    pub fn new(host: &str, document: Document) -> Self {
        Self {
            host: host.to_string(),
            document,
            listeners: Vec::new(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Deliver one UI event to the registered listeners.
    pub fn dispatch(&self, kind: EventKind, target: NodeId) {
        let event = InteractionEvent::new(kind, target);
        for phase in [Phase::Capture, Phase::Bubble] {
            if event.propagation_stopped() {
                log::debug!("Propagation stopped, skipping {:?} listeners", phase);
                return;
            }
            for registration in self
                .listeners
                .iter()
                .filter(|r| r.kind == kind && r.phase == phase)
            {
                (registration.listener)(&self.document, &event);
            }
        }
    }
}

impl EventTarget for Page {
    type Document = Document;

    fn add_event_listener(&mut self, kind: EventKind, phase: Phase, listener: Listener<Document>) {
        self.listeners.push(Registration {
            kind,
            phase,
            listener,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn page() -> (Page, NodeId) {
        let mut doc = Document::new();
        let root = doc.append_element(None, "div", &[]);
        let button = doc.append_element(Some(root), "button", &[("title", "Send")]);
        (Page::new("outlook.office.com", doc), button)
    }

    #[test]
    fn test_capture_runs_before_bubble() {
        let (mut page, button) = page();
        let order = Rc::new(RefCell::new(Vec::new()));

        let seen = order.clone();
        page.add_event_listener(
            EventKind::Click,
            Phase::Bubble,
            Box::new(move |_: &Document, event: &InteractionEvent<NodeId>| {
                seen.borrow_mut().push("page");
                event.stop_propagation();
            }),
        );
        let seen = order.clone();
        page.add_event_listener(
            EventKind::Click,
            Phase::Capture,
            Box::new(move |doc: &Document, event: &InteractionEvent<NodeId>| {
                seen.borrow_mut().push("capture");
                assert_eq!(doc.attribute(event.target, "title"), Some("Send".to_string()));
            }),
        );

        page.dispatch(EventKind::Click, button);
        page.dispatch(EventKind::Click, button);
        assert_eq!(*order.borrow(), vec!["capture", "page", "capture", "page"]);
    }

    #[test]
    fn test_stop_propagation_keeps_same_phase_listeners() {
        let (mut page, button) = page();
        let count = Rc::new(RefCell::new(0));

        for _ in 0..2 {
            let count = count.clone();
            page.add_event_listener(
                EventKind::Click,
                Phase::Bubble,
                Box::new(move |_: &Document, event: &InteractionEvent<NodeId>| {
                    *count.borrow_mut() += 1;
                    event.stop_propagation();
                }),
            );
        }

        page.dispatch(EventKind::Click, button);
        assert_eq!(*count.borrow(), 2);
        assert_eq!(page.host(), "outlook.office.com");
    }

    #[test]
    fn test_capture_stop_skips_bubble_only() {
        let (mut page, button) = page();
        let order = Rc::new(RefCell::new(Vec::new()));

        let seen = order.clone();
        page.add_event_listener(
            EventKind::Click,
            Phase::Capture,
            Box::new(move |_: &Document, event: &InteractionEvent<NodeId>| {
                seen.borrow_mut().push("page capture");
                event.stop_propagation();
            }),
        );
        let seen = order.clone();
        page.add_event_listener(
            EventKind::Click,
            Phase::Capture,
            Box::new(move |_: &Document, _: &InteractionEvent<NodeId>| {
                seen.borrow_mut().push("monitor capture");
            }),
        );
        let seen = order.clone();
        page.add_event_listener(
            EventKind::Click,
            Phase::Bubble,
            Box::new(move |_: &Document, _: &InteractionEvent<NodeId>| {
                seen.borrow_mut().push("page bubble");
            }),
        );

        page.dispatch(EventKind::Click, button);
        assert_eq!(*order.borrow(), vec!["page capture", "monitor capture"]);
    }
}
