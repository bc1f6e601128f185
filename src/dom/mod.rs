//! Tree/query capability over the host page.
//!
//! The interception pipeline only ever talks to a page through the [`Dom`]
//! and [`EventTarget`] traits. [`Document`] and [`Page`] implement them over
//! a snapshot loaded from page HTML, used by the replay CLI and the tests.

pub mod html;
pub mod page;
pub mod selector;
pub mod tree;

pub use page::Page;
pub use tree::{Document, NodeId};

use std::cell::Cell;

/// Read-only access to the current document state.
///
/// Selectors use CSS attribute-selector syntax. An unparsable selector is
/// treated as matching nothing.
pub trait Dom {
    type Node: Copy;

    /// All elements matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;

    fn query_selector(&self, selector: &str) -> Option<Self::Node> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// The node itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: Self::Node, selector: &str) -> Option<Self::Node>;

    fn tag_name(&self, node: Self::Node) -> String;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Rendered text of the node's subtree.
    fn inner_text(&self, node: Self::Node) -> String;

    /// Form value of an input-like node, empty when it has none.
    fn value(&self, node: Self::Node) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Bubble,
}

/// A UI event as seen by a listener during dispatch.
///
/// Only valid for the duration of the listener call.
#[derive(Debug)]
pub struct InteractionEvent<N> {
    pub kind: EventKind,
    pub target: N,
    propagation_stopped: Cell<bool>,
}

impl<N: Copy> InteractionEvent<N> {
    pub fn new(kind: EventKind, target: N) -> Self {
        Self {
            kind,
            target,
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

pub type Listener<D> = Box<dyn Fn(&D, &InteractionEvent<<D as Dom>::Node>)>;

/// Something listeners can be attached to, normally the document.
pub trait EventTarget {
    type Document: Dom;

    fn add_event_listener(
        &mut self,
        kind: EventKind,
        phase: Phase,
        listener: Listener<Self::Document>,
    );
}
