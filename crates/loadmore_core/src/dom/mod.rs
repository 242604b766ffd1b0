//! Document abstraction used by UI behaviors.
//!
//! # Responsibility
//! - Define the `DocumentHost` contract behaviors are written against.
//! - Provide an in-memory, HTML-backed implementation for hosts without a
//!   browser (CLI rendering, crawling, tests).
//!
//! # Invariants
//! - Lookups only see elements connected to the document root.
//! - Event dispatch is single-threaded and runs listeners to completion.

mod html;
pub mod memory;
pub mod selector;

use std::fmt::{Display, Formatter};
use thiserror::Error;

pub use memory::MemoryDocument;
pub use selector::{Compound, Selector, SelectorSubject};

pub type DomResult<T> = Result<T, DomError>;

/// Opaque handle to one node of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle returned by listener registration, used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Event categories a host can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
        }
    }
}

/// One delivered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

/// Event callback. Receives the document explicitly instead of capturing it.
pub type Listener<D> = Box<dyn FnMut(&mut D, &Event)>;

/// Document mutation and lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("node is not an element: {0}")]
    NotAnElement(NodeId),
    #[error("cannot append {child} to {parent}: {reason}")]
    Hierarchy {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
    #[error("invalid selector: `{0}`")]
    InvalidSelector(String),
    #[error("invalid tag name: `{0}`")]
    InvalidTagName(String),
    #[error("invalid class name: `{0}`")]
    InvalidClassName(String),
    #[error("unknown listener: {0:?}")]
    UnknownListener(ListenerId),
}

/// Document-like environment a behavior is attached to.
///
/// Mirrors the small DOM surface the load-more behavior needs. Hosts are
/// passed in explicitly so behaviors can run against a mock document.
pub trait DocumentHost: Sized {
    /// First connected element whose `id` attribute equals `id`.
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;

    /// First connected element in document order matching `selector`.
    fn query_selector(&self, selector: &Selector) -> Option<NodeId>;

    /// Creates a detached element.
    fn create_element(&mut self, tag: &str) -> DomResult<NodeId>;

    /// Adds one class to the element's class list. Idempotent.
    fn add_class(&mut self, element: NodeId, class: &str) -> DomResult<()>;

    /// Replaces all children of `element` with nodes parsed from `html`.
    fn set_inner_html(&mut self, element: NodeId, html: &str) -> DomResult<()>;

    /// Appends `child` as the last child of `parent`, moving it if attached.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()>;

    fn add_event_listener(
        &mut self,
        target: NodeId,
        kind: EventKind,
        listener: Listener<Self>,
    ) -> DomResult<ListenerId>;

    fn remove_event_listener(&mut self, listener: ListenerId) -> DomResult<()>;
}
