//! Graph elements as they come back from the transport.

use serde::{Deserialize, Serialize};
use super::{Edge, Vertex};

/// The two element kinds a typed query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Vertex => f.write_str("vertex"),
            ElementKind::Edge => f.write_str("edge"),
        }
    }
}

/// A raw vertex or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphElement {
    Vertex(Vertex),
    Edge(Edge),
}

impl GraphElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            GraphElement::Vertex(_) => ElementKind::Vertex,
            GraphElement::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            GraphElement::Vertex(v) => &v.id,
            GraphElement::Edge(e) => &e.id,
        }
    }
}

impl From<Vertex> for GraphElement {
    fn from(v: Vertex) -> Self { GraphElement::Vertex(v) }
}

impl From<Edge> for GraphElement {
    fn from(e: Edge) -> Self { GraphElement::Edge(e) }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Vertex {}
    impl Sealed for super::Edge {}
}

/// A raw element type a typed query can be executed for.
///
/// Sealed: only [`Vertex`] and [`Edge`] implement it, so asking the store
/// for any other element kind does not compile.
pub trait Element: sealed::Sealed + Sized + Send + 'static {
    const KIND: ElementKind;

    /// Unwrap a transport element, or hand it back if it is the other kind.
    fn from_element(element: GraphElement) -> std::result::Result<Self, GraphElement>;
}

impl Element for Vertex {
    const KIND: ElementKind = ElementKind::Vertex;

    fn from_element(element: GraphElement) -> std::result::Result<Self, GraphElement> {
        match element {
            GraphElement::Vertex(v) => Ok(v),
            other => Err(other),
        }
    }
}

impl Element for Edge {
    const KIND: ElementKind = ElementKind::Edge;

    fn from_element(element: GraphElement) -> std::result::Result<Self, GraphElement> {
        match element {
            GraphElement::Edge(e) => Ok(e),
            other => Err(other),
        }
    }
}
