//! Query builder: typed values in, Gremlin text out.
//!
//! Pure functions: no I/O, no state. The only check performed is that ids
//! are non-empty; the generated text is not validated further.
//!
//! Every literal goes through [`quote`], and property segments follow the
//! type's descriptor order, so output is deterministic.

use std::fmt::Write as _;

use crate::mapping::{EdgeType, Mapped, PropertyDescriptor, VertexType, ID_PROPERTY};
use crate::{Error, Result};
use super::query::{quote, Query};

fn require_id<'a>(what: &str, id: &'a str) -> Result<&'a str> {
    if id.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(id)
}

fn push_property(out: &mut String, name: &str, literal: &str) {
    let _ = write!(out, ".property({}, {})", quote(name), quote(literal));
}

fn push_descriptors<T>(out: &mut String, obj: &T, props: &[PropertyDescriptor<T>]) {
    for prop in props {
        push_property(out, prop.name, &(prop.get)(obj).to_literal());
    }
}

// ============================================================================
// Vertices
// ============================================================================

/// `g.addV('<T>')` with an `id` segment followed by every declared property.
pub fn add_vertex<T: VertexType>(obj: &T) -> Result<Query> {
    let id = require_id("vertex id", obj.id())?;
    let mut q = format!("g.addV({})", quote(T::LABEL));
    push_property(&mut q, ID_PROPERTY, id);
    push_descriptors(&mut q, obj, &T::properties());
    Ok(Query::raw(q))
}

/// `g.V('<id>').drop()`
pub fn remove_vertex(id: &str) -> Result<Query> {
    let id = require_id("vertex id", id)?;
    Ok(Query::raw(format!("g.V({}).drop()", quote(id))))
}

/// `g.V('<id>').hasLabel('<T>')`
pub fn get_vertex<T: Mapped>(id: &str) -> Result<Query> {
    let id = require_id("vertex id", id)?;
    Ok(Query::raw(format!("g.V({}).hasLabel({})", quote(id), quote(T::LABEL))))
}

/// `g.V().hasLabel('<T>')`
pub fn get_vertices<T: Mapped>() -> Query {
    Query::raw(format!("g.V().hasLabel({})", quote(T::LABEL)))
}

/// `g.V('<id>')` with one segment per declared property. Never touches `id`.
pub fn update_vertex<T: VertexType>(obj: &T) -> Result<Query> {
    let id = require_id("vertex id", obj.id())?;
    let mut q = format!("g.V({})", quote(id));
    push_descriptors(&mut q, obj, &T::properties());
    Ok(Query::raw(q))
}

/// Follow `depth` outgoing `E` edges from vertex `id`, keeping `V` vertices.
///
/// Depth 0 is the bare `g.V('<id>')`.
pub fn forward_traverse<V: Mapped, E: Mapped>(id: &str, depth: usize) -> Result<Query> {
    traverse(id, depth, "outE", "inV", V::LABEL, E::LABEL)
}

/// Mirror of [`forward_traverse`] along incoming edges.
pub fn reverse_traverse<V: Mapped, E: Mapped>(id: &str, depth: usize) -> Result<Query> {
    traverse(id, depth, "inE", "outV", V::LABEL, E::LABEL)
}

fn traverse(
    id: &str,
    depth: usize,
    edge_step: &str,
    vertex_step: &str,
    vertex_label: &str,
    edge_label: &str,
) -> Result<Query> {
    let id = require_id("vertex id", id)?;
    let hop = format!(
        ".{edge_step}({}).{vertex_step}().hasLabel({})",
        quote(edge_label),
        quote(vertex_label),
    );
    let mut q = format!("g.V({})", quote(id));
    for _ in 0..depth {
        q.push_str(&hop);
    }
    Ok(Query::raw(q))
}

// ============================================================================
// Edges
// ============================================================================

/// `g.V('<source>').addE('<E>')`, the `id` and data segments, then `.to(g.V('<target>'))`.
///
/// Endpoints are structural and never emitted as properties.
pub fn add_edge<E: EdgeType>(edge: &E) -> Result<Query> {
    let id = require_id("edge id", edge.id())?;
    let source = require_id("edge source id", edge.source_id())?;
    let target = require_id("edge target id", edge.target_id())?;

    let mut q = format!("g.V({}).addE({})", quote(source), quote(E::LABEL));
    push_property(&mut q, ID_PROPERTY, id);
    push_descriptors(&mut q, edge, &E::properties());
    let _ = write!(q, ".to(g.V({}))", quote(target));
    Ok(Query::raw(q))
}

/// `g.V('<source>').outE('<E>').where(inV().has('id', '<target>')).drop()`
pub fn remove_edge<E: Mapped>(source_id: &str, target_id: &str) -> Result<Query> {
    let q = get_edge::<E>(source_id, target_id)?;
    Ok(Query::raw(format!("{q}.drop()")))
}

/// [`remove_edge`] using the edge's own endpoints.
pub fn remove_edge_of<E: EdgeType>(edge: &E) -> Result<Query> {
    remove_edge::<E>(edge.source_id(), edge.target_id())
}

/// `g.E('<id>').drop()`
pub fn remove_edge_by_id(id: &str) -> Result<Query> {
    let id = require_id("edge id", id)?;
    Ok(Query::raw(format!("g.E({}).drop()", quote(id))))
}

/// `g.V('<source>').outE('<E>').where(inV().has('id', '<target>'))`
pub fn get_edge<E: Mapped>(source_id: &str, target_id: &str) -> Result<Query> {
    let source = require_id("edge source id", source_id)?;
    let target = require_id("edge target id", target_id)?;
    Ok(Query::raw(format!(
        "g.V({}).outE({}).where(inV().has({}, {}))",
        quote(source),
        quote(E::LABEL),
        quote(ID_PROPERTY),
        quote(target),
    )))
}

/// [`get_edge`] using the edge's own endpoints.
pub fn get_edge_of<E: EdgeType>(edge: &E) -> Result<Query> {
    get_edge::<E>(edge.source_id(), edge.target_id())
}

/// `g.E('<id>')`
pub fn get_edge_by_id(id: &str) -> Result<Query> {
    let id = require_id("edge id", id)?;
    Ok(Query::raw(format!("g.E({})", quote(id))))
}

/// `g.E().hasLabel('<E>').where(outV().has('id', '<source>'))`
pub fn get_edges_with_source_id<E: Mapped>(source_id: &str) -> Result<Query> {
    let source = require_id("edge source id", source_id)?;
    Ok(edges_where::<E>("outV", source))
}

/// `g.E().hasLabel('<E>').where(inV().has('id', '<target>'))`
pub fn get_edges_with_target_id<E: Mapped>(target_id: &str) -> Result<Query> {
    let target = require_id("edge target id", target_id)?;
    Ok(edges_where::<E>("inV", target))
}

fn edges_where<E: Mapped>(endpoint_step: &str, id: &str) -> Query {
    Query::raw(format!(
        "g.E().hasLabel({}).where({endpoint_step}().has({}, {}))",
        quote(E::LABEL),
        quote(ID_PROPERTY),
        quote(id),
    ))
}

/// `g.E().hasLabel('<E>')`
pub fn get_edges<E: Mapped>() -> Query {
    Query::raw(format!("g.E().hasLabel({})", quote(E::LABEL)))
}

/// `g.E('<id>')` with one segment per data property. Never touches
/// `id`, `source_id` or `target_id`.
pub fn update_edge<E: EdgeType>(edge: &E) -> Result<Query> {
    let id = require_id("edge id", edge.id())?;
    let mut q = format!("g.E({})", quote(id));
    push_descriptors(&mut q, edge, &E::properties());
    Ok(Query::raw(q))
}

// ============================================================================
// Administration
// ============================================================================

/// `g.V().count()`
pub fn count_vertices() -> Query {
    Query::raw("g.V().count()")
}

/// `g.E().count()`
pub fn count_edges() -> Query {
    Query::raw("g.E().count()")
}

/// `g.V().drop()`: removes every vertex and, with them, every edge.
pub fn drop_vertices() -> Query {
    Query::raw("g.V().drop()")
}
