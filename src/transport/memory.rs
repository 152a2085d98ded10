//! In-memory Gremlin store.
//!
//! This is the reference implementation of [`Transport`] and
//! [`ConnectionProvider`]. It keeps every database/collection in process,
//! parses query text with [`crate::gremlin::parse`], and evaluates the step
//! subset the query builder emits:
//!
//! `V`, `E`, `addV`, `addE` … `to(g.V(..))`, `property`, `hasLabel`, `has`,
//! `outE`, `inE`, `bothE`, `out`, `in`, `inV`, `outV`, `where`, `drop`,
//! `count`, `limit`.
//!
//! ## Limitations
//!
//! - **One lock per query**: each query runs under the collection's write
//!   lock. Queries are atomic with respect to each other; nothing else is.
//! - **String-typed properties**: literals are stored as they arrive, so
//!   values come back as strings and the converter parses them.
//! - **No indexes**: lookups other than by id scan in insertion order.
//!
//! Use this store for:
//! - Testing repositories without a live database
//! - Embedding the mapper where persistence is not needed

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::gremlin::ast::{Arg, Step, Traversal};
use crate::gremlin::{self, Query};
use crate::mapping::ID_PROPERTY;
use crate::model::*;
use crate::{Error, Result};
use super::{
    CollectionRef, Connection, ConnectionConfig, ConnectionProvider, ResultPager, Transport,
    VecPager,
};

/// Results per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 100;

// ============================================================================
// MemoryServer
// ============================================================================

/// The process-wide "account": databases holding graph collections.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryServer {
    inner: Arc<RwLock<HashMap<String, Database>>>,
}

#[derive(Default)]
struct Database {
    collections: HashMap<String, Arc<MemoryGraph>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the database and collection if missing and return the graph.
    pub fn ensure_collection(&self, collection: &CollectionRef, throughput: u32) -> Arc<MemoryGraph> {
        let mut dbs = self.inner.write();
        let db = dbs.entry(collection.database.clone()).or_insert_with(|| {
            tracing::debug!(database = %collection.database, "creating database");
            Database::default()
        });
        db.collections
            .entry(collection.collection.clone())
            .or_insert_with(|| {
                tracing::debug!(%collection, throughput, "creating collection");
                Arc::new(MemoryGraph::new(throughput))
            })
            .clone()
    }

    /// The graph behind `collection`, if it exists.
    pub fn graph(&self, collection: &CollectionRef) -> Result<Arc<MemoryGraph>> {
        self.inner
            .read()
            .get(&collection.database)
            .and_then(|db| db.collections.get(&collection.collection))
            .cloned()
            .ok_or_else(|| Error::Store(format!("Collection {collection} does not exist")))
    }

    /// Delete a database and every collection in it. Returns true if it existed.
    pub fn delete_database(&self, database: &str) -> bool {
        self.inner.write().remove(database).is_some()
    }

    pub fn database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().keys().cloned().collect();
        names.sort();
        names
    }
}

// ============================================================================
// Provider / Connection / Client
// ============================================================================

/// Opens [`MemoryConnection`]s against a shared [`MemoryServer`].
#[derive(Clone, Default)]
pub struct MemoryProvider {
    server: MemoryServer,
    page_size: usize,
}

impl MemoryProvider {
    pub fn new(server: MemoryServer) -> Self {
        Self { server, page_size: DEFAULT_PAGE_SIZE }
    }

    /// Results per page for connections opened by this provider.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn server(&self) -> &MemoryServer {
        &self.server
    }
}

#[async_trait]
impl ConnectionProvider for MemoryProvider {
    type Connection = MemoryConnection;

    async fn create(&self, config: &ConnectionConfig) -> Result<MemoryConnection> {
        let collection = config.collection_ref();
        self.server.ensure_collection(&collection, config.throughput);
        tracing::debug!(
            endpoint = %config.endpoint,
            %collection,
            mode = ?config.connection_mode,
            protocol = ?config.protocol,
            "opened memory connection",
        );
        Ok(MemoryConnection {
            client: MemoryClient {
                server: self.server.clone(),
                page_size: if self.page_size == 0 { DEFAULT_PAGE_SIZE } else { self.page_size },
            },
            collection,
        })
    }
}

/// A client bound to one collection.
pub struct MemoryConnection {
    client: MemoryClient,
    collection: CollectionRef,
}

impl MemoryConnection {
    /// Delete the database this connection's collection lives in.
    pub fn delete_database(&self) -> bool {
        self.client.server.delete_database(&self.collection.database)
    }
}

impl Connection for MemoryConnection {
    type Client = MemoryClient;

    fn client(&self) -> &MemoryClient {
        &self.client
    }

    fn collection(&self) -> &CollectionRef {
        &self.collection
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        tracing::trace!(collection = %self.collection, "releasing memory connection");
    }
}

/// Executes query text against a [`MemoryServer`].
#[derive(Clone)]
pub struct MemoryClient {
    server: MemoryServer,
    page_size: usize,
}

impl MemoryClient {
    fn run(&self, collection: &CollectionRef, query: &Query) -> Result<Vec<Output>> {
        let traversal = gremlin::parse(query.as_str())?;
        let graph = self.server.graph(collection)?;
        graph.execute(&traversal)
    }
}

#[async_trait]
impl Transport for MemoryClient {
    async fn submit_scalar(
        &self,
        collection: &CollectionRef,
        query: &Query,
    ) -> Result<Box<dyn ResultPager<serde_json::Value>>> {
        let json = self
            .run(collection, query)?
            .into_iter()
            .map(|out| match out {
                Output::Element(e) => serde_json::to_value(e),
                Output::Value(v) => serde_json::to_value(v),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Box::new(VecPager::new(json, self.page_size)))
    }

    async fn submit_elements(
        &self,
        collection: &CollectionRef,
        query: &Query,
        kind: ElementKind,
    ) -> Result<Box<dyn ResultPager<GraphElement>>> {
        let elements = self
            .run(collection, query)?
            .into_iter()
            .map(|out| match out {
                Output::Element(e) => Ok(e),
                Output::Value(v) => Err(Error::Store(format!(
                    "Query produced {} where a {kind} was expected",
                    v.type_name(),
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(VecPager::new(elements, self.page_size)))
    }
}

// ============================================================================
// MemoryGraph
// ============================================================================

/// One collection's property graph.
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    throughput: u32,
}

/// A query result before serialisation.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Element(GraphElement),
    Value(Value),
}

#[derive(Default)]
struct GraphState {
    vertices: HashMap<String, Vertex>,
    vertex_order: Vec<String>,
    edges: HashMap<String, Edge>,
    edge_order: Vec<String>,
    /// vertex id → incident edge ids, in creation order
    adjacency: HashMap<String, Vec<String>>,
    next_id: u64,
}

/// A traverser: the element (by id) or value currently being processed.
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Vertex(String),
    Edge(String),
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    Out,
    In,
    Both,
}

impl MemoryGraph {
    pub fn new(throughput: u32) -> Self {
        Self {
            state: RwLock::new(GraphState::default()),
            throughput,
        }
    }

    pub fn throughput(&self) -> u32 {
        self.throughput
    }

    pub fn vertex_count(&self) -> usize {
        self.state.read().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.read().edges.len()
    }

    /// Run a parsed traversal and materialise its results.
    pub fn execute(&self, traversal: &Traversal) -> Result<Vec<Output>> {
        let mut state = self.state.write();
        let items = state.run(traversal, None)?;
        Ok(items.into_iter().filter_map(|item| state.materialize(item)).collect())
    }
}

impl GraphState {
    fn run(&mut self, traversal: &Traversal, start: Option<Vec<Item>>) -> Result<Vec<Item>> {
        let steps = &traversal.steps;
        let mut items = start.unwrap_or_default();
        let mut i = 0;

        while i < steps.len() {
            let step = &steps[i];
            i += 1;
            match step.name.as_str() {
                "V" => items = self.scan_vertices(step)?,
                "E" => items = self.scan_edges(step)?,
                "addV" => {
                    let (props, consumed) = modulators(&steps[i..], &["property"]);
                    i += consumed;
                    items = vec![self.add_vertex(step, props)?];
                }
                "addE" => {
                    let (mods, consumed) = modulators(&steps[i..], &["property", "to", "from"]);
                    i += consumed;
                    items = self.add_edges(step, &items, mods)?;
                }
                "property" => {
                    let (key, value) = property_args(step)?;
                    for item in &items {
                        self.set_property(item, key, value.clone())?;
                    }
                }
                "hasLabel" => {
                    let labels = string_args(step)?;
                    items.retain(|item| self.has_any_label(item, &labels));
                }
                "has" => {
                    let (key, value) = property_args(step)?;
                    let wanted = value.to_literal();
                    items.retain(|item| self.property_literal(item, key).as_deref() == Some(wanted.as_str()));
                }
                "outE" => items = self.incident(&items, Dir::Out, &string_args(step)?),
                "inE" => items = self.incident(&items, Dir::In, &string_args(step)?),
                "bothE" => items = self.incident(&items, Dir::Both, &string_args(step)?),
                "out" => {
                    let edges = self.incident(&items, Dir::Out, &string_args(step)?);
                    items = self.endpoints(&edges, Dir::In);
                }
                "in" => {
                    let edges = self.incident(&items, Dir::In, &string_args(step)?);
                    items = self.endpoints(&edges, Dir::Out);
                }
                "inV" => items = self.endpoints(&items, Dir::In),
                "outV" => items = self.endpoints(&items, Dir::Out),
                "where" => {
                    let inner = step.traversal_arg(0).ok_or_else(|| unsupported(step, "expects a traversal"))?;
                    let mut kept = Vec::with_capacity(items.len());
                    for item in items {
                        let matched = if inner.anchored {
                            self.run(inner, None)?
                        } else {
                            self.run(inner, Some(vec![item.clone()]))?
                        };
                        if !matched.is_empty() {
                            kept.push(item);
                        }
                    }
                    items = kept;
                }
                "drop" => {
                    for item in &items {
                        self.remove(item);
                    }
                    items.clear();
                }
                "count" => items = vec![Item::Value(Value::Int(items.len() as i64))],
                "limit" => match step.args.first() {
                    Some(Arg::Integer(n)) if *n >= 0 => items.truncate(*n as usize),
                    _ => return Err(unsupported(step, "expects a non-negative integer")),
                },
                _ => return Err(unsupported(step, "is not supported by the memory store")),
            }
        }

        Ok(items)
    }

    // ------------------------------------------------------------------------
    // Sources
    // ------------------------------------------------------------------------

    fn scan_vertices(&self, step: &Step) -> Result<Vec<Item>> {
        let ids = string_args(step)?;
        Ok(if ids.is_empty() {
            self.vertex_order.iter().cloned().map(Item::Vertex).collect()
        } else {
            ids.into_iter()
                .filter(|id| self.vertices.contains_key(*id))
                .map(|id| Item::Vertex(id.to_string()))
                .collect()
        })
    }

    fn scan_edges(&self, step: &Step) -> Result<Vec<Item>> {
        let ids = string_args(step)?;
        Ok(if ids.is_empty() {
            self.edge_order.iter().cloned().map(Item::Edge).collect()
        } else {
            ids.into_iter()
                .filter(|id| self.edges.contains_key(*id))
                .map(|id| Item::Edge(id.to_string()))
                .collect()
        })
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    fn add_vertex(&mut self, step: &Step, props: &[Step]) -> Result<Item> {
        let label = step.str_arg(0).unwrap_or("vertex");
        let mut id = None;
        let mut properties = PropertyMap::new();
        for prop in props {
            let (key, value) = property_args(prop)?;
            if key == ID_PROPERTY {
                id = Some(value.to_literal());
            } else {
                properties.insert(key.to_string(), value);
            }
        }

        let id = match id {
            Some(id) => id,
            None => self.allocate_id(),
        };
        if self.vertices.contains_key(&id) {
            return Err(Error::Store(format!("Vertex with id '{id}' already exists")));
        }

        self.vertices.insert(id.clone(), Vertex { id: id.clone(), label: label.to_string(), properties });
        self.vertex_order.push(id.clone());
        self.adjacency.insert(id.clone(), Vec::new());
        Ok(Item::Vertex(id))
    }

    fn add_edges(&mut self, step: &Step, sources: &[Item], mods: &[Step]) -> Result<Vec<Item>> {
        let label = step.str_arg(0).unwrap_or("edge");
        let mut id = None;
        let mut properties = PropertyMap::new();
        let mut target = None;
        let mut from = None;

        for m in mods {
            match m.name.as_str() {
                "property" => {
                    let (key, value) = property_args(m)?;
                    if key == ID_PROPERTY {
                        id = Some(value.to_literal());
                    } else {
                        properties.insert(key.to_string(), value);
                    }
                }
                "to" => target = Some(self.resolve_vertex(m)?),
                _ => from = Some(self.resolve_vertex(m)?),
            }
        }

        let target = target.ok_or_else(|| unsupported(step, "requires a to() target"))?;
        let sources: Vec<String> = match from {
            Some(from) => vec![from],
            None => sources
                .iter()
                .filter_map(|item| match item {
                    Item::Vertex(v) => Some(v.clone()),
                    _ => None,
                })
                .collect(),
        };
        if sources.len() > 1 && id.is_some() {
            return Err(Error::Store("Cannot assign one edge id to several edges".into()));
        }

        let mut created = Vec::with_capacity(sources.len());
        for source in sources {
            let edge_id = match id.take() {
                Some(id) => id,
                None => self.allocate_id(),
            };
            if self.edges.contains_key(&edge_id) {
                return Err(Error::Store(format!("Edge with id '{edge_id}' already exists")));
            }
            let edge = Edge {
                id: edge_id.clone(),
                label: label.to_string(),
                out_v: source.clone(),
                in_v: target.clone(),
                properties: properties.clone(),
            };
            self.edges.insert(edge_id.clone(), edge);
            self.edge_order.push(edge_id.clone());
            self.adjacency.entry(source.clone()).or_default().push(edge_id.clone());
            if source != target {
                self.adjacency.entry(target.clone()).or_default().push(edge_id.clone());
            }
            created.push(Item::Edge(edge_id));
        }
        Ok(created)
    }

    /// First vertex produced by the nested traversal of `to(...)`/`from(...)`.
    fn resolve_vertex(&mut self, step: &Step) -> Result<String> {
        let inner = step.traversal_arg(0).ok_or_else(|| unsupported(step, "expects a traversal"))?;
        self.run(inner, None)?
            .into_iter()
            .find_map(|item| match item {
                Item::Vertex(id) => Some(id),
                _ => None,
            })
            .ok_or_else(|| Error::Store(format!("{}() target vertex not found", step.name)))
    }

    fn set_property(&mut self, item: &Item, key: &str, value: Value) -> Result<()> {
        if key == ID_PROPERTY {
            return Err(Error::Store("The 'id' property cannot be changed".into()));
        }
        let props = match item {
            Item::Vertex(id) => self.vertices.get_mut(id).map(|v| &mut v.properties),
            Item::Edge(id) => self.edges.get_mut(id).map(|e| &mut e.properties),
            Item::Value(_) => None,
        };
        if let Some(props) = props {
            props.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn remove(&mut self, item: &Item) {
        match item {
            Item::Vertex(id) => {
                for edge_id in self.adjacency.remove(id).unwrap_or_default() {
                    self.remove_edge(&edge_id);
                }
                self.vertices.remove(id);
                self.vertex_order.retain(|v| v != id);
            }
            Item::Edge(id) => self.remove_edge(id),
            Item::Value(_) => {}
        }
    }

    fn remove_edge(&mut self, id: &str) {
        let Some(edge) = self.edges.remove(id) else { return };
        self.edge_order.retain(|e| e != id);
        for endpoint in [&edge.out_v, &edge.in_v] {
            if let Some(rels) = self.adjacency.get_mut(endpoint) {
                rels.retain(|e| e != id);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navigation & filters
    // ------------------------------------------------------------------------

    fn incident(&self, items: &[Item], dir: Dir, labels: &[&str]) -> Vec<Item> {
        let mut result = Vec::new();
        for item in items {
            let Item::Vertex(vid) = item else { continue };
            for eid in self.adjacency.get(vid).into_iter().flatten() {
                let Some(edge) = self.edges.get(eid) else { continue };
                let matches_dir = match dir {
                    Dir::Out => &edge.out_v == vid,
                    Dir::In => &edge.in_v == vid,
                    Dir::Both => true,
                };
                let matches_label = labels.is_empty() || labels.iter().any(|l| edge.has_label(l));
                if matches_dir && matches_label {
                    result.push(Item::Edge(eid.clone()));
                }
            }
        }
        result
    }

    fn endpoints(&self, items: &[Item], side: Dir) -> Vec<Item> {
        items
            .iter()
            .filter_map(|item| match item {
                Item::Edge(eid) => self.edges.get(eid),
                _ => None,
            })
            .map(|edge| match side {
                Dir::Out => Item::Vertex(edge.out_v.clone()),
                _ => Item::Vertex(edge.in_v.clone()),
            })
            .collect()
    }

    fn has_any_label(&self, item: &Item, labels: &[&str]) -> bool {
        labels.iter().any(|l| match item {
            Item::Vertex(id) => self.vertices.get(id).is_some_and(|v| v.has_label(l)),
            Item::Edge(id) => self.edges.get(id).is_some_and(|e| e.has_label(l)),
            Item::Value(_) => false,
        })
    }

    fn property_literal(&self, item: &Item, key: &str) -> Option<String> {
        let (id, props) = match item {
            Item::Vertex(id) => (id, &self.vertices.get(id)?.properties),
            Item::Edge(id) => (id, &self.edges.get(id)?.properties),
            Item::Value(_) => return None,
        };
        if key == ID_PROPERTY {
            return Some(id.clone());
        }
        props.get(key).map(Value::to_literal)
    }

    fn materialize(&self, item: Item) -> Option<Output> {
        match item {
            Item::Vertex(id) => self.vertices.get(&id).cloned().map(|v| Output::Element(v.into())),
            Item::Edge(id) => self.edges.get(&id).cloned().map(|e| Output::Element(e.into())),
            Item::Value(v) => Some(Output::Value(v)),
        }
    }
}

// ============================================================================
// Step argument helpers
// ============================================================================

/// Split off the run of steps named in `names` that modulate the previous step.
fn modulators<'s>(rest: &'s [Step], names: &[&str]) -> (&'s [Step], usize) {
    let n = rest.iter().take_while(|s| names.contains(&s.name.as_str())).count();
    (&rest[..n], n)
}

fn string_args(step: &Step) -> Result<Vec<&str>> {
    step.str_args().ok_or_else(|| unsupported(step, "expects string arguments"))
}

fn property_args(step: &Step) -> Result<(&str, Value)> {
    let key = step.str_arg(0).ok_or_else(|| unsupported(step, "expects a property key"))?;
    let value = match step.args.get(1) {
        Some(Arg::String(s)) => Value::String(s.clone()),
        Some(Arg::Integer(n)) => Value::Int(*n),
        Some(Arg::Float(f)) => Value::Float(*f),
        _ => return Err(unsupported(step, "expects a key and a literal value")),
    };
    Ok((key, value))
}

fn unsupported(step: &Step, what: &str) -> Error {
    Error::Syntax {
        position: step.position,
        message: format!("Step '{}' {what}", step.name),
    }
}

// ============================================================================
// Tests
// ============================================================================
