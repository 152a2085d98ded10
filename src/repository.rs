//! Graph repository: typed CRUD and traversal over one connection.
//!
//! Every operation builds its query with [`crate::gremlin::builder`], submits
//! it through the connection's [`Transport`], drains every page, and maps raw
//! elements back with [`crate::convert`]. Argument checks happen in the
//! builder, so invalid input never reaches the store.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::convert::{edge_to_object, vertex_to_object};
use crate::gremlin::{builder, Query};
use crate::mapping::{EdgeType, VertexType};
use crate::model::{Edge, Element, GraphElement, Vertex};
use crate::transport::{Connection, ConnectionConfig, ConnectionProvider, Transport};
use crate::{Error, Result};

/// Hops taken by [`GraphRepository::forward_traverse_one`] and
/// [`GraphRepository::reverse_traverse_one`].
pub const DEFAULT_TRAVERSAL_DEPTH: usize = 1;

/// Typed access to the graph behind a [`Connection`].
///
/// Holds nothing but the connection; clones share it.
pub struct GraphRepository<C> {
    connection: Arc<C>,
}

impl<C> Clone for GraphRepository<C> {
    fn clone(&self) -> Self {
        Self { connection: Arc::clone(&self.connection) }
    }
}

impl<C: Connection> GraphRepository<C> {
    pub fn new(connection: C) -> Self {
        Self { connection: Arc::new(connection) }
    }

    /// Share an already wrapped connection.
    pub fn from_shared(connection: Arc<C>) -> Self {
        Self { connection }
    }

    /// Open a connection with `provider` and wrap it.
    pub async fn open<P>(provider: &P, config: &ConnectionConfig) -> Result<Self>
    where
        P: ConnectionProvider<Connection = C>,
    {
        Ok(Self::new(provider.create(config).await?))
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    // ========================================================================
    // Vertices
    // ========================================================================

    #[instrument(skip(self, vertex), fields(label = T::LABEL), level = "debug")]
    pub async fn add_vertex<T: VertexType>(&self, vertex: &T) -> Result<()> {
        let query = builder::add_vertex(vertex)?;
        self.submit(&query).await
    }

    /// The vertex with `id` and label `T`, if any.
    #[instrument(skip(self), fields(label = T::LABEL), level = "debug")]
    pub async fn get_vertex<T: VertexType>(&self, id: &str) -> Result<Option<T>> {
        let query = builder::get_vertex::<T>(id)?;
        let raw = self.fetch::<Vertex>(&query).await?;
        raw.first().map(|v| vertex_to_object(Some(v))).transpose()
    }

    /// Every vertex labelled `T`, in store order.
    #[instrument(skip(self), fields(label = T::LABEL), level = "debug")]
    pub async fn get_vertices<T: VertexType>(&self) -> Result<Vec<T>> {
        let raw = self.fetch::<Vertex>(&builder::get_vertices::<T>()).await?;
        raw.iter().map(|v| vertex_to_object(Some(v))).collect()
    }

    /// Overwrite every declared property of the stored vertex.
    #[instrument(skip(self, vertex), fields(label = T::LABEL), level = "debug")]
    pub async fn update_vertex<T: VertexType>(&self, vertex: &T) -> Result<()> {
        let query = builder::update_vertex(vertex)?;
        self.submit(&query).await
    }

    /// Drop the vertex and every edge touching it.
    #[instrument(skip(self), level = "debug")]
    pub async fn remove_vertex(&self, id: &str) -> Result<()> {
        let query = builder::remove_vertex(id)?;
        self.submit(&query).await
    }

    // ========================================================================
    // Edges
    // ========================================================================

    #[instrument(skip(self, edge), fields(label = E::LABEL), level = "debug")]
    pub async fn add_edge<E: EdgeType>(&self, edge: &E) -> Result<()> {
        let query = builder::add_edge(edge)?;
        self.submit(&query).await
    }

    /// The `E` edge from `source_id` to `target_id`, if any.
    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn get_edge<E: EdgeType>(&self, source_id: &str, target_id: &str) -> Result<Option<E>> {
        let query = builder::get_edge::<E>(source_id, target_id)?;
        self.first_edge(&query).await
    }

    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn get_edge_by_id<E: EdgeType>(&self, id: &str) -> Result<Option<E>> {
        let query = builder::get_edge_by_id(id)?;
        self.first_edge(&query).await
    }

    /// Every `E` edge leaving `source_id`.
    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn get_edges_with_source_id<E: EdgeType>(&self, source_id: &str) -> Result<Vec<E>> {
        let query = builder::get_edges_with_source_id::<E>(source_id)?;
        self.all_edges(&query).await
    }

    /// Every `E` edge entering `target_id`.
    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn get_edges_with_target_id<E: EdgeType>(&self, target_id: &str) -> Result<Vec<E>> {
        let query = builder::get_edges_with_target_id::<E>(target_id)?;
        self.all_edges(&query).await
    }

    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn get_edges<E: EdgeType>(&self) -> Result<Vec<E>> {
        self.all_edges(&builder::get_edges::<E>()).await
    }

    /// Overwrite the data properties of the stored edge. Endpoints never move.
    #[instrument(skip(self, edge), fields(label = E::LABEL), level = "debug")]
    pub async fn update_edge<E: EdgeType>(&self, edge: &E) -> Result<()> {
        let query = builder::update_edge(edge)?;
        self.submit(&query).await
    }

    /// Drop the `E` edge(s) from `source_id` to `target_id`.
    #[instrument(skip(self), fields(label = E::LABEL), level = "debug")]
    pub async fn remove_edge<E: EdgeType>(&self, source_id: &str, target_id: &str) -> Result<()> {
        let query = builder::remove_edge::<E>(source_id, target_id)?;
        self.submit(&query).await
    }

    /// [`remove_edge`](Self::remove_edge) using the edge's own endpoints.
    #[instrument(skip(self, edge), fields(label = E::LABEL), level = "debug")]
    pub async fn remove_edge_of<E: EdgeType>(&self, edge: &E) -> Result<()> {
        let query = builder::remove_edge_of(edge)?;
        self.submit(&query).await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn remove_edge_by_id(&self, id: &str) -> Result<()> {
        let query = builder::remove_edge_by_id(id)?;
        self.submit(&query).await
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Vertices exactly `depth` outgoing `E` hops from `id`.
    ///
    /// Intermediate layers are not returned. Depth 0 yields the start vertex.
    #[instrument(skip(self), fields(vertex = V::LABEL, edge = E::LABEL), level = "debug")]
    pub async fn forward_traverse<V: VertexType, E: EdgeType>(&self, id: &str, depth: usize) -> Result<Vec<V>> {
        let query = builder::forward_traverse::<V, E>(id, depth)?;
        self.all_vertices(&query).await
    }

    /// Vertices exactly `depth` incoming `E` hops from `id`.
    #[instrument(skip(self), fields(vertex = V::LABEL, edge = E::LABEL), level = "debug")]
    pub async fn reverse_traverse<V: VertexType, E: EdgeType>(&self, id: &str, depth: usize) -> Result<Vec<V>> {
        let query = builder::reverse_traverse::<V, E>(id, depth)?;
        self.all_vertices(&query).await
    }

    pub async fn forward_traverse_one<V: VertexType, E: EdgeType>(&self, id: &str) -> Result<Vec<V>> {
        self.forward_traverse::<V, E>(id, DEFAULT_TRAVERSAL_DEPTH).await
    }

    pub async fn reverse_traverse_one<V: VertexType, E: EdgeType>(&self, id: &str) -> Result<Vec<V>> {
        self.reverse_traverse::<V, E>(id, DEFAULT_TRAVERSAL_DEPTH).await
    }

    // ========================================================================
    // Raw queries
    // ========================================================================

    /// Run arbitrary query text and return every page as JSON text, concatenated.
    #[instrument(skip(self), level = "debug")]
    pub async fn execute_scalar(&self, query: &str) -> Result<String> {
        let query = non_empty(query)?;
        let mut out = String::new();
        for page in self.scalar_pages(&query).await? {
            out.push_str(&serde_json::to_string(&page)?);
        }
        Ok(out)
    }

    /// Run arbitrary query text and return every result, flattened.
    #[instrument(skip(self), level = "debug")]
    pub async fn execute_scalar_values(&self, query: &str) -> Result<Vec<serde_json::Value>> {
        let query = non_empty(query)?;
        Ok(self.scalar_pages(&query).await?.into_iter().flatten().collect())
    }

    /// Run arbitrary query text whose results are raw vertices or edges.
    #[instrument(skip(self), fields(kind = %E::KIND), level = "debug")]
    pub async fn execute_elements<E: Element>(&self, query: &str) -> Result<Vec<E>> {
        let query = non_empty(query)?;
        self.fetch::<E>(&query).await
    }

    /// Number of vertices in the collection.
    pub async fn count_vertices(&self) -> Result<u64> {
        self.count(&builder::count_vertices()).await
    }

    /// Number of edges in the collection.
    pub async fn count_edges(&self) -> Result<u64> {
        self.count(&builder::count_edges()).await
    }

    /// Drop every vertex, and with them every edge.
    #[instrument(skip(self), level = "debug")]
    pub async fn clear(&self) -> Result<()> {
        self.submit(&builder::drop_vertices()).await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    /// Submit a write and drain its results.
    async fn submit(&self, query: &Query) -> Result<()> {
        self.scalar_pages(query).await.map(drop)
    }

    async fn scalar_pages(&self, query: &Query) -> Result<Vec<Vec<serde_json::Value>>> {
        debug!(query = %query, "submitting scalar query");
        let conn = &*self.connection;
        let mut pager = conn.client().submit_scalar(conn.collection(), query).await?;
        let mut pages = Vec::new();
        while pager.has_more_results() {
            let page = pager.next_page().await?;
            trace!(results = page.len(), "fetched page");
            pages.push(page);
        }
        Ok(pages)
    }

    async fn fetch<E: Element>(&self, query: &Query) -> Result<Vec<E>> {
        debug!(query = %query, kind = %E::KIND, "submitting element query");
        let conn = &*self.connection;
        let mut pager = conn.client().submit_elements(conn.collection(), query, E::KIND).await?;
        let mut out = Vec::new();
        while pager.has_more_results() {
            let page = pager.next_page().await?;
            trace!(results = page.len(), "fetched page");
            for element in page {
                out.push(E::from_element(element).map_err(|other| wrong_kind::<E>(&other))?);
            }
        }
        Ok(out)
    }

    async fn first_edge<E: EdgeType>(&self, query: &Query) -> Result<Option<E>> {
        let raw = self.fetch::<Edge>(query).await?;
        raw.first().map(|e| edge_to_object(Some(e))).transpose()
    }

    async fn all_edges<E: EdgeType>(&self, query: &Query) -> Result<Vec<E>> {
        let raw = self.fetch::<Edge>(query).await?;
        raw.iter().map(|e| edge_to_object(Some(e))).collect()
    }

    async fn all_vertices<V: VertexType>(&self, query: &Query) -> Result<Vec<V>> {
        let raw = self.fetch::<Vertex>(query).await?;
        raw.iter().map(|v| vertex_to_object(Some(v))).collect()
    }

    async fn count(&self, query: &Query) -> Result<u64> {
        let values = self.scalar_pages(query).await?.into_iter().flatten();
        let mut total = 0;
        for value in values {
            total += value
                .as_u64()
                .ok_or_else(|| Error::Store(format!("count() returned {value}")))?;
        }
        Ok(total)
    }
}

fn non_empty(query: &str) -> Result<Query> {
    let query = Query::raw(query);
    if query.is_empty() {
        return Err(Error::InvalidArgument("query must not be empty".into()));
    }
    Ok(query)
}

fn wrong_kind<E: Element>(got: &GraphElement) -> Error {
    Error::InvalidArgument(format!(
        "query returned {} '{}' where {} results were requested",
        got.kind(),
        got.id(),
        E::KIND,
    ))
}
