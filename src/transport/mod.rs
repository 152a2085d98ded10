//! # Connection & Execution Contracts
//!
//! The two narrow interfaces the repository talks to the store through:
//!
//! - [`ConnectionProvider`] / [`Connection`]: open a client against an
//!   endpoint and select a database/collection, creating both if missing.
//! - [`Transport`]: submit query text and page through the results, either
//!   as JSON fragments (scalar mode) or as raw vertices/edges.
//!
//! ## Implementations
//!
//! | Provider | Module | Description |
//! |----------|--------|-------------|
//! | `MemoryProvider` | `memory` | In-memory store for testing/embedding |

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::gremlin::Query;
use crate::model::{ElementKind, GraphElement};
use crate::Result;

pub use memory::{MemoryClient, MemoryConnection, MemoryProvider, MemoryServer};

// ============================================================================
// Connection configuration
// ============================================================================

/// How the client reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Talk to data nodes directly.
    #[default]
    Direct,
    /// Route every request through the gateway.
    Gateway,
}

/// Wire protocol used in [`ConnectionMode::Direct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Protocol {
    #[default]
    Tcp,
    Https,
}

/// Everything needed to open a connection and select a collection.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub endpoint: String,
    pub auth_key: String,
    pub database: String,
    pub collection: String,
    /// Provisioned throughput for a newly created collection.
    #[serde(default = "default_throughput")]
    pub throughput: u32,
    #[serde(default)]
    pub connection_mode: ConnectionMode,
    #[serde(default)]
    pub protocol: Protocol,
}

fn default_throughput() -> u32 {
    ConnectionConfig::DEFAULT_THROUGHPUT
}

impl ConnectionConfig {
    pub const DEFAULT_THROUGHPUT: u32 = 400;

    pub fn new(
        endpoint: impl Into<String>,
        auth_key: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_key: auth_key.into(),
            database: database.into(),
            collection: collection.into(),
            throughput: Self::DEFAULT_THROUGHPUT,
            connection_mode: ConnectionMode::default(),
            protocol: Protocol::default(),
        }
    }

    pub fn with_throughput(mut self, throughput: u32) -> Self {
        self.throughput = throughput;
        self
    }

    pub fn with_connection_mode(mut self, mode: ConnectionMode) -> Self {
        self.connection_mode = mode;
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// The collection this configuration selects.
    pub fn collection_ref(&self) -> CollectionRef {
        CollectionRef {
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("auth_key", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("throughput", &self.throughput)
            .field("connection_mode", &self.connection_mode)
            .field("protocol", &self.protocol)
            .finish()
    }
}

/// Handle to a selected database/collection pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.database, self.collection)
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Creates connections. Creation is idempotent with respect to the
/// database and collection: both are created only if missing.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Connection: Connection;

    async fn create(&self, config: &ConnectionConfig) -> Result<Self::Connection>;
}

/// A live client plus the collection it operates on.
///
/// Network resources are released when the connection is dropped.
pub trait Connection: Send + Sync + 'static {
    type Client: Transport;

    fn client(&self) -> &Self::Client;

    fn collection(&self) -> &CollectionRef;
}

// ============================================================================
// Transport
// ============================================================================

/// One query's results, fetched a page at a time.
///
/// Callers check [`has_more_results`](Self::has_more_results) before every
/// fetch and stop once it reports false.
#[async_trait]
pub trait ResultPager<T: Send>: Send {
    fn has_more_results(&self) -> bool;

    async fn next_page(&mut self) -> Result<Vec<T>>;
}

/// Query submission.
///
/// Store and network failures are reported through the returned `Result`
/// and reach the caller unchanged.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Submit a query whose results are arbitrary JSON (counts, admin queries).
    async fn submit_scalar(
        &self,
        collection: &CollectionRef,
        query: &Query,
    ) -> Result<Box<dyn ResultPager<serde_json::Value>>>;

    /// Submit a query whose results are vertices or edges of `kind`.
    async fn submit_elements(
        &self,
        collection: &CollectionRef,
        query: &Query,
        kind: ElementKind,
    ) -> Result<Box<dyn ResultPager<GraphElement>>>;
}

// ============================================================================
// VecPager
// ============================================================================

/// Pages over an already materialised result list.
pub struct VecPager<T> {
    items: std::vec::IntoIter<T>,
    page_size: usize,
}

impl<T> VecPager<T> {
    /// `page_size` of zero is treated as one.
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items: items.into_iter(),
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> ResultPager<T> for VecPager<T> {
    fn has_more_results(&self) -> bool {
        !self.items.as_slice().is_empty()
    }

    async fn next_page(&mut self) -> Result<Vec<T>> {
        Ok(self.items.by_ref().take(self.page_size).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_vec_pager_chunks() {
        let mut pager = VecPager::new((1..=5).collect::<Vec<i32>>(), 2);
        let mut pages = Vec::new();
        while pager.has_more_results() {
            pages.push(pager.next_page().await.unwrap());
        }
        assert_eq!(pages, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[tokio::test]
    async fn test_vec_pager_empty() {
        let pager = VecPager::<i32>::new(Vec::new(), 10);
        assert!(!pager.has_more_results());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = ConnectionConfig::new("https://localhost:8081", "key", "db", "graph");
        assert_eq!(cfg.throughput, 400);
        assert_eq!(cfg.connection_mode, ConnectionMode::Direct);
        assert_eq!(cfg.protocol, Protocol::Tcp);
        assert_eq!(cfg.collection_ref().to_string(), "db/graph");
    }

    #[test]
    fn test_config_deserialize_fills_defaults() {
        let cfg: ConnectionConfig = serde_json::from_str(
            r#"{"endpoint":"https://localhost:8081","auth_key":"k","database":"d","collection":"c","connection_mode":"Gateway"}"#,
        )
        .unwrap();
        assert_eq!(cfg.throughput, 400);
        assert_eq!(cfg.connection_mode, ConnectionMode::Gateway);
        assert_eq!(cfg.protocol, Protocol::Tcp);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let cfg = ConnectionConfig::new("e", "secret-key", "d", "c");
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}
