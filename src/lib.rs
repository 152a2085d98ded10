//! # gremlin-ogm: Typed Object-Graph Mapping over Gremlin
//!
//! Store plain Rust structs as vertices and edges of a Gremlin property
//! graph, and read them back, without writing query text by hand.
//!
//! ## Design Principles
//!
//! 1. **Declared, not reflected**: a type's label and properties come from a
//!    `graph_vertex!` / `graph_edge!` declaration checked at compile time
//! 2. **Builder owns nothing**: typed value → query text is a pure function
//! 3. **Trait-first I/O**: `ConnectionProvider` and `Transport` are the only
//!    contact with the store
//! 4. **Clean DTOs**: `Vertex`, `Edge`, `Value` cross every boundary
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gremlin_ogm::{graph_edge, graph_vertex, ConnectionConfig, GraphRepository};
//! use gremlin_ogm::transport::{MemoryProvider, MemoryServer};
//!
//! #[derive(Debug, Default)]
//! struct Person { id: String, name: String }
//! graph_vertex!(Person { name });
//!
//! #[derive(Debug, Default)]
//! struct Knows { id: String, source_id: String, target_id: String, since: i64 }
//! graph_edge!(Knows { since });
//!
//! # async fn example() -> gremlin_ogm::Result<()> {
//! let provider = MemoryProvider::new(MemoryServer::new());
//! let config = ConnectionConfig::new("memory://", "key", "social", "people");
//! let repo = GraphRepository::open(&provider, &config).await?;
//!
//! repo.add_vertex(&Person { id: "ada".into(), name: "Ada".into() }).await?;
//! repo.add_vertex(&Person { id: "alan".into(), name: "Alan".into() }).await?;
//! repo.add_edge(&Knows {
//!     id: "k1".into(),
//!     source_id: "ada".into(),
//!     target_id: "alan".into(),
//!     since: 1936,
//! }).await?;
//!
//! let friends: Vec<Person> = repo.forward_traverse::<Person, Knows>("ada", 1).await?;
//! assert_eq!(friends[0].name, "Alan");
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! | Provider | Description |
//! |----------|-------------|
//! | `MemoryProvider` | In-memory graph for testing/embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod mapping;
pub mod gremlin;
pub mod convert;
pub mod repository;
pub mod transport;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Value, ScalarKind, PropertyMap,
    Vertex, Edge, GraphElement, Element, ElementKind,
};

// ============================================================================
// Re-exports: Mapping
// ============================================================================

pub use mapping::{
    Mapped, HasId, HasEndpoints, VertexType, EdgeType,
    PropertyDescriptor, Scalar,
};

// ============================================================================
// Re-exports: Queries & Repository
// ============================================================================

pub use gremlin::Query;
pub use repository::{GraphRepository, DEFAULT_TRAVERSAL_DEPTH};

// ============================================================================
// Re-exports: Transport
// ============================================================================

pub use transport::{
    ConnectionConfig, ConnectionMode, Protocol, CollectionRef,
    ConnectionProvider, Connection, Transport, ResultPager,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conversion error on '{property}': expected {expected}, got {got}")]
    Conversion { property: String, expected: ScalarKind, got: String },

    #[error("Gremlin syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
