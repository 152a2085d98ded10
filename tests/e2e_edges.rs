//! End-to-end tests for edge CRUD and endpoint lookups.

use chrono::{DateTime, TimeZone, Utc};
use gremlin_ogm::transport::{MemoryConnection, MemoryProvider, MemoryServer};
use gremlin_ogm::{graph_edge, graph_vertex, ConnectionConfig, Edge, Error, GraphRepository};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq)]
struct VertexStub {
    id: String,
    text: String,
}

graph_vertex!(VertexStub { text });

#[derive(Debug, Default, Clone, PartialEq)]
struct EdgeStub {
    id: String,
    source_id: String,
    target_id: String,
    flag: bool,
    byte: u8,
    letter: char,
    integer: i32,
    double: f64,
    text: String,
    time_stamp: DateTime<Utc>,
}

graph_edge!(EdgeStub { flag, byte, letter, integer, double, text, time_stamp });

// ============================================================================
// Helpers
// ============================================================================

async fn open() -> GraphRepository<MemoryConnection> {
    let provider = MemoryProvider::new(MemoryServer::new());
    let config = ConnectionConfig::new("memory://localhost", "key", "ogm-tests", "edges");
    GraphRepository::open(&provider, &config).await.unwrap()
}

async fn vertex(repo: &GraphRepository<MemoryConnection>) -> String {
    let v = VertexStub { id: Uuid::new_v4().to_string(), text: "Hello Vertex".into() };
    repo.add_vertex(&v).await.unwrap();
    v.id
}

fn edge(source: &str, target: &str) -> EdgeStub {
    EdgeStub {
        id: Uuid::new_v4().to_string(),
        source_id: source.into(),
        target_id: target.into(),
        flag: true,
        byte: 255,
        letter: 'A',
        integer: 2,
        double: -5.678,
        text: "Hello Edge".into(),
        time_stamp: Utc.with_ymd_and_hms(2017, 9, 19, 10, 45, 52).unwrap(),
    }
}

// ============================================================================
// 1. Create & lookup
// ============================================================================

#[tokio::test]
async fn test_edge_found_by_source_id() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    let e = edge(&a, &b);
    repo.add_edge(&e).await.unwrap();

    let found: Vec<EdgeStub> = repo.get_edges_with_source_id(&a).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].target_id, b);
    assert_eq!(found[0], e);

    let none: Vec<EdgeStub> = repo.get_edges_with_source_id(&b).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_edges_found_by_target_id() {
    let repo = open().await;
    let hub = vertex(&repo).await;
    let x = vertex(&repo).await;
    let y = vertex(&repo).await;
    repo.add_edge(&edge(&x, &hub)).await.unwrap();
    repo.add_edge(&edge(&y, &hub)).await.unwrap();

    let found: Vec<EdgeStub> = repo.get_edges_with_target_id(&hub).await.unwrap();
    let sources: Vec<_> = found.iter().map(|e| e.source_id.clone()).collect();
    assert_eq!(sources, vec![x, y]);
}

#[tokio::test]
async fn test_get_edge_by_endpoints_and_id() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    let e = edge(&a, &b);
    repo.add_edge(&e).await.unwrap();

    assert_eq!(repo.get_edge::<EdgeStub>(&a, &b).await.unwrap(), Some(e.clone()));
    assert_eq!(repo.get_edge::<EdgeStub>(&b, &a).await.unwrap(), None);
    assert_eq!(repo.get_edge_by_id::<EdgeStub>(&e.id).await.unwrap(), Some(e));
    assert_eq!(repo.get_edges::<EdgeStub>().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_edge_to_missing_vertex_fails() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let e = edge(&a, "nowhere");
    assert!(matches!(repo.add_edge(&e).await, Err(Error::Store(_))));
    assert_eq!(repo.count_edges().await.unwrap(), 0);
}

// ============================================================================
// 2. Update & remove
// ============================================================================

#[tokio::test]
async fn test_update_edge_keeps_endpoints() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    let mut e = edge(&a, &b);
    repo.add_edge(&e).await.unwrap();

    e.integer = 99;
    e.text = "Changed".into();
    repo.update_edge(&e).await.unwrap();

    let back = repo.get_edge_by_id::<EdgeStub>(&e.id).await.unwrap().unwrap();
    assert_eq!(back, e);
    assert_eq!(back.source_id, a);
    assert_eq!(back.target_id, b);
}

#[tokio::test]
async fn test_remove_edge_by_endpoints() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    repo.add_edge(&edge(&a, &b)).await.unwrap();

    repo.remove_edge::<EdgeStub>(&a, &b).await.unwrap();
    assert_eq!(repo.count_edges().await.unwrap(), 0);
    assert_eq!(repo.count_vertices().await.unwrap(), 2);
}

#[tokio::test]
async fn test_remove_edge_by_id() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    let keep = edge(&a, &b);
    let gone = edge(&b, &a);
    repo.add_edge(&keep).await.unwrap();
    repo.add_edge(&gone).await.unwrap();

    repo.remove_edge_by_id(&gone.id).await.unwrap();
    assert_eq!(repo.get_edges::<EdgeStub>().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn test_removing_vertex_removes_its_edges() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    let c = vertex(&repo).await;
    repo.add_edge(&edge(&a, &b)).await.unwrap();
    repo.add_edge(&edge(&c, &a)).await.unwrap();
    repo.add_edge(&edge(&b, &c)).await.unwrap();

    repo.remove_vertex(&a).await.unwrap();
    assert_eq!(repo.count_edges().await.unwrap(), 1);
    assert_eq!(repo.get_edges_with_source_id::<EdgeStub>(&b).await.unwrap().len(), 1);
}

// ============================================================================
// 3. Validation
// ============================================================================

#[tokio::test]
async fn test_empty_endpoints_rejected() {
    let repo = open().await;
    let e = edge("", "b");
    assert!(matches!(repo.add_edge(&e).await, Err(Error::InvalidArgument(_))));
    assert!(matches!(
        repo.get_edges_with_target_id::<EdgeStub>("").await,
        Err(Error::InvalidArgument(_)),
    ));
    assert!(matches!(
        repo.get_edge::<EdgeStub>("a", "").await,
        Err(Error::InvalidArgument(_)),
    ));
}

#[tokio::test]
async fn test_execute_elements_returns_raw_edges() {
    let repo = open().await;
    let a = vertex(&repo).await;
    let b = vertex(&repo).await;
    repo.add_edge(&edge(&a, &b)).await.unwrap();

    let raw: Vec<Edge> = repo.execute_elements("g.E()").await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].out_v, a);
    assert_eq!(raw[0].in_v, b);
    assert_eq!(raw[0].label, "EdgeStub");
}
