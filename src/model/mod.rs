//! # Raw Graph Model
//!
//! Untyped DTOs that cross the transport boundary: scalar values, property
//! bags, and the raw vertices/edges the store returns before conversion.
//!
//! Design rule: this module is pure data with no I/O.

pub mod value;
pub mod property_map;
pub mod vertex;
pub mod edge;
pub mod element;

pub use value::{Value, ScalarKind};
pub use property_map::PropertyMap;
pub use vertex::Vertex;
pub use edge::Edge;
pub use element::{Element, ElementKind, GraphElement};
