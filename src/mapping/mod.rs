//! # Mapped Types
//!
//! The contracts a Rust type implements to be stored as a vertex or edge.
//!
//! There is no runtime introspection: each type hands out an ordered list of
//! [`PropertyDescriptor`]s (name, kind, accessors) and the query
//! builder and converter walk that list. Identity (`id`) and edge endpoints
//! are separate capabilities ([`HasId`], [`HasEndpoints`]) and never appear in
//! the descriptor list.
//!
//! Most types are declared with the [`graph_vertex!`](crate::graph_vertex) and
//! [`graph_edge!`](crate::graph_edge) macros:
//!
//! ```rust
//! use gremlin_ogm::graph_vertex;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! pub struct Person {
//!     pub id: String,
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! graph_vertex!(Person { name, age });
//! ```

mod scalar;

pub use scalar::Scalar;

use crate::model::{ScalarKind, Value};
use crate::Result;

/// Name of the identity property as it appears in queries.
pub const ID_PROPERTY: &str = "id";

/// Field names reserved for edge endpoints.
pub const SOURCE_ID_PROPERTY: &str = "source_id";
pub const TARGET_ID_PROPERTY: &str = "target_id";

/// One declared scalar property of a mapped type.
pub struct PropertyDescriptor<T> {
    pub name: &'static str,
    pub kind: ScalarKind,
    /// Read the property as a tagged value.
    pub get: fn(&T) -> Value,
    /// Assign a value already coerced to `kind`.
    pub set: fn(&mut T, Value) -> Result<()>,
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for PropertyDescriptor<T> {}

impl<T> std::fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A type with a label and a fixed, ordered set of scalar properties.
pub trait Mapped: Default + Send + Sync + 'static {
    /// Label used for `addV`/`addE`/`hasLabel`: the type's own name.
    const LABEL: &'static str;

    /// Data properties in declaration order, excluding `id` and endpoints.
    fn properties() -> Vec<PropertyDescriptor<Self>>;

    /// Look up a declared property by exact name.
    fn property(name: &str) -> Option<PropertyDescriptor<Self>> {
        Self::properties().into_iter().find(|p| p.name == name)
    }
}

/// Capability: the value has a string identity.
pub trait HasId {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

/// Capability: the value connects a source vertex to a target vertex.
pub trait HasEndpoints {
    fn source_id(&self) -> &str;
    fn target_id(&self) -> &str;
    fn set_endpoints(&mut self, source_id: String, target_id: String);
}

/// A mapped type stored as a vertex.
pub trait VertexType: Mapped + HasId {}

impl<T: Mapped + HasId> VertexType for T {}

/// A mapped type stored as an edge.
pub trait EdgeType: Mapped + HasId + HasEndpoints {}

impl<T: Mapped + HasId + HasEndpoints> EdgeType for T {}

/// Build the descriptor for field `name` from an accessor pair.
///
/// Used by the declaration macros; the field's Rust type picks the kind.
pub fn descriptor<T, S: Scalar>(
    name: &'static str,
    get: fn(&T) -> Value,
    set: fn(&mut T, Value) -> Result<()>,
) -> PropertyDescriptor<T> {
    PropertyDescriptor { name, kind: S::KIND, get, set }
}

/// Implement [`Mapped`] and [`HasId`] for a struct with a `String` `id` field.
///
/// The listed fields become the properties, in the listed order. `id` is the
/// element id and listing it is a compile error:
///
/// ```rust,compile_fail
/// use gremlin_ogm::graph_vertex;
///
/// #[derive(Default)]
/// struct Tag { id: String }
///
/// graph_vertex!(Tag { id });
/// ```
#[macro_export]
macro_rules! graph_vertex {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        const _: () = {
            $(
                assert!(
                    !$crate::mapping::__is_reserved(stringify!($field), &[$crate::mapping::ID_PROPERTY]),
                    "`id` is the element id and cannot be a declared property",
                );
            )*
        };

        $crate::__graph_mapped!($ty { $($field),* });

        impl $crate::mapping::HasId for $ty {
            fn id(&self) -> &str { &self.id }
            fn set_id(&mut self, id: String) { self.id = id; }
        }
    };
}

/// Implement [`Mapped`], [`HasId`] and [`HasEndpoints`] for a struct with
/// `String` fields `id`, `source_id` and `target_id`.
///
/// Endpoints are structural, so listing them is a compile error:
///
/// ```rust,compile_fail
/// use gremlin_ogm::graph_edge;
///
/// #[derive(Default)]
/// struct Follows { id: String, source_id: String, target_id: String }
///
/// graph_edge!(Follows { target_id });
/// ```
#[macro_export]
macro_rules! graph_edge {
    ($ty:ident { $($field:ident),* $(,)? }) => {
        const _: () = {
            $(
                assert!(
                    !$crate::mapping::__is_reserved(
                        stringify!($field),
                        &[$crate::mapping::SOURCE_ID_PROPERTY, $crate::mapping::TARGET_ID_PROPERTY],
                    ),
                    "edge endpoints cannot be declared properties",
                );
            )*
        };

        $crate::graph_vertex!($ty { $($field),* });

        impl $crate::mapping::HasEndpoints for $ty {
            fn source_id(&self) -> &str { &self.source_id }
            fn target_id(&self) -> &str { &self.target_id }
            fn set_endpoints(&mut self, source_id: String, target_id: String) {
                self.source_id = source_id;
                self.target_id = target_id;
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __graph_mapped {
    ($ty:ident { $($field:ident),* }) => {
        impl $crate::mapping::Mapped for $ty {
            const LABEL: &'static str = stringify!($ty);

            fn properties() -> Vec<$crate::mapping::PropertyDescriptor<Self>> {
                vec![
                    $(
                        $crate::mapping::__field_descriptor::<$ty, _, _>(
                            stringify!($field),
                            |o: &$ty| &o.$field,
                            |o: &$ty| $crate::mapping::Scalar::to_value(&o.$field),
                            |o: &mut $ty, v: $crate::model::Value| {
                                o.$field = $crate::mapping::Scalar::from_value(v, stringify!($field))?;
                                Ok(())
                            },
                        ),
                    )*
                ]
            }
        }
    };
}

/// Infer the scalar kind from a field accessor. Macro support only.
#[doc(hidden)]
pub fn __field_descriptor<T, S, F>(
    name: &'static str,
    _field: F,
    get: fn(&T) -> Value,
    set: fn(&mut T, Value) -> Result<()>,
) -> PropertyDescriptor<T>
where
    S: Scalar,
    F: Fn(&T) -> &S,
{
    descriptor::<T, S>(name, get, set)
}

/// Whether `name` is one of `reserved`. Usable in const context.
#[doc(hidden)]
pub const fn __is_reserved(name: &str, reserved: &[&str]) -> bool {
    let mut i = 0;
    while i < reserved.len() {
        if const_str_eq(name, reserved[i]) {
            return true;
        }
        i += 1;
    }
    false
}

const fn const_str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
