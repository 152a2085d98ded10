//! Raw edge as returned by the store.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};

/// An untyped directed edge.
///
/// `out_v` is the vertex the edge leaves, `in_v` the vertex it enters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub label: String,
    #[serde(rename = "outV")]
    pub out_v: String,
    #[serde(rename = "inV")]
    pub in_v: String,
    pub properties: PropertyMap,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        out_v: impl Into<String>,
        in_v: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            out_v: out_v.into(),
            in_v: in_v.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label == label
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

}
