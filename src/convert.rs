//! Result converter: raw vertices/edges into mapped types.
//!
//! Field by field: identity from the element id, edge endpoints from the
//! element's out/in vertex ids, and every raw property whose name matches a
//! declared property is coerced to that property's kind. Unknown properties
//! are dropped; missing ones keep their default.

use crate::mapping::{
    EdgeType, Mapped, PropertyDescriptor, VertexType, ID_PROPERTY, SOURCE_ID_PROPERTY,
    TARGET_ID_PROPERTY,
};
use crate::model::{Edge, PropertyMap, Vertex};
use crate::{Error, Result};

/// Convert a raw vertex into `T`. `None` is an [`Error::InvalidArgument`].
pub fn vertex_to_object<T: VertexType>(raw: Option<&Vertex>) -> Result<T> {
    let vertex = raw.ok_or_else(|| Error::InvalidArgument("vertex must not be null".into()))?;
    let mut obj = T::default();
    obj.set_id(vertex.id.clone());
    apply_properties(&mut obj, &vertex.properties, &[ID_PROPERTY])?;
    Ok(obj)
}

/// Convert a raw edge into `T`. `None` is an [`Error::InvalidArgument`].
pub fn edge_to_object<T: EdgeType>(raw: Option<&Edge>) -> Result<T> {
    let edge = raw.ok_or_else(|| Error::InvalidArgument("edge must not be null".into()))?;
    let mut obj = T::default();
    obj.set_id(edge.id.clone());
    obj.set_endpoints(edge.out_v.clone(), edge.in_v.clone());
    apply_properties(&mut obj, &edge.properties, &EDGE_STRUCTURAL)?;
    Ok(obj)
}

impl Vertex {
    /// Shorthand for [`vertex_to_object`].
    pub fn to_object<T: VertexType>(&self) -> Result<T> {
        vertex_to_object(Some(self))
    }
}

impl Edge {
    /// Shorthand for [`edge_to_object`].
    pub fn to_object<T: EdgeType>(&self) -> Result<T> {
        edge_to_object(Some(self))
    }
}

/// Raw property names an edge takes from its structure instead.
const EDGE_STRUCTURAL: [&str; 3] = [ID_PROPERTY, SOURCE_ID_PROPERTY, TARGET_ID_PROPERTY];

fn apply_properties<T: Mapped>(obj: &mut T, properties: &PropertyMap, structural: &[&str]) -> Result<()> {
    let declared: Vec<PropertyDescriptor<T>> = T::properties();

    for (name, value) in properties {
        if structural.contains(&name.as_str()) {
            continue;
        }
        let Some(prop) = declared.iter().find(|p| p.name == name.as_str()) else {
            tracing::trace!(label = T::LABEL, property = %name, "dropping undeclared property");
            continue;
        };
        let coerced = value.clone().coerce(prop.kind, prop.name)?;
        (prop.set)(obj, coerced)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sensor {
        id: String,
        active: bool,
        channel: u8,
        grade: char,
        reading: i32,
        offset: f64,
        location: String,
        installed: DateTime<Utc>,
    }

    crate::graph_vertex!(Sensor { active, channel, grade, reading, offset, location, installed });

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Feeds {
        id: String,
        source_id: String,
        target_id: String,
        weight: f64,
    }

    crate::graph_edge!(Feeds { weight });

    fn sensor() -> Sensor {
        Sensor {
            id: "s-1".into(),
            active: true,
            channel: 255,
            grade: 'A',
            reading: 2,
            offset: -5.678,
            location: "Hello Vertex".into(),
            installed: Utc.with_ymd_and_hms(2017, 9, 19, 10, 45, 52).unwrap(),
        }
    }

    /// The raw element a store returns after `add_vertex`: every value as text.
    fn stored(obj: &Sensor) -> Vertex {
        let mut v = Vertex::new(obj.id.clone(), "Sensor");
        for prop in Sensor::properties() {
            v = v.with_property(prop.name, (prop.get)(obj).to_literal());
        }
        v
    }

    #[test]
    fn test_vertex_round_trip_from_literals() {
        let original = sensor();
        let back: Sensor = vertex_to_object(Some(&stored(&original))).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_vertex_round_trip_from_typed_values() {
        let original = sensor();
        let mut raw = Vertex::new("s-1", "Sensor");
        for prop in Sensor::properties() {
            raw = raw.with_property(prop.name, (prop.get)(&original));
        }
        assert_eq!(raw.to_object::<Sensor>().unwrap(), original);
    }

    #[test]
    fn test_null_input_rejected() {
        assert!(matches!(vertex_to_object::<Sensor>(None), Err(Error::InvalidArgument(_))));
        assert!(matches!(edge_to_object::<Feeds>(None), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_properties_dropped_missing_defaulted() {
        let raw = Vertex::new("s-2", "Sensor")
            .with_property("location", "Roof")
            .with_property("colour", "blue");
        let s: Sensor = raw.to_object().unwrap();
        assert_eq!(s.id, "s-2");
        assert_eq!(s.location, "Roof");
        assert_eq!(s.reading, 0);
        assert!(!s.active);
    }

    #[test]
    fn test_id_property_does_not_override_element_id() {
        let raw = Vertex::new("s-3", "Sensor").with_property("id", "other");
        assert_eq!(raw.to_object::<Sensor>().unwrap().id, "s-3");
    }

    #[test]
    fn test_conversion_failure_is_fatal() {
        let raw = Vertex::new("s-4", "Sensor").with_property("reading", "not a number");
        let err = raw.to_object::<Sensor>().unwrap_err();
        assert!(matches!(err, Error::Conversion { ref property, .. } if property == "reading"));

        let raw = Vertex::new("s-5", "Sensor").with_property("channel", Value::Int(300));
        assert!(matches!(raw.to_object::<Sensor>(), Err(Error::Conversion { .. })));
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Transfer {
        id: String,
        source_id: String,
        memo: String,
    }

    crate::graph_vertex!(Transfer { source_id, memo });

    #[test]
    fn test_vertex_may_declare_endpoint_named_fields() {
        let raw = Vertex::new("t-1", "Transfer")
            .with_property("source_id", "acct-9")
            .with_property("memo", "rent");
        let t: Transfer = raw.to_object().unwrap();
        assert_eq!(t.source_id, "acct-9");
        assert_eq!(t.memo, "rent");
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Note {
        id: String,
        text: String,
        precise: String,
        initial: String,
    }

    crate::graph_vertex!(Note { text, precise, initial });

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Cites {
        id: String,
        source_id: String,
        target_id: String,
        text: String,
        initial: String,
    }

    crate::graph_edge!(Cites { text, initial });

    #[test]
    fn test_json_text_reaches_string_fields_unchanged() {
        let raw: Vertex = serde_json::from_str(
            r#"{
                "id": "n-1",
                "label": "Note",
                "properties": {
                    "text": "2017-09-19T10:45:52.000+02:00",
                    "precise": "2017-09-19T10:45:52.123456Z",
                    "initial": "Q"
                }
            }"#,
        )
        .unwrap();
        let note: Note = raw.to_object().unwrap();
        assert_eq!(note.text, "2017-09-19T10:45:52.000+02:00");
        assert_eq!(note.precise, "2017-09-19T10:45:52.123456Z");
        assert_eq!(note.initial, "Q");

        let raw: Edge = serde_json::from_str(
            r#"{
                "id": "c-1",
                "label": "Cites",
                "outV": "n-1",
                "inV": "n-2",
                "properties": { "text": "2017-09-19T10:45:52.000+02:00", "initial": "Q" }
            }"#,
        )
        .unwrap();
        let cites: Cites = raw.to_object().unwrap();
        assert_eq!(cites.source_id, "n-1");
        assert_eq!(cites.target_id, "n-2");
        assert_eq!(cites.text, "2017-09-19T10:45:52.000+02:00");
        assert_eq!(cites.initial, "Q");
    }

    #[test]
    fn test_json_text_still_parses_into_typed_fields() {
        let raw: Vertex = serde_json::from_str(
            r#"{
                "id": "s-6",
                "label": "Sensor",
                "properties": {
                    "active": "true",
                    "channel": 255,
                    "grade": "A",
                    "reading": "2",
                    "offset": -5.678,
                    "installed": "2017-09-19T12:45:52+02:00"
                }
            }"#,
        )
        .unwrap();
        let s: Sensor = raw.to_object().unwrap();
        assert!(s.active);
        assert_eq!(s.channel, 255);
        assert_eq!(s.grade, 'A');
        assert_eq!(s.reading, 2);
        assert_eq!(s.offset, -5.678);
        assert_eq!(s.installed, sensor().installed);
    }

    #[test]
    fn test_edge_endpoints_come_from_structure() {
        let raw = Edge::new("e-1", "Feeds", "s-1", "s-2")
            .with_property("weight", "0.5")
            .with_property("source_id", "bogus")
            .with_property("target_id", "bogus");
        let e: Feeds = edge_to_object(Some(&raw)).unwrap();
        assert_eq!(e.id, "e-1");
        assert_eq!(e.source_id, "s-1");
        assert_eq!(e.target_id, "s-2");
        assert_eq!(e.weight, 0.5);
    }
}
