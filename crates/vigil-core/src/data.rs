//! Read-only data-access boundary.
//!
//! Sub-checks inspect the object graph exclusively through [`DataSource`],
//! which exposes queries and nothing else. [`MemorySource`] is an in-memory
//! implementation backed by a JSON snapshot of the form:
//!
//! ```json
//! { "dcim.device": [ { "id": 1, "name": "sw1", "serial": "A1" } ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::ObjectRef;

/// Errors raised by a data source.
#[derive(Debug, Error)]
pub enum DataError {
    /// The snapshot could not be read.
    #[error("failed to read data snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON or has the wrong shape.
    #[error("invalid data snapshot: {0}")]
    Invalid(String),

    /// The backing store failed while answering a query.
    #[error("query failed for {object_type}: {reason}")]
    Query { object_type: String, reason: String },
}

/// One object as seen by a sub-check.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataObject {
    pub object_type: String,
    pub id: String,
    pub fields: Map<String, Value>,
}

impl DataObject {
    /// Field value, treating JSON `null` as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    /// Reference to this object suitable for a log record subject.
    #[must_use]
    pub fn to_ref(&self) -> ObjectRef {
        let display = ["display", "name"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        ObjectRef {
            object_type: self.object_type.clone(),
            id: self.id.clone(),
            display,
        }
    }
}

/// Read-only query capability over the inspected object graph.
///
/// Implementations must not expose mutation to sub-check code.
pub trait DataSource: Send + Sync {
    /// All objects of `object_type`, in a stable order. Unknown types yield an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Query`] if the backing store fails.
    fn objects(&self, object_type: &str) -> Result<Vec<DataObject>, DataError>;

    /// A single object by id.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Query`] if the backing store fails.
    fn get(&self, object_type: &str, id: &str) -> Result<Option<DataObject>, DataError> {
        Ok(self
            .objects(object_type)?
            .into_iter()
            .find(|object| object.id == id))
    }
}

/// In-memory data source built from a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    objects: BTreeMap<String, Vec<DataObject>>,
}

impl MemorySource {
    /// An empty source with no object types.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Io`] if the file cannot be read and
    /// [`DataError::Invalid`] if its contents are malformed.
    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&text).map_err(|e| DataError::Invalid(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build a source from an already-parsed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Invalid`] if the top level is not an object of
    /// arrays, an entry is not an object, or an object lacks a scalar `id`.
    pub fn from_value(value: Value) -> Result<Self, DataError> {
        let Value::Object(types) = value else {
            return Err(DataError::Invalid(
                "top level must map object types to arrays".to_string(),
            ));
        };

        let mut objects = BTreeMap::new();
        for (object_type, entries) in types {
            let Value::Array(entries) = entries else {
                return Err(DataError::Invalid(format!(
                    "'{object_type}' must be an array of objects"
                )));
            };
            let mut loaded = Vec::with_capacity(entries.len());
            for (index, entry) in entries.into_iter().enumerate() {
                let Value::Object(fields) = entry else {
                    return Err(DataError::Invalid(format!(
                        "{object_type}[{index}] is not an object"
                    )));
                };
                let id = fields.get("id").and_then(scalar_id).ok_or_else(|| {
                    DataError::Invalid(format!("{object_type}[{index}] has no scalar 'id'"))
                })?;
                loaded.push(DataObject {
                    object_type: object_type.clone(),
                    id,
                    fields,
                });
            }
            tracing::debug!(object_type, count = loaded.len(), "loaded object type");
            objects.insert(object_type, loaded);
        }
        Ok(Self { objects })
    }

    /// Object types present in the snapshot.
    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }
}

impl DataSource for MemorySource {
    fn objects(&self, object_type: &str) -> Result<Vec<DataObject>, DataError> {
        Ok(self.objects.get(object_type).cloned().unwrap_or_default())
    }

    fn get(&self, object_type: &str, id: &str) -> Result<Option<DataObject>, DataError> {
        Ok(self
            .objects
            .get(object_type)
            .and_then(|objects| objects.iter().find(|object| object.id == id))
            .cloned())
    }
}

/// Render a JSON scalar usable as an object id.
#[must_use]
pub fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn snapshot() -> MemorySource {
        MemorySource::from_value(json!({
            "dcim.device": [
                { "id": 1, "name": "sw1", "serial": "A1" },
                { "id": 2, "name": "sw2", "serial": null },
            ],
            "dcim.cable": [
                { "id": "c-1", "termination_a": 1, "termination_b": 2 },
            ],
        }))
        .expect("snapshot should load")
    }

    #[test]
    fn objects_returns_entries_in_order() {
        let source = snapshot();
        let devices = source.objects("dcim.device").unwrap();
        let ids: Vec<&str> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn unknown_type_is_empty() {
        assert!(snapshot().objects("ipam.prefix").unwrap().is_empty());
    }

    #[test]
    fn get_finds_by_string_or_numeric_id() {
        let source = snapshot();
        assert!(source.get("dcim.device", "2").unwrap().is_some());
        assert!(source.get("dcim.cable", "c-1").unwrap().is_some());
        assert!(source.get("dcim.device", "99").unwrap().is_none());
    }

    #[test]
    fn null_fields_read_as_absent() {
        let source = snapshot();
        let device = source.get("dcim.device", "2").unwrap().unwrap();
        assert!(device.field("serial").is_none());
        assert!(device.field("name").is_some());
    }

    #[test]
    fn to_ref_uses_name_for_display() {
        let device = snapshot().get("dcim.device", "1").unwrap().unwrap();
        assert_eq!(
            device.to_ref(),
            ObjectRef::new("dcim.device", "1").with_display("sw1")
        );
    }

    #[test]
    fn rejects_object_without_id() {
        let err = MemorySource::from_value(json!({ "dcim.device": [ { "name": "x" } ] }))
            .unwrap_err();
        assert!(err.to_string().contains("no scalar 'id'"));
    }

    #[test]
    fn rejects_non_object_top_level() {
        assert!(MemorySource::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"dcim.site": [{"id": "s1"}]}"#).unwrap();
        let source = MemorySource::from_path(&path).unwrap();
        assert_eq!(source.object_types().collect::<Vec<_>>(), ["dcim.site"]);
    }
}
