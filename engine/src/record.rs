//! Record types for storing data.
//!
//! A record is a flat JSON object with a string `id`. Two reserved fields
//! carry local bookkeeping and are stripped before anything goes to the
//! remote API.

use crate::{error::Result, Error, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field holding the unsynced marker.
pub const UNSYNCED_FIELD: &str = "_unsynced";
/// Reserved field holding the last local save time.
pub const SAVED_AT_FIELD: &str = "_savedAt";

const RESERVED: [&str; 3] = ["id", UNSYNCED_FIELD, SAVED_AT_FIELD];

/// A data record in a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier within the partition
    pub id: RecordId,
    /// Set while the record has not been confirmed by the remote API
    #[serde(rename = "_unsynced", default)]
    pub unsynced: bool,
    /// When the record was last saved locally (milliseconds since epoch)
    #[serde(rename = "_savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<Timestamp>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            unsynced: false,
            saved_at: None,
            fields: Map::new(),
        }
    }

    /// Build a record from a JSON object such as a remote API response.
    ///
    /// The object must contain a string `id`. Reserved bookkeeping fields are
    /// honoured if present.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(Error::InvalidRecord("expected a JSON object".into()));
        };

        let id = match map.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => return Err(Error::MissingId),
        };
        let unsynced = match map.remove(UNSYNCED_FIELD) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => b,
            Some(other) => {
                return Err(Error::InvalidRecord(format!(
                    "{UNSYNCED_FIELD} must be a bool, got {other}"
                )))
            }
        };
        let saved_at = map.remove(SAVED_AT_FIELD).and_then(|v| v.as_u64());

        Ok(Self {
            id,
            unsynced,
            saved_at,
            fields: map,
        })
    }

    /// Get a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// All non-reserved fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Set a field value. Reserved names are rejected.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if RESERVED.contains(&name.as_str()) {
            return Err(Error::InvalidRecord(format!("'{name}' is a reserved field")));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    pub(crate) fn insert_field(&mut self, name: &'static str, value: Value) {
        debug_assert!(!RESERVED.contains(&name));
        self.fields.insert(name.to_string(), value);
    }

    /// Stamp the record as saved locally and not yet confirmed remotely.
    pub fn mark_unsynced(&mut self, saved_at: Timestamp) {
        self.unsynced = true;
        self.saved_at = Some(saved_at);
    }

    /// Clear the unsynced marker after a confirmed push.
    pub fn mark_synced(&mut self) {
        self.unsynced = false;
    }

    /// The value of `field` as an index key, if the field is indexable.
    ///
    /// Strings index as themselves, numbers and bools by their JSON text.
    /// Null, arrays and objects are not indexed.
    pub fn index_key(&self, field: &str) -> Option<String> {
        index_key(self.fields.get(field)?)
    }

    /// JSON body for the remote API: `id` plus every non-reserved field.
    pub fn to_remote_payload(&self) -> Value {
        let mut body = self.fields.clone();
        body.insert("id".into(), Value::String(self.id.clone()));
        Value::Object(body)
    }
}

/// Canonical index key for a JSON value.
pub fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
