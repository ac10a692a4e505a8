use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of a record within a record set
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    String(String),
    Uuid(Uuid),
    Integer(u64),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::String(s) => write!(f, "{}", s),
            RecordId::Uuid(u) => write!(f, "{}", u),
            RecordId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::String(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::String(s.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(i: u64) -> Self {
        RecordId::Integer(i)
    }
}

impl From<Uuid> for RecordId {
    fn from(u: Uuid) -> Self {
        RecordId::Uuid(u)
    }
}

/// A single row of named fields, immutable once ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Named field values (string/number/bool/null)
    pub fields: Value,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new(id: RecordId, fields: Value) -> Self {
        Self { id, fields }
    }

    /// Get a field value by name
    ///
    /// Returns `None` when the field is absent or explicitly null,
    /// so callers never have to distinguish the two.
    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(Value::Null) | None => None,
            some => some,
        }
    }

    /// Names of the fields present on this record
    pub fn field_names(&self) -> Vec<&str> {
        match &self.fields {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// An ordered collection of records with unique ids and a stable column schema
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    by_id: AHashMap<RecordId, usize>,
    columns: Vec<String>,
}

impl RecordSet {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record set from rows, failing on duplicate ids or
    /// non-object field payloads.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut set = Self::new();
        for record in records {
            set.push(record)?;
        }
        Ok(set)
    }

    /// Append a record, extending the column schema with any new fields
    pub fn push(&mut self, record: Record) -> Result<()> {
        let map = match &record.fields {
            Value::Object(map) => map,
            other => {
                return Err(Error::MalformedRecord {
                    id: record.id.to_string(),
                    reason: format!("fields must be an object, got {}", value_kind(other)),
                });
            }
        };

        if self.by_id.contains_key(&record.id) {
            return Err(Error::DuplicateRecordId(record.id.to_string()));
        }

        for key in map.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }

        self.by_id.insert(record.id.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by positional index
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Get a record by id
    pub fn by_id(&self, id: &RecordId) -> Option<&Record> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    /// Union of field names across all records, in first-seen order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records as a slice, in positional order
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Record ids in positional order
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
