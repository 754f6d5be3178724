//! In-memory resource adapter.
//!
//! Records live in ordered per-resource collections behind a mutex. Ids are
//! assigned from a per-resource counter that never reuses a value, mirroring
//! what a small JSON REST server does.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::RecordId;
use crate::domain::ports::{Resource, ResourceApi, ResourceApiError};

/// Errors raised while loading a seed document.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("failed to read seed file {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The seed document is not valid JSON.
    #[error("seed document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The seed document has the wrong shape.
    #[error("seed document is malformed: {0}")]
    Shape(String),
}

#[derive(Debug, Default)]
struct Collection {
    records: Vec<Map<String, Value>>,
    next_id: i64,
}

impl Collection {
    fn position(&self, id: RecordId) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.get("id").and_then(RecordId::from_value) == Some(id))
    }

    fn allocate(&mut self) -> Option<RecordId> {
        self.next_id = self.next_id.checked_add(1)?;
        Some(RecordId::new(self.next_id))
    }

    /// Stores `record`, returning `None` once the id counter is exhausted.
    fn insert(&mut self, mut record: Map<String, Value>) -> Option<Map<String, Value>> {
        let id = match record.get("id").and_then(RecordId::from_value) {
            Some(id) if self.position(id).is_none() => id,
            _ => self.allocate()?,
        };
        self.next_id = self.next_id.max(id.get());
        record.insert("id".to_owned(), id.to_value());
        self.records.push(record.clone());
        Some(record)
    }
}

/// Resource adapter holding every collection in process memory.
#[derive(Debug, Default)]
pub struct InMemoryResourceApi {
    collections: Mutex<BTreeMap<Resource, Collection>>,
}

impl InMemoryResourceApi {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from a document shaped like
    /// `{ "user": [...], "city": [...], "group": [...] }`.
    ///
    /// Missing collections start empty; records without an id get one.
    ///
    /// # Errors
    /// Returns [`SeedError::Shape`] when the document or one of its
    /// collections has the wrong shape.
    pub fn from_seed(seed: &Value) -> Result<Self, SeedError> {
        let root = seed
            .as_object()
            .ok_or_else(|| SeedError::Shape("seed document must be an object".to_owned()))?;
        let mut collections = BTreeMap::new();
        for resource in Resource::ALL {
            let mut collection = Collection::default();
            match root.get(resource.name()) {
                None => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        let record = item.as_object().cloned().ok_or_else(|| {
                            SeedError::Shape(format!("{resource} entries must be objects"))
                        })?;
                        collection.insert(record).ok_or_else(|| {
                            SeedError::Shape(format!("{resource} ids are exhausted"))
                        })?;
                    }
                }
                Some(_) => {
                    return Err(SeedError::Shape(format!("{resource} must be an array")));
                }
            }
            debug!(%resource, records = collection.records.len(), "seeded collection");
            collections.insert(resource, collection);
        }
        Ok(Self {
            collections: Mutex::new(collections),
        })
    }

    /// Store seeded from a JSON file read through `cap_std`.
    ///
    /// # Errors
    /// Returns a [`SeedError`] when the file cannot be read or parsed.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let text = read_seed(path).map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let seed: Value = serde_json::from_str(&text)?;
        Self::from_seed(&seed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<Resource, Collection>>, ResourceApiError> {
        self.collections
            .lock()
            .map_err(|_| ResourceApiError::transport("in-memory store poisoned"))
    }
}

fn read_seed(path: &Path) -> io::Result<String> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "seed path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read_to_string(Path::new(file_name))
}

fn as_record(resource: Resource, body: Value) -> Result<Map<String, Value>, ResourceApiError> {
    match body {
        Value::Object(record) => Ok(record),
        _ => Err(ResourceApiError::rejected(format!(
            "{resource} body must be a JSON object"
        ))),
    }
}

#[async_trait]
impl ResourceApi for InMemoryResourceApi {
    async fn get_all(&self, resource: Resource) -> Result<Value, ResourceApiError> {
        let collections = self.lock()?;
        let records = collections
            .get(&resource)
            .map(|collection| {
                collection
                    .records
                    .iter()
                    .cloned()
                    .map(Value::Object)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Value::Array(records))
    }

    async fn post(&self, resource: Resource, body: Value) -> Result<Value, ResourceApiError> {
        let mut record = as_record(resource, body)?;
        // The store owns id assignment on create.
        record.remove("id");
        let mut collections = self.lock()?;
        let stored = collections
            .entry(resource)
            .or_default()
            .insert(record)
            .ok_or_else(|| ResourceApiError::rejected(format!("{resource} ids are exhausted")))?;
        debug!(%resource, id = ?stored.get("id"), "record created");
        Ok(Value::Object(stored))
    }

    async fn put(
        &self,
        resource: Resource,
        id: RecordId,
        body: Value,
    ) -> Result<Value, ResourceApiError> {
        let mut record = as_record(resource, body)?;
        record.insert("id".to_owned(), id.to_value());
        let mut collections = self.lock()?;
        let collection = collections.entry(resource).or_default();
        let index = collection
            .position(id)
            .ok_or_else(|| ResourceApiError::not_found(format!("{resource}/{id}")))?;
        if let Some(slot) = collection.records.get_mut(index) {
            slot.clone_from(&record);
        }
        Ok(Value::Object(record))
    }

    async fn delete(&self, resource: Resource, id: RecordId) -> Result<Value, ResourceApiError> {
        let mut collections = self.lock()?;
        let collection = collections.entry(resource).or_default();
        let index = collection
            .position(id)
            .ok_or_else(|| ResourceApiError::not_found(format!("{resource}/{id}")))?;
        collection.records.remove(index);
        debug!(%resource, %id, "record deleted");
        Ok(Value::Object(Map::new()))
    }
}
