//! Document and blob store interfaces
//!
//! The managed database and blob storage are only reached through these
//! traits. [`memory`] has in-process implementations with the same
//! observable behavior, used for local development and tests.

pub mod memory;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

pub use memory::{MemoryBlobStore, MemoryDocumentStore};

/// A stored document: its id plus a JSON object body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Deserialize the body into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }

    /// Value at a dotted field path such as `owner.uid`
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup(&self.data, path)
    }
}

/// Equality-style filters the managed database supports
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    /// Every document
    All,
    /// Field at `field` equals `value`
    Equals { field: String, value: Value },
    /// Array field at `field` contains `value`
    ArrayContains { field: String, value: Value },
    /// Every inner filter matches
    And(Vec<FieldFilter>),
}

impl FieldFilter {
    pub fn equals<F: Into<String>, V: Serialize>(field: F, value: V) -> Self {
        FieldFilter::Equals {
            field: field.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    pub fn array_contains<F: Into<String>, V: Serialize>(field: F, value: V) -> Self {
        FieldFilter::ArrayContains {
            field: field.into(),
            value: serde_json::to_value(value).unwrap_or(Value::Null),
        }
    }

    pub fn and(self, other: FieldFilter) -> Self {
        match self {
            FieldFilter::All => other,
            FieldFilter::And(mut filters) => {
                filters.push(other);
                FieldFilter::And(filters)
            }
            first => FieldFilter::And(vec![first, other]),
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        match self {
            FieldFilter::All => true,
            FieldFilter::Equals { field, value } => lookup(data, field) == Some(value),
            FieldFilter::ArrayContains { field, value } => lookup(data, field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
            FieldFilter::And(filters) => filters.iter().all(|filter| filter.matches(data)),
        }
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.get(segment))
}

/// Managed document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document with a generated id and return the id
    async fn add(&self, collection: &str, data: Value) -> Result<String>;

    /// Create or update a document, merging top-level fields into any
    /// existing body
    async fn set_merge(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn query(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<Document>>;

    /// Live result set for `filter`
    ///
    /// Nothing happens until the stream is polled. The first snapshot comes
    /// right away, then a new full snapshot whenever the matching set changes.
    /// Each call starts an independent subscription.
    fn watch(
        &self,
        collection: &str,
        filter: FieldFilter,
    ) -> BoxStream<'static, Result<Vec<Document>>>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Metadata returned after an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetadata {
    pub path: String,
    pub size: usize,
    pub content_type: Option<String>,
}

/// Direct children under a prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobListing {
    /// Full paths of objects directly under the prefix
    pub items: Vec<String>,
    /// Full paths of sub-folders, each ending in `/`
    pub prefixes: Vec<String>,
}

impl BlobListing {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.prefixes.is_empty()
    }
}

/// Managed blob storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload_text(&self, path: &str, text: &str) -> Result<BlobMetadata>;

    async fn upload_bytes(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobMetadata>;

    async fn list(&self, prefix: &str) -> Result<BlobListing>;

    async fn download_url(&self, path: &str) -> Result<String>;

    async fn delete(&self, path: &str) -> Result<()>;
}
