use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use super::{BlobListing, BlobMetadata, BlobStore, Document, DocumentStore, FieldFilter};
use crate::error::{BookshelfError, Result};

const GENERATED_ID_LEN: usize = 20;

type Collections = HashMap<String, Vec<Document>>;

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

/// In-process document store
///
/// Documents keep insertion order within a collection. Clones share the same
/// data.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    revision: Arc<watch::Sender<u64>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            revision: Arc::new(revision),
        }
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn snapshot(
        collections: &RwLock<Collections>,
        collection: &str,
        filter: &FieldFilter,
    ) -> Vec<Document> {
        collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LEN)
        .map(char::from)
        .collect()
}

fn as_object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(BookshelfError::Store {
            message: format!("document body must be an object, got {}", other),
        }),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, data: Value) -> Result<String> {
        let data = Value::Object(as_object(data)?);
        let id = generate_id();

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        self.bump();

        debug!(collection, id = %id, "Document added");
        Ok(id)
    }

    async fn set_merge(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        let fields = as_object(data)?;

        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();

            match docs.iter_mut().find(|doc| doc.id == id) {
                Some(doc) => {
                    if let Value::Object(existing) = &mut doc.data {
                        existing.extend(fields);
                    } else {
                        doc.data = Value::Object(fields);
                    }
                }
                None => docs.push(Document {
                    id: id.to_string(),
                    data: Value::Object(fields),
                }),
            }
        }
        self.bump();

        debug!(collection, id, "Document merged");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn query(&self, collection: &str, filter: &FieldFilter) -> Result<Vec<Document>> {
        Ok(Self::snapshot(&self.collections, collection, filter).await)
    }

    fn watch(
        &self,
        collection: &str,
        filter: FieldFilter,
    ) -> BoxStream<'static, Result<Vec<Document>>> {
        let collections = Arc::clone(&self.collections);
        let collection = collection.to_string();
        let receiver = self.revision.subscribe();

        stream::unfold(
            (receiver, None::<Vec<Document>>),
            move |(mut receiver, last)| {
                let collections = Arc::clone(&collections);
                let collection = collection.clone();
                let filter = filter.clone();

                async move {
                    if last.is_some() {
                        loop {
                            // Sender dropped with the store: subscription ends
                            receiver.changed().await.ok()?;
                            let snapshot =
                                Self::snapshot(&collections, &collection, &filter).await;
                            if last.as_ref() != Some(&snapshot) {
                                return Some((Ok(snapshot.clone()), (receiver, Some(snapshot))));
                            }
                        }
                    }

                    receiver.borrow_and_update();
                    let snapshot = Self::snapshot(&collections, &collection, &filter).await;
                    Some((Ok(snapshot.clone()), (receiver, Some(snapshot))))
                }
            },
        )
        .boxed()
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let removed = {
            let mut collections = self.collections.write().await;
            match collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|doc| doc.id != id);
                    before != docs.len()
                }
                None => false,
            }
        };

        if removed {
            self.bump();
            debug!(collection, id, "Document deleted");
        } else {
            debug!(collection, id, "Delete of missing document ignored");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Blob {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// In-process blob store with folder-style listing
#[derive(Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<BTreeMap<String, Blob>>>,
    url_base: String,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_url_base("memory://blobs")
    }

    /// Download URLs are `{url_base}/{percent-encoded path}`
    pub fn with_url_base<S: Into<String>>(url_base: S) -> Self {
        Self {
            blobs: Arc::new(RwLock::new(BTreeMap::new())),
            url_base: url_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Raw bytes of an object, if present
    pub async fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|blob| blob.bytes.clone())
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobMetadata> {
        let path = validate_path(path)?;

        self.blobs.write().await.insert(
            path.to_string(),
            Blob {
                bytes: bytes.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );

        info!(path, size = bytes.len(), "Object uploaded");
        Ok(BlobMetadata {
            path: path.to_string(),
            size: bytes.len(),
            content_type: content_type.map(str::to_string),
        })
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_path(path: &str) -> Result<&str> {
    let path = path.trim_start_matches('/');
    if path.is_empty() || path.ends_with('/') {
        return Err(BookshelfError::Store {
            message: format!("invalid object path '{}'", path),
        });
    }
    Ok(path)
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload_text(&self, path: &str, text: &str) -> Result<BlobMetadata> {
        self.put(path, text.as_bytes(), Some("text/plain")).await
    }

    async fn upload_bytes(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<BlobMetadata> {
        self.put(path, bytes, content_type).await
    }

    async fn list(&self, prefix: &str) -> Result<BlobListing> {
        let mut prefix = prefix.trim_start_matches('/').to_string();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }

        let blobs = self.blobs.read().await;
        let mut listing = BlobListing::default();

        for path in blobs.keys().filter(|path| path.starts_with(&prefix)) {
            let rest = &path[prefix.len()..];
            match rest.split_once('/') {
                Some((folder, _)) => {
                    let folder = format!("{}{}/", prefix, folder);
                    if listing.prefixes.last() != Some(&folder) {
                        listing.prefixes.push(folder);
                    }
                }
                None => listing.items.push(path.clone()),
            }
        }

        debug!(
            prefix = %prefix,
            items = listing.items.len(),
            prefixes = listing.prefixes.len(),
            "Listed objects"
        );
        Ok(listing)
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let path = validate_path(path)?;
        if !self.blobs.read().await.contains_key(path) {
            return Err(BookshelfError::Store {
                message: format!("object not found: {}", path),
            });
        }
        Ok(format!("{}/{}", self.url_base, urlencoding::encode(path)))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let path = validate_path(path)?;
        match self.blobs.write().await.remove(path) {
            Some(_) => {
                info!(path, "Object deleted");
                Ok(())
            }
            None => Err(BookshelfError::Store {
                message: format!("object not found: {}", path),
            }),
        }
    }
}
