use std::sync::Arc;

use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use tracing::{debug, info, instrument, warn};

use super::models::{OWNER_UID_FIELD, Owner, ReferenceDraft, SavedReference, TAGS_FIELD};
use crate::auth::{Session, User};
use crate::error::{BookshelfError, Result};
use crate::notice::{LogNotifier, Notice, Notifier, messages};
use crate::store::{Document, DocumentStore, FieldFilter};

/// Collection holding saved references
pub const REFERENCES_COLLECTION: &str = "referencias";

/// Owner-scoped access to saved references
///
/// Every read is filtered to the uid of the current session.
pub struct ReferenceService {
    store: Arc<dyn DocumentStore>,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn DocumentStore>, session: Session) -> Self {
        Self {
            store,
            session,
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Save `draft` for the signed-in user
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn add(&self, draft: ReferenceDraft) -> Result<SavedReference> {
        let Some(user) = self.session.current() else {
            warn!("Save attempted without a session");
            self.notifier.notify(Notice::error(messages::LOGIN_REQUIRED));
            return Err(BookshelfError::NotAuthenticated);
        };

        let mut reference = draft.stamp(Owner::from(&user), Utc::now());
        let result = match serde_json::to_value(&reference) {
            Ok(body) => self.store.add(REFERENCES_COLLECTION, body).await,
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(id) => {
                info!(id = %id, "Reference saved");
                reference.id = Some(id);
                self.notifier
                    .notify(Notice::success(messages::REFERENCE_SAVED));
                Ok(reference)
            }
            Err(err) => {
                warn!("Failed to save reference: {}", err);
                self.notifier
                    .notify(Notice::error(messages::REFERENCE_SAVE_FAILED));
                Err(err)
            }
        }
    }

    /// References saved by the signed-in user, in store order
    #[instrument(skip(self))]
    pub async fn list_for_current_user(&self) -> Result<Vec<SavedReference>> {
        let filter = owner_filter(&self.require_user()?);
        let docs = self.store.query(REFERENCES_COLLECTION, &filter).await?;
        debug!(count = docs.len(), "Listed references");
        decode_all(docs)
    }

    /// The signed-in user's references carrying `tag`
    #[instrument(skip(self))]
    pub async fn list_with_tag(&self, tag: &str) -> Result<Vec<SavedReference>> {
        let filter =
            owner_filter(&self.require_user()?).and(FieldFilter::array_contains(TAGS_FIELD, tag));
        let docs = self.store.query(REFERENCES_COLLECTION, &filter).await?;
        debug!(count = docs.len(), "Listed tagged references");
        decode_all(docs)
    }

    /// Live list of the signed-in user's references
    ///
    /// Yields the current list first and then the full list after every
    /// change. Dropping the stream ends the subscription.
    pub fn watch_for_current_user(
        &self,
    ) -> Result<BoxStream<'static, Result<Vec<SavedReference>>>> {
        let filter = owner_filter(&self.require_user()?);
        Ok(self
            .store
            .watch(REFERENCES_COLLECTION, filter)
            .map(|snapshot| snapshot.and_then(decode_all))
            .boxed())
    }

    /// Delete a reference by its store id
    ///
    /// A missing or blank id is rejected before the store is touched.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Option<&str>) -> Result<()> {
        let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) else {
            warn!("Delete attempted without a reference id");
            let err = BookshelfError::MissingReferenceId;
            self.notifier.notify(Notice::error(err.user_message()));
            return Err(err);
        };

        match self.store.delete(REFERENCES_COLLECTION, id).await {
            Ok(()) => {
                info!(id, "Reference deleted");
                self.notifier
                    .notify(Notice::success(messages::REFERENCE_DELETED));
                Ok(())
            }
            Err(err) => {
                warn!(id, "Failed to delete reference: {}", err);
                self.notifier
                    .notify(Notice::error(messages::REFERENCE_DELETE_FAILED));
                Err(err)
            }
        }
    }

    fn require_user(&self) -> Result<User> {
        self.session.current().ok_or(BookshelfError::NotAuthenticated)
    }
}

fn owner_filter(user: &User) -> FieldFilter {
    FieldFilter::equals(OWNER_UID_FIELD, &user.uid)
}

fn decode_all(docs: Vec<Document>) -> Result<Vec<SavedReference>> {
    docs.into_iter()
        .map(|doc| {
            let mut reference: SavedReference = doc.decode()?;
            reference.id = Some(doc.id);
            Ok(reference)
        })
        .collect()
}
