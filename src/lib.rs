//! # Bookshelf Client
//!
//! Client-side core of a book catalog app. Users search the Google Books
//! catalog, bookmark results as tagged references, and manage an account.
//! The crate drives the screens of such an app without depending on any GUI
//! framework.
//!
//! ## Features
//!
//! - **Catalog Search**: Typed client for the Google Books volumes API with a
//!   filter-aware query builder
//! - **Incremental Pagination**: A search controller that accumulates pages
//!   and drops duplicate volumes
//! - **Saved References**: Owner-scoped bookmarks stored in a document store
//! - **Accounts**: Email and Google sign-in on top of a pluggable provider
//! - **Async Support**: Built on tokio for async/await support
//!
//! ## Quick Start
//!
//! ### Searching the Catalog
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookshelf_client::{BooksClient, ClientConfig, SearchController};
//! use bookshelf_client::books::{AuthorType, FilterValue, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::new();
//!     let client = Arc::new(BooksClient::with_config(config.clone()));
//!     let controller = SearchController::new(client, &config);
//!
//!     let request = SearchRequest::new()
//!         .term("dune")
//!         .filter(FilterValue::Author(AuthorType::Classic));
//!     controller.search(request).await;
//!     controller.load_more().await;
//!
//!     for volume in controller.state().items {
//!         println!("{}", volume.volume_info.title);
//!     }
//! }
//! ```
//!
//! ### Saving a Reference
//!
//! ```no_run
//! use std::sync::Arc;
//! use bookshelf_client::{Bookshelf, ClientConfig, Session, User};
//! use bookshelf_client::store::MemoryDocumentStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::signed_in(User::new("uid-1"));
//!     let shelf = Bookshelf::new(
//!         ClientConfig::new(),
//!         Arc::new(MemoryDocumentStore::new()),
//!         session,
//!     );
//!
//!     let volume = shelf.books.fetch_volume("zyTCAlFPjgYC").await?;
//!     let saved = shelf.save_volume(&volume).await?;
//!     println!("Saved with tags {:?}", saved.tags);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod books;
pub mod config;
pub mod error;
pub mod notice;
pub mod rate_limit;
pub mod references;
pub mod search;
pub mod store;

use std::sync::Arc;

// Re-export main types for convenience
pub use auth::{AuthErrorCode, AuthProvider, AuthService, Session, User};
pub use books::{BooksClient, Volume, VolumeSource};
pub use config::{ClientConfig, EmptySearchPolicy};
pub use error::{BookshelfError, Result};
pub use notice::{Notice, NoticeKind, Notifier};
pub use references::{ReferenceDraft, ReferenceService, SavedReference};
pub use search::{LoadMoreOutcome, PageState, Phase, SearchController, SearchOutcome};
pub use store::{BlobStore, DocumentStore};

/// Convenience handle wiring the catalog client and the reference service
/// to one session
pub struct Bookshelf {
    /// Catalog client
    pub books: Arc<BooksClient>,
    /// Saved references of the session's user
    pub references: ReferenceService,
    session: Session,
    config: ClientConfig,
    notifier: Arc<dyn Notifier>,
}

impl Bookshelf {
    /// Create a new handle
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use bookshelf_client::{Bookshelf, ClientConfig, Session};
    /// use bookshelf_client::store::MemoryDocumentStore;
    ///
    /// let shelf = Bookshelf::new(
    ///     ClientConfig::new(),
    ///     Arc::new(MemoryDocumentStore::new()),
    ///     Session::new(),
    /// );
    /// ```
    pub fn new(config: ClientConfig, documents: Arc<dyn DocumentStore>, session: Session) -> Self {
        Self {
            books: Arc::new(BooksClient::with_config(config.clone())),
            references: ReferenceService::new(documents, session.clone()),
            session,
            config,
            notifier: Arc::new(notice::LogNotifier),
        }
    }

    /// Route notices from the references and from new controllers to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.references = self.references.with_notifier(notifier.clone());
        self.notifier = notifier;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// A fresh search controller for one results screen
    pub fn search_controller(&self) -> SearchController {
        SearchController::new(self.books.clone(), &self.config)
            .with_notifier(self.notifier.clone())
    }

    /// Account service sharing this handle's session
    pub fn auth_service(
        &self,
        provider: Arc<dyn AuthProvider>,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> AuthService {
        AuthService::new(provider, documents, blobs, self.session.clone())
            .with_notifier(self.notifier.clone())
    }

    /// Bookmark a search result for the signed-in user
    ///
    /// # Errors
    ///
    /// * `BookshelfError::NotAuthenticated` - If nobody is signed in
    /// * `BookshelfError::Store` - If the document store rejects the write
    pub async fn save_volume(&self, volume: &Volume) -> Result<SavedReference> {
        self.references
            .add(ReferenceDraft::from_volume(volume))
            .await
    }
}
