use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use crate::books::query::random_browse_query;
use crate::books::{FilterValue, OrderBy, SearchRequest, VolumeQuery, VolumeSource};
use crate::config::{ClientConfig, EmptySearchPolicy};
use crate::error::BookshelfError;
use crate::notice::{LogNotifier, Notice, Notifier, messages};
use crate::search::state::PageState;

/// Result of a search-type operation
#[derive(Debug)]
pub enum SearchOutcome {
    /// A page with at least one volume was applied
    Loaded { count: usize, total_items: u32 },
    /// The request succeeded but matched nothing
    Empty,
    /// The request failed; state was marked accordingly
    Failed(BookshelfError),
    /// No term and no filter, and the policy is to prompt
    NothingToSearch,
}

/// Result of [`SearchController::load_more`]
///
/// Returning at all is the page-complete signal, whichever variant it is.
#[derive(Debug)]
pub enum LoadMoreOutcome {
    /// A continuation page was merged; the count excludes duplicates
    Appended(usize),
    /// Everything available is already loaded, or no results to continue
    NothingMore,
    Failed(BookshelfError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

struct Inner {
    request: SearchRequest,
    state: PageState,
    /// Query behind the results currently held; continuations reuse it
    active: Option<VolumeQuery>,
}

/// Search-and-paginate controller for one results screen
///
/// Methods take `&self`, so overlapping calls are possible. The state lock
/// is never held across a request. Each response is applied as it arrives,
/// so when two searches overlap, the one that finishes last wins.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use bookshelf_client::{BooksClient, ClientConfig, LoadMoreOutcome, SearchController};
/// use bookshelf_client::books::{FilterValue, Genre, SearchRequest};
///
/// #[tokio::main]
/// async fn main() {
///     let config = ClientConfig::new();
///     let client = Arc::new(BooksClient::with_config(config.clone()));
///     let controller = SearchController::new(client, &config);
///
///     controller.load_initial().await;
///     controller.search(SearchRequest::new().term("dune")).await;
///     controller.set_filter(FilterValue::Genre(Genre::ScienceFiction)).await;
///
///     // Stops once everything is loaded or a page fails
///     while let LoadMoreOutcome::Appended(_) = controller.load_more().await {}
///     println!("{} volumes", controller.state().items.len());
/// }
/// ```
pub struct SearchController {
    source: Arc<dyn VolumeSource>,
    notifier: Arc<dyn Notifier>,
    policy: EmptySearchPolicy,
    order_by: Option<OrderBy>,
    inner: Mutex<Inner>,
}

impl SearchController {
    pub fn new(source: Arc<dyn VolumeSource>, config: &ClientConfig) -> Self {
        Self {
            source,
            notifier: Arc::new(LogNotifier),
            policy: config.empty_search_policy,
            order_by: config.order_by,
            inner: Mutex::new(Inner {
                request: SearchRequest::new(),
                state: PageState::default(),
                active: None,
            }),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Snapshot of the current page state
    pub fn state(&self) -> PageState {
        self.lock().state.clone()
    }

    /// The term and filters the controller currently holds
    pub fn request(&self) -> SearchRequest {
        self.lock().request.clone()
    }

    pub fn policy(&self) -> EmptySearchPolicy {
        self.policy
    }

    /// Update the term without searching
    pub fn set_term<S: Into<String>>(&self, term: S) {
        self.lock().request.term = term.into();
    }

    /// Default browse load, used when the screen opens
    #[instrument(skip(self))]
    pub async fn load_initial(&self) -> SearchOutcome {
        self.run_first_page(random_browse_query(), Mode::Browse).await
    }

    /// Run a fresh search for `request`
    ///
    /// A request with neither a term nor a filter follows the configured
    /// [`EmptySearchPolicy`].
    #[instrument(skip(self, request), fields(term = %request.term))]
    pub async fn search(&self, request: SearchRequest) -> SearchOutcome {
        let has_criteria = request.has_criteria();
        let query = request.to_volume_query(self.order_by);
        self.lock().request = request;

        if !has_criteria {
            return match self.policy {
                EmptySearchPolicy::Fallback => {
                    debug!("Empty search, falling back to browse results");
                    self.run_first_page(random_browse_query(), Mode::Browse).await
                }
                EmptySearchPolicy::Prompt => {
                    debug!("Empty search, prompting for a term");
                    self.notifier.notify(Notice::info(messages::ENTER_SEARCH));
                    SearchOutcome::NothingToSearch
                }
            };
        }

        self.run_first_page(query, Mode::Search).await
    }

    /// Toggle a filter value and search again
    ///
    /// Selecting the value a slot already holds clears that slot.
    #[instrument(skip(self), fields(filter = %value))]
    pub async fn set_filter(&self, value: FilterValue) -> SearchOutcome {
        let request = {
            let mut inner = self.lock();
            inner.request.filters.toggle(value);
            inner.request.clone()
        };
        self.search(request).await
    }

    /// Drop the term and all filters, then show browse results
    #[instrument(skip(self))]
    pub async fn clear_filters(&self) -> SearchOutcome {
        self.lock().request = SearchRequest::new();
        self.run_first_page(random_browse_query(), Mode::Browse).await
    }

    /// Fetch the next page of the current results and merge it
    ///
    /// Only does anything when the last load produced results and fewer are
    /// held than the total reported. Volumes already held are skipped.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> LoadMoreOutcome {
        let query = {
            let mut inner = self.lock();
            if !inner.state.has_more() {
                debug!(
                    held = inner.state.items.len(),
                    total_items = inner.state.total_items,
                    "Nothing more to load"
                );
                return LoadMoreOutcome::NothingMore;
            }
            let Some(active) = inner.active.clone() else {
                return LoadMoreOutcome::NothingMore;
            };
            let cursor = inner.state.begin_continuation();
            active.at(cursor)
        };

        let result = self.source.search(&query).await;

        let mut inner = self.lock();
        match result {
            Ok(page) => {
                let added = inner.state.append_page(page);
                info!(
                    added,
                    held = inner.state.items.len(),
                    "Continuation page merged"
                );
                LoadMoreOutcome::Appended(added)
            }
            Err(err) => {
                warn!("Continuation request failed: {}", err);
                inner.state.abort_continuation();
                drop(inner);
                self.notifier.notify(Notice::error(messages::LOAD_MORE_FAILED));
                LoadMoreOutcome::Failed(err)
            }
        }
    }

    async fn run_first_page(&self, query: VolumeQuery, mode: Mode) -> SearchOutcome {
        self.lock().state.reset(mode == Mode::Search);

        let result = self.source.search(&query).await;

        let mut inner = self.lock();
        match result {
            Ok(page) => {
                inner.active = Some(query);
                inner.state.apply_first_page(page);

                let count = inner.state.items.len();
                let total_items = inner.state.total_items;
                drop(inner);

                if count == 0 {
                    info!("No volumes found");
                    self.notifier.notify(Notice::info(messages::NO_BOOKS_FOUND));
                    SearchOutcome::Empty
                } else {
                    info!(count, total_items, "Results loaded");
                    SearchOutcome::Loaded { count, total_items }
                }
            }
            Err(err) => {
                warn!("Search request failed: {}", err);
                inner.active = None;
                inner.state.fail();
                drop(inner);

                let message = match mode {
                    Mode::Browse => messages::LOAD_FAILED,
                    Mode::Search => messages::SEARCH_FAILED,
                };
                self.notifier.notify(Notice::error(message));
                SearchOutcome::Failed(err)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
