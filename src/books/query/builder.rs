//! Search request builder and the resolved volume query

use serde::{Deserialize, Serialize};

use super::filters::{FilterValue, Language, SearchFilters};

/// Fixed number of results requested per page
pub const PAGE_SIZE: u32 = 10;

/// Separator placed between query clauses
pub const CLAUSE_SEPARATOR: &str = "+";

/// Term used when a request produces no clauses at all
pub const DEFAULT_BROWSE_TERM: &str = "best books 2024";

/// Sort order accepted by the volumes API `orderBy` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Relevance,
    Newest,
}

impl OrderBy {
    pub fn as_api_param(&self) -> &'static str {
        match self {
            OrderBy::Relevance => "relevance",
            OrderBy::Newest => "newest",
        }
    }
}

/// Free-text term plus filter selections, as entered by the user
///
/// # Example
///
/// ```
/// use bookshelf_client::books::{AuthorType, FilterValue, SearchRequest};
///
/// let request = SearchRequest::new()
///     .term("dune")
///     .filter(FilterValue::Author(AuthorType::Classic));
///
/// assert_eq!(
///     request.clauses(),
///     vec!["dune".to_string(), "inauthor:\"classic author\"".to_string()]
/// );
/// assert_eq!(request.build(), "dune+inauthor:\"classic author\"");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term<S: Into<String>>(mut self, term: S) -> Self {
        self.term = term.into();
        self
    }

    /// Select a filter value, replacing any previous value in its slot
    pub fn filter(mut self, value: FilterValue) -> Self {
        self.filters.set(value);
        self
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn trimmed_term(&self) -> &str {
        self.term.trim()
    }

    /// True when there is a non-blank term or at least one active filter
    pub fn has_criteria(&self) -> bool {
        !self.trimmed_term().is_empty() || !self.filters.is_empty()
    }

    /// Query clauses: the term first, then one clause per active filter in
    /// declared slot order
    pub fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();

        let term = self.trimmed_term();
        if !term.is_empty() {
            clauses.push(term.to_string());
        }

        clauses.extend(self.filters.active().map(|value| value.to_clause()));
        clauses
    }

    /// Build the `q` parameter, substituting the default term when there are
    /// no clauses
    pub fn build(&self) -> String {
        let clauses = self.clauses();
        if clauses.is_empty() {
            DEFAULT_BROWSE_TERM.to_string()
        } else {
            clauses.join(CLAUSE_SEPARATOR)
        }
    }

    /// Resolve into the first page of a volume query
    pub fn to_volume_query(&self, order_by: Option<OrderBy>) -> VolumeQuery {
        VolumeQuery {
            q: self.build(),
            start_index: 0,
            max_results: PAGE_SIZE,
            order_by,
            lang_restrict: self.filters.language.map(|lang: Language| lang.code()),
        }
    }
}

/// A fully resolved request against the volumes endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeQuery {
    pub q: String,
    pub start_index: u32,
    pub max_results: u32,
    pub order_by: Option<OrderBy>,
    pub lang_restrict: Option<&'static str>,
}

impl VolumeQuery {
    pub fn new<S: Into<String>>(q: S) -> Self {
        Self {
            q: q.into(),
            start_index: 0,
            max_results: PAGE_SIZE,
            order_by: None,
            lang_restrict: None,
        }
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn start_index(mut self, start_index: u32) -> Self {
        self.start_index = start_index;
        self
    }

    /// The same query positioned at `start_index`
    pub fn at(&self, start_index: u32) -> Self {
        Self {
            start_index,
            ..self.clone()
        }
    }
}
