//! Query construction for the volumes API
//!
//! A [`SearchRequest`] holds what the user typed and selected. It resolves
//! into a [`VolumeQuery`], which is what actually goes over the wire.

pub mod browse;
pub mod builder;
pub mod filters;

pub use browse::{browse_queries, random_browse_query};
pub use builder::{
    CLAUSE_SEPARATOR, DEFAULT_BROWSE_TERM, OrderBy, PAGE_SIZE, SearchRequest, VolumeQuery,
};
pub use filters::{AuthorType, FilterSlot, FilterValue, Genre, Language, SearchFilters, Topic};
