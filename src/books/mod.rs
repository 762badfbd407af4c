//! Google Books volumes API client
//!
//! This module provides the HTTP client, the response models, and the query
//! builder that turns search terms and filter selections into volume queries.

pub mod client;
pub mod models;
pub mod query;
pub(crate) mod responses;
pub mod source;

// Re-export public types
pub use client::BooksClient;
pub use models::{ImageLinks, Volume, VolumeInfo, VolumesPage};
pub use query::{
    AuthorType, FilterSlot, FilterValue, Genre, Language, OrderBy, PAGE_SIZE, SearchFilters,
    SearchRequest, Topic, VolumeQuery,
};
pub use source::VolumeSource;
