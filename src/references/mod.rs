//! Saved references (bookmarked books with tags)

pub mod models;
pub mod service;

pub use models::{Owner, ReferenceDraft, SavedReference};
pub use service::{REFERENCES_COLLECTION, ReferenceService};
