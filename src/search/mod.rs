//! Incremental search and pagination
//!
//! [`SearchController`] turns user events (typing a term, toggling a filter,
//! scrolling to the end of the list) into volume queries and merges the
//! responses into a [`PageState`].

pub mod controller;
pub mod state;

pub use controller::{LoadMoreOutcome, SearchController, SearchOutcome};
pub use state::{PageState, Phase};
