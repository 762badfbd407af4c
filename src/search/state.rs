//! Result page state owned by a [`SearchController`](super::SearchController)

use std::collections::HashSet;

use crate::books::{PAGE_SIZE, Volume, VolumesPage};

/// Where the controller is in its request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Loaded {
        empty: bool,
    },
    Failed,
}

/// Accumulated results plus the flags a screen renders from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageState {
    /// Volumes in arrival order, unique by id
    pub items: Vec<Volume>,
    /// Total-count hint from the last response
    pub total_items: u32,
    /// Start offset of the most recently requested page
    pub cursor: u32,
    pub loading: bool,
    /// `true` for a user search, `false` for the default browse results
    pub search_mode: bool,
    pub no_results: bool,
    pub phase: Phase,
}

impl PageState {
    /// Whether `load_more` would issue a request
    pub fn has_more(&self) -> bool {
        self.phase == Phase::Loaded { empty: false } && (self.items.len() as u32) < self.total_items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|volume| volume.id == id)
    }

    pub(crate) fn reset(&mut self, search_mode: bool) {
        *self = PageState {
            loading: true,
            search_mode,
            phase: Phase::Loading,
            ..PageState::default()
        };
    }

    /// Replace the results with a first page
    pub(crate) fn apply_first_page(&mut self, page: VolumesPage) {
        self.items.clear();
        append_unique(&mut self.items, page.items);
        self.total_items = page.total_items;
        self.cursor = 0;
        self.loading = false;
        self.no_results = self.items.is_empty();
        self.phase = Phase::Loaded {
            empty: self.items.is_empty(),
        };
    }

    /// Add a continuation page, skipping ids already present
    ///
    /// An empty continuation page means the catalog has nothing further,
    /// whatever its count hint says, so the total is clamped to what we hold.
    pub(crate) fn append_page(&mut self, page: VolumesPage) -> usize {
        let exhausted = page.items.is_empty();
        let added = append_unique(&mut self.items, page.items);

        self.total_items = if exhausted {
            self.items.len() as u32
        } else {
            page.total_items
        };
        self.loading = false;
        self.phase = Phase::Loaded {
            empty: self.items.is_empty(),
        };
        added
    }

    pub(crate) fn begin_continuation(&mut self) -> u32 {
        self.cursor += PAGE_SIZE;
        self.loading = true;
        self.phase = Phase::Loading;
        self.cursor
    }

    /// Undo `begin_continuation` after a failed request, keeping the results
    pub(crate) fn abort_continuation(&mut self) {
        self.cursor = self.cursor.saturating_sub(PAGE_SIZE);
        self.loading = false;
        self.phase = Phase::Loaded {
            empty: self.items.is_empty(),
        };
    }

    pub(crate) fn fail(&mut self) {
        self.loading = false;
        self.no_results = true;
        self.phase = Phase::Failed;
    }
}

/// Append volumes whose id is not yet in `items`, preserving arrival order
fn append_unique(items: &mut Vec<Volume>, incoming: Vec<Volume>) -> usize {
    let mut seen: HashSet<String> = items.iter().map(|volume| volume.id.clone()).collect();
    let before = items.len();

    for volume in incoming {
        if seen.insert(volume.id.clone()) {
            items.push(volume);
        }
    }

    items.len() - before
}
