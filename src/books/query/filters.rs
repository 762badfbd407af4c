//! Filter slots and their closed value sets
//!
//! Each slot maps a human-readable (Spanish) label to the token the volumes
//! API understands, and carries the field-scope prefix used when the value is
//! turned into a query clause.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title category (genre) filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Novel,
    ScienceFiction,
    History,
    Poetry,
    Biography,
    Essay,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Novel,
        Genre::ScienceFiction,
        Genre::History,
        Genre::Poetry,
        Genre::Biography,
        Genre::Essay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::Novel => "Novela",
            Genre::ScienceFiction => "Ciencia Ficción",
            Genre::History => "Historia",
            Genre::Poetry => "Poesía",
            Genre::Biography => "Biografía",
            Genre::Essay => "Ensayo",
        }
    }

    pub(crate) fn token(&self) -> &'static str {
        match self {
            Genre::Novel => "fiction",
            Genre::ScienceFiction => "science fiction",
            Genre::History => "history",
            Genre::Poetry => "poetry",
            Genre::Biography => "biography",
            Genre::Essay => "essay",
        }
    }
}

/// Author type filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorType {
    National,
    International,
    Contemporary,
    Classic,
}

impl AuthorType {
    pub const ALL: [AuthorType; 4] = [
        AuthorType::National,
        AuthorType::International,
        AuthorType::Contemporary,
        AuthorType::Classic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AuthorType::National => "Nacional",
            AuthorType::International => "Internacional",
            AuthorType::Contemporary => "Contemporáneo",
            AuthorType::Classic => "Clásico",
        }
    }

    pub(crate) fn token(&self) -> &'static str {
        match self {
            AuthorType::National => "national author",
            AuthorType::International => "international author",
            AuthorType::Contemporary => "contemporary author",
            AuthorType::Classic => "classic author",
        }
    }
}

/// Topic filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Education,
    Technology,
    Nature,
    Politics,
    Psychology,
    Art,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Education,
        Topic::Technology,
        Topic::Nature,
        Topic::Politics,
        Topic::Psychology,
        Topic::Art,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::Education => "Educación",
            Topic::Technology => "Tecnología",
            Topic::Nature => "Naturaleza",
            Topic::Politics => "Política",
            Topic::Psychology => "Psicología",
            Topic::Art => "Arte",
        }
    }

    pub(crate) fn token(&self) -> &'static str {
        match self {
            Topic::Education => "education",
            Topic::Technology => "technology",
            Topic::Nature => "nature",
            Topic::Politics => "politics",
            Topic::Psychology => "psychology",
            Topic::Art => "art",
        }
    }
}

/// Language filter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Spanish,
    English,
    French,
    German,
    Portuguese,
    Italian,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Spanish,
        Language::English,
        Language::French,
        Language::German,
        Language::Portuguese,
        Language::Italian,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Language::Spanish => "Español",
            Language::English => "Inglés",
            Language::French => "Francés",
            Language::German => "Alemán",
            Language::Portuguese => "Portugués",
            Language::Italian => "Italiano",
        }
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Portuguese => "pt",
            Language::Italian => "it",
        }
    }
}

/// The named facets a search can be narrowed by, in clause order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterSlot {
    Genre,
    Author,
    Topic,
    Language,
}

impl FilterSlot {
    /// Declared order; clauses are always emitted in this order
    pub const ORDER: [FilterSlot; 4] = [
        FilterSlot::Genre,
        FilterSlot::Author,
        FilterSlot::Topic,
        FilterSlot::Language,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterSlot::Genre => "titulo",
            FilterSlot::Author => "autor",
            FilterSlot::Topic => "tema",
            FilterSlot::Language => "idioma",
        }
    }
}

/// A value for exactly one slot
///
/// Pairing the slot with its own enumeration means a value that does not
/// belong to the slot cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterValue {
    Genre(Genre),
    Author(AuthorType),
    Topic(Topic),
    Language(Language),
}

impl FilterValue {
    pub fn slot(&self) -> FilterSlot {
        match self {
            FilterValue::Genre(_) => FilterSlot::Genre,
            FilterValue::Author(_) => FilterSlot::Author,
            FilterValue::Topic(_) => FilterSlot::Topic,
            FilterValue::Language(_) => FilterSlot::Language,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterValue::Genre(v) => v.label(),
            FilterValue::Author(v) => v.label(),
            FilterValue::Topic(v) => v.label(),
            FilterValue::Language(v) => v.label(),
        }
    }

    /// Look up a value by its display label within `slot`
    pub fn from_label(slot: FilterSlot, label: &str) -> Option<FilterValue> {
        match slot {
            FilterSlot::Genre => Genre::ALL
                .into_iter()
                .find(|v| v.label() == label)
                .map(FilterValue::Genre),
            FilterSlot::Author => AuthorType::ALL
                .into_iter()
                .find(|v| v.label() == label)
                .map(FilterValue::Author),
            FilterSlot::Topic => Topic::ALL
                .into_iter()
                .find(|v| v.label() == label)
                .map(FilterValue::Topic),
            FilterSlot::Language => Language::ALL
                .into_iter()
                .find(|v| v.label() == label)
                .map(FilterValue::Language),
        }
    }

    /// Scoped query clause for this value
    pub(crate) fn to_clause(&self) -> String {
        match self {
            FilterValue::Genre(v) => format!("subject:\"{}\"", v.token()),
            FilterValue::Author(v) => format!("inauthor:\"{}\"", v.token()),
            FilterValue::Topic(v) => format!("subject:\"{}\"", v.token()),
            FilterValue::Language(v) => format!("langrestrict:{}", v.code()),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.slot().name(), self.label())
    }
}

/// One optional value per slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub genre: Option<Genre>,
    pub author: Option<AuthorType>,
    pub topic: Option<Topic>,
    pub language: Option<Language>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: FilterSlot) -> Option<FilterValue> {
        match slot {
            FilterSlot::Genre => self.genre.map(FilterValue::Genre),
            FilterSlot::Author => self.author.map(FilterValue::Author),
            FilterSlot::Topic => self.topic.map(FilterValue::Topic),
            FilterSlot::Language => self.language.map(FilterValue::Language),
        }
    }

    /// Put `value` in its slot, replacing whatever was there
    pub fn set(&mut self, value: FilterValue) {
        match value {
            FilterValue::Genre(v) => self.genre = Some(v),
            FilterValue::Author(v) => self.author = Some(v),
            FilterValue::Topic(v) => self.topic = Some(v),
            FilterValue::Language(v) => self.language = Some(v),
        }
    }

    pub fn clear_slot(&mut self, slot: FilterSlot) {
        match slot {
            FilterSlot::Genre => self.genre = None,
            FilterSlot::Author => self.author = None,
            FilterSlot::Topic => self.topic = None,
            FilterSlot::Language => self.language = None,
        }
    }

    /// Select `value`, or deselect it when it is already the slot's value
    ///
    /// Returns `true` when the value ended up selected.
    pub fn toggle(&mut self, value: FilterValue) -> bool {
        let slot = value.slot();
        if self.get(slot) == Some(value) {
            self.clear_slot(slot);
            false
        } else {
            self.set(value);
            true
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// Active values in declared slot order
    pub fn active(&self) -> impl Iterator<Item = FilterValue> + '_ {
        FilterSlot::ORDER.into_iter().filter_map(|slot| self.get(slot))
    }
}
