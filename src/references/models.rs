use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::books::Volume;

pub const UNKNOWN_AUTHOR: &str = "Autor desconocido";
pub const UNCATEGORIZED_TAG: &str = "Sin categoría";
pub const NO_LANGUAGE_TAG: &str = "Sin idioma";

/// Identity of the account that saved a reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl From<&User> for Owner {
    fn from(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

/// A bookmarked book as stored in the `referencias` collection
///
/// Field names on the wire match the documents the app already stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReference {
    /// Store document id, known once persisted
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "autor")]
    pub author: String,
    #[serde(rename = "usuario")]
    pub owner: Owner,
    #[serde(rename = "fechaguardado")]
    pub saved_at: DateTime<Utc>,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
}

/// Field path of the owner uid inside a stored reference
pub(crate) const OWNER_UID_FIELD: &str = "usuario.uid";
pub(crate) const TAGS_FIELD: &str = "etiquetas";

/// The user-provided part of a reference, before owner and time are stamped
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceDraft {
    pub title: String,
    pub author: String,
    pub tags: Vec<String>,
}

impl ReferenceDraft {
    pub fn new<T: Into<String>, A: Into<String>>(title: T, author: A) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Draft for a search result
    ///
    /// Tags are the volume's categories followed by its language, with
    /// placeholders when either is missing.
    pub fn from_volume(volume: &Volume) -> Self {
        let info = &volume.volume_info;

        let author = if info.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            info.authors.join(", ")
        };

        let mut tags = if info.categories.is_empty() {
            vec![UNCATEGORIZED_TAG.to_string()]
        } else {
            info.categories.clone()
        };
        tags.push(
            info.language
                .clone()
                .filter(|lang| !lang.trim().is_empty())
                .unwrap_or_else(|| NO_LANGUAGE_TAG.to_string()),
        );

        Self {
            title: info.title.clone(),
            author,
            tags,
        }
    }

    pub(crate) fn stamp(self, owner: Owner, saved_at: DateTime<Utc>) -> SavedReference {
        SavedReference {
            id: None,
            title: self.title,
            author: self.author,
            owner,
            saved_at,
            tags: self.tags,
        }
    }
}
