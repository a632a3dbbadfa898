//! Records of a user's library: saved debates, private notes and folders.
//!
//! Field names follow the record service's column names (`saved_debates`,
//! `private_notes`, `folders`), so serialized records line up with the remote
//! tables.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debate_model::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(SavedDebateId);
uuid_id!(NoteId);
uuid_id!(FolderId);

/// Identity of a saved debate: one record at most per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebateKey {
    pub user_id: UserId,
    pub debate_category_id: CategoryId,
    pub debate_sub_item_name: String,
}

impl DebateKey {
    pub fn new(user_id: UserId, category_id: CategoryId, sub_item_name: impl Into<String>) -> Self {
        Self {
            user_id,
            debate_category_id: category_id,
            debate_sub_item_name: sub_item_name.into(),
        }
    }

    /// Fixed-length storage key (a v5 UUID over the length-prefixed parts).
    /// LMDB rejects keys over 511 bytes, and names have no length limit.
    pub fn storage_key(&self) -> String {
        let category = self.debate_category_id.to_string();
        let mut encoded = Vec::new();
        for part in [self.user_id.as_str(), category.as_str(), self.debate_sub_item_name.as_str()] {
            encoded.extend_from_slice(&(part.len() as u64).to_be_bytes());
            encoded.extend_from_slice(part.as_bytes());
        }
        Uuid::new_v5(&Uuid::NAMESPACE_OID, &encoded).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDebate {
    pub id: SavedDebateId,
    pub user_id: UserId,
    pub debate_category_id: CategoryId,
    pub debate_sub_item_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub saved_at: DateTime<Utc>,
}

impl SavedDebate {
    pub fn key(&self) -> DebateKey {
        DebateKey::new(
            self.user_id.clone(),
            self.debate_category_id,
            self.debate_sub_item_name.clone(),
        )
    }
}

/// Note body. Kept as an object so richer content can be added later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    #[serde(default)]
    pub debate_category_id: Option<CategoryId>,
    #[serde(default)]
    pub debate_sub_item_name: Option<String>,
    pub title: String,
    pub content: NoteContent,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for a new note. A blank title on a note attached to a debate becomes
/// `Notes on {name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    #[serde(default)]
    pub debate_category_id: Option<CategoryId>,
    #[serde(default)]
    pub debate_sub_item_name: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
}

impl NewNote {
    /// Quick note taken from a debate page.
    pub fn for_debate(category_id: CategoryId, sub_item_name: &str, text: &str, tags: &str) -> Self {
        Self {
            debate_category_id: Some(category_id),
            debate_sub_item_name: Some(sub_item_name.to_string()),
            title: String::new(),
            text: text.to_string(),
            tags: parse_tags(tags),
            folder_id: None,
        }
    }

    pub fn resolved_title(&self) -> String {
        let title = self.title.trim();
        match (&self.debate_sub_item_name, title.is_empty()) {
            (Some(name), true) => quick_note_title(name),
            _ => title.to_string(),
        }
    }
}

/// Partial note update. `folder_id: Some(None)` moves the note out of its folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub folder_id: Option<Option<FolderId>>,
}

pub fn quick_note_title(sub_item_name: &str) -> String {
    format!("Notes on {sub_item_name}")
}

/// Splits a comma separated tag field into trimmed, non-empty tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
