//! Catalog data model: categories, debate topics and the two stances.
//!
//! The serialized shape matches the document the browser client kept under the
//! `debateCategories` key (`subItems`, `myTake`), plus a stable `id` per topic.
//! Older documents without topic ids still deserialize; the repository assigns
//! ids on first load.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown in the personal reflection section of a new topic.
pub const DEFAULT_MY_TAKE: &str =
    "This section allows users to write their own analysis after reviewing both perspectives.";

/// Numeric category identifier, `max + 1` on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl CategoryId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identifier of a [`SubItem`].
///
/// The nil UUID marks a topic read from a legacy document that has not been
/// assigned an id yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubItemId(pub Uuid);

impl Default for SubItemId {
    fn default() -> Self {
        SubItemId(Uuid::nil())
    }
}

impl SubItemId {
    pub fn new() -> Self {
        SubItemId(Uuid::new_v4())
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.is_nil()
    }
}

impl Display for SubItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side's position on a topic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stance {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: String,
    /// Citations in display order. Whether one renders as a link is decided
    /// at display time, see [`crate::projection::SourceKind`].
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A debate topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItem {
    #[serde(default)]
    pub id: SubItemId,
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub republican: Stance,
    #[serde(default)]
    pub democratic: Stance,
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub my_take: String,
}

/// Top level grouping of topics. `sub_items` order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    #[serde(default)]
    pub sub_items: Vec<SubItem>,
}

impl Category {
    pub fn sub_item(&self, id: SubItemId) -> Option<&SubItem> {
        self.sub_items.iter().find(|item| item.id == id)
    }

    pub fn position_of(&self, id: SubItemId) -> Option<usize> {
        self.sub_items.iter().position(|item| item.id == id)
    }
}

/// Partial update for a [`Category`]. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub title: Option<String>,
}

/// Partial update for a [`SubItem`]. The id is never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub republican: Option<Stance>,
    #[serde(default)]
    pub democratic: Option<Stance>,
    #[serde(default)]
    pub vocabulary: Option<Vec<String>>,
    #[serde(default)]
    pub my_take: Option<String>,
}

impl SubItemPatch {
    pub fn apply(self, item: &mut SubItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(topic) = self.topic {
            item.topic = topic;
        }
        if let Some(republican) = self.republican {
            item.republican = republican;
        }
        if let Some(democratic) = self.democratic {
            item.democratic = democratic;
        }
        if let Some(vocabulary) = self.vocabulary {
            item.vocabulary = vocabulary;
        }
        if let Some(my_take) = self.my_take {
            item.my_take = my_take;
        }
    }
}

/// Raw form input from the content editor. Multi-line fields hold one entry
/// per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemDraft {
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub rep_summary: String,
    #[serde(default)]
    pub rep_reasoning: String,
    #[serde(default)]
    pub rep_sources: String,
    #[serde(default)]
    pub dem_summary: String,
    #[serde(default)]
    pub dem_reasoning: String,
    #[serde(default)]
    pub dem_sources: String,
    #[serde(default)]
    pub vocabulary: String,
    #[serde(default)]
    pub my_take: Option<String>,
}

impl SubItemDraft {
    /// Builds a topic with a fresh id. An absent or blank `my_take` falls back
    /// to [`DEFAULT_MY_TAKE`].
    pub fn into_sub_item(self) -> SubItem {
        let my_take = match self.my_take {
            Some(take) if !take.trim().is_empty() => take,
            _ => DEFAULT_MY_TAKE.to_string(),
        };
        SubItem {
            id: SubItemId::new(),
            name: self.name.trim().to_string(),
            topic: self.topic,
            republican: Stance {
                summary: self.rep_summary,
                reasoning: self.rep_reasoning,
                sources: split_lines(&self.rep_sources),
            },
            democratic: Stance {
                summary: self.dem_summary,
                reasoning: self.dem_reasoning,
                sources: split_lines(&self.dem_sources),
            },
            vocabulary: split_lines(&self.vocabulary),
            my_take,
        }
    }
}

/// One trimmed, non-empty entry per input line.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
