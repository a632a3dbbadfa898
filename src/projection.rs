//! Read-only views derived from the category tree.
//!
//! Nothing here is persisted. Functions take the already loaded tree so views
//! can be computed without touching the store again.

use std::cmp::Ordering;

use serde::Serialize;

use crate::debate_model::{Category, CategoryId, SubItem, SubItemId};

/// URL slug of a topic name: every space becomes `-`, nothing else changes.
pub fn slugify(name: &str) -> String {
    name.replace(' ', "-")
}

/// Case-insensitive ordering with a lowercase-first tiebreak, close to what
/// a browser's default `localeCompare` produces for catalog names.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// A topic together with the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedSubItem {
    #[serde(flatten)]
    pub sub_item: SubItem,
    pub category_id: CategoryId,
    pub category_title: String,
}

impl TaggedSubItem {
    pub fn slug(&self) -> String {
        slugify(&self.sub_item.name)
    }
}

/// Every topic of every category, ascending by name under [`locale_cmp`].
pub fn all_sub_items_sorted(categories: &[Category]) -> Vec<TaggedSubItem> {
    let mut items: Vec<TaggedSubItem> = categories
        .iter()
        .flat_map(|category| {
            category.sub_items.iter().map(move |sub_item| TaggedSubItem {
                sub_item: sub_item.clone(),
                category_id: category.id,
                category_title: category.title.clone(),
            })
        })
        .collect();
    items.sort_by(|a, b| locale_cmp(&a.sub_item.name, &b.sub_item.name));
    items
}

pub fn find_category(categories: &[Category], id: CategoryId) -> Option<&Category> {
    categories.iter().find(|c| c.id == id)
}

/// Exact, case-sensitive match of `slug` against the slugified topic names.
pub fn find_sub_item_by_slug<'a>(category: &'a Category, slug: &str) -> Option<&'a SubItem> {
    category
        .sub_items
        .iter()
        .find(|item| slugify(&item.name) == slug)
}

pub fn find_sub_item_by_id(
    categories: &[Category],
    id: SubItemId,
) -> Option<(&Category, &SubItem)> {
    categories
        .iter()
        .find_map(|category| category.sub_item(id).map(|item| (category, item)))
}

/// How a source string is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    Link,
    Text,
}

impl SourceKind {
    pub fn classify(source: &str) -> Self {
        if source.contains("http") {
            SourceKind::Link
        } else {
            SourceKind::Text
        }
    }
}

/// Truncates to at most `max_chars` characters, ending in `…` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

/// Hover card for a topic: the question and both summaries, shortened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemPreview {
    pub id: SubItemId,
    pub name: String,
    pub slug: String,
    pub topic: String,
    pub republican_summary: String,
    pub democratic_summary: String,
}

impl SubItemPreview {
    pub fn new(item: &SubItem, max_summary_chars: usize) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            slug: slugify(&item.name),
            topic: item.topic.clone(),
            republican_summary: truncate_chars(&item.republican.summary, max_summary_chars),
            democratic_summary: truncate_chars(&item.democratic.summary, max_summary_chars),
        }
    }
}

/// Category landing page: title, topic count and a preview per topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverview {
    pub id: CategoryId,
    pub title: String,
    pub topic_count: usize,
    pub topics: Vec<SubItemPreview>,
}

impl CategoryOverview {
    pub fn new(category: &Category, max_summary_chars: usize) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            topic_count: category.sub_items.len(),
            topics: category
                .sub_items
                .iter()
                .map(|item| SubItemPreview::new(item, max_summary_chars))
                .collect(),
        }
    }
}

/// The two ways a debate page is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebateAddress {
    /// `/debates/{id}`
    Category(CategoryId),
    /// `/debate/{categoryId}/{slug}`
    Topic { category_id: CategoryId, slug: String },
}

impl DebateAddress {
    pub fn for_topic(category_id: CategoryId, name: &str) -> Self {
        DebateAddress::Topic {
            category_id,
            slug: slugify(name),
        }
    }

    /// Parses a path, ignoring a trailing slash. Anything else yields `None`.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let mut parts = trimmed.trim_start_matches('/').split('/');
        let address = match (parts.next(), parts.next(), parts.next()) {
            (Some("debates"), Some(id), None) => DebateAddress::Category(parse_category_id(id)?),
            (Some("debate"), Some(id), Some(slug)) if !slug.is_empty() => DebateAddress::Topic {
                category_id: parse_category_id(id)?,
                slug: slug.to_string(),
            },
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(address)
    }

    pub fn path(&self) -> String {
        match self {
            DebateAddress::Category(id) => format!("/debates/{id}"),
            DebateAddress::Topic { category_id, slug } => format!("/debate/{category_id}/{slug}"),
        }
    }

    pub fn category_id(&self) -> CategoryId {
        match self {
            DebateAddress::Category(id) => *id,
            DebateAddress::Topic { category_id, .. } => *category_id,
        }
    }

    /// `None` when the category, or the topic within it, does not exist.
    pub fn resolve<'a>(&self, categories: &'a [Category]) -> Option<ResolvedDebate<'a>> {
        let category = find_category(categories, self.category_id())?;
        match self {
            DebateAddress::Category(_) => Some(ResolvedDebate::Category(category)),
            DebateAddress::Topic { slug, .. } => {
                find_sub_item_by_slug(category, slug)
                    .map(|sub_item| ResolvedDebate::Debate { category, sub_item })
            }
        }
    }
}

fn parse_category_id(raw: &str) -> Option<CategoryId> {
    raw.parse::<i64>().ok().map(CategoryId)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedDebate<'a> {
    Category(&'a Category),
    Debate {
        category: &'a Category,
        sub_item: &'a SubItem,
    },
}
