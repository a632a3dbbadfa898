//! Client-side library state: search filters, the save button and joining
//! saved records back onto the catalog.

use log::warn;

use crate::debate_model::{Category, SubItem};
use crate::errors::LibraryResult;
use crate::library::SavedDebateStore;
use crate::library_model::{DebateKey, FolderId, Note, SavedDebate};
use crate::projection::{find_category, DebateAddress};

/// Filter applied to the "Saved Debates" and "My Notes" tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryQuery {
    /// Case-insensitive substring; empty matches everything.
    pub search: String,
    /// `None` means all folders.
    pub folder_id: Option<FolderId>,
    /// Every listed tag must be present (case-insensitive).
    pub tags: Vec<String>,
}

impl LibraryQuery {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn matches_text(&self, fields: &[&str]) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
    }

    fn matches_folder(&self, folder_id: Option<FolderId>) -> bool {
        self.folder_id.is_none() || self.folder_id == folder_id
    }

    fn matches_tags(&self, tags: &[String]) -> bool {
        self.tags
            .iter()
            .all(|wanted| tags.iter().any(|t| t.eq_ignore_ascii_case(wanted.trim())))
    }

    pub fn matches_saved(&self, saved: &SavedDebate) -> bool {
        self.matches_text(&[saved.debate_sub_item_name.as_str()])
            && self.matches_folder(saved.folder_id)
            && self.matches_tags(&saved.tags)
    }

    pub fn matches_note(&self, note: &Note) -> bool {
        self.matches_text(&[note.title.as_str(), note.content.text.as_str()])
            && self.matches_folder(note.folder_id)
            && self.matches_tags(&note.tags)
    }

    pub fn filter_saved<'a>(&self, saved: &'a [SavedDebate]) -> Vec<&'a SavedDebate> {
        saved.iter().filter(|s| self.matches_saved(s)).collect()
    }

    pub fn filter_notes<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        notes.iter().filter(|n| self.matches_note(n)).collect()
    }
}

/// Bookmark toggle on a debate page.
///
/// The displayed state only changes after the service confirms it, so a
/// failed call leaves the button exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveButton {
    key: DebateKey,
    saved: bool,
}

impl SaveButton {
    /// Reads the current state from the service.
    pub fn load(service: &impl SavedDebateStore, key: DebateKey) -> LibraryResult<Self> {
        let saved = service.is_saved(&key)?;
        Ok(Self {
            key,
            saved,
        })
    }

    pub fn key(&self) -> &DebateKey {
        &self.key
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Requests the opposite of the displayed state. Uses the idempotent
    /// [`SavedDebateStore::set_saved`] so a retried click cannot create a
    /// second record.
    pub fn click(&mut self, service: &impl SavedDebateStore) -> LibraryResult<bool> {
        match service.set_saved(&self.key, !self.saved) {
            Ok(saved) => {
                self.saved = saved;
                Ok(saved)
            }
            Err(e) => {
                warn!("Saving debate '{}' failed: {e}", self.key.debate_sub_item_name);
                Err(e)
            }
        }
    }
}

/// A saved debate joined with the catalog. `debate` is `None` when the
/// category or topic no longer exists; the record is kept and shown as
/// unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry<'a> {
    pub record: &'a SavedDebate,
    pub debate: Option<(&'a Category, &'a SubItem)>,
}

impl LibraryEntry<'_> {
    pub fn is_orphaned(&self) -> bool {
        self.debate.is_none()
    }

    /// Link target for "View Debate"; `None` for orphaned records.
    pub fn address(&self) -> Option<DebateAddress> {
        self.debate
            .map(|(category, item)| DebateAddress::for_topic(category.id, &item.name))
    }

    pub fn category_label(&self) -> String {
        match self.debate {
            Some((category, _)) => category.title.clone(),
            None => format!("Category {} (no longer available)", self.record.debate_category_id),
        }
    }
}

pub fn resolve_saved<'a>(
    categories: &'a [Category],
    saved: &'a [SavedDebate],
) -> Vec<LibraryEntry<'a>> {
    saved
        .iter()
        .map(|record| {
            let debate = find_category(categories, record.debate_category_id).and_then(|category| {
                category
                    .sub_items
                    .iter()
                    .find(|item| item.name == record.debate_sub_item_name)
                    .map(|item| (category, item))
            });
            LibraryEntry { record, debate }
        })
        .collect()
}

/// Saved debates whose category or topic has been deleted.
pub fn orphaned_saved<'a>(
    categories: &'a [Category],
    saved: &'a [SavedDebate],
) -> Vec<&'a SavedDebate> {
    resolve_saved(categories, saved)
        .into_iter()
        .filter(|entry| entry.is_orphaned())
        .map(|entry| entry.record)
        .collect()
}
