//! User library service: saved debates, notes and folders.
//!
//! The catalog only depends on the traits below. [`LmdbLibrary`] keeps the
//! three record tables in the shared LMDB environment; a networked record
//! service can implement the same traits.

use std::sync::Arc;

use chrono::Utc;
use lmdb::{RwTransaction, Transaction, WriteFlags};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{LibraryError, LibraryResult};
use crate::library_model::{
    DebateKey, Folder, FolderId, NewNote, Note, NoteContent, NoteId, NotePatch, SavedDebate,
    SavedDebateId, UserId,
};
use crate::local_db_state::{collect_values, delete_value, read_value, AppDbState, Table, Tables};

/// Bookmarks, keyed by [`DebateKey`].
pub trait SavedDebateStore {
    fn is_saved(&self, key: &DebateKey) -> LibraryResult<bool>;

    /// Brings the record for `key` into the requested state and returns it.
    /// Repeating the call with the same arguments changes nothing, so callers
    /// may retry it freely.
    fn set_saved(&self, key: &DebateKey, saved: bool) -> LibraryResult<bool>;

    /// Flips the saved state and returns the new one.
    fn toggle_save(&self, key: &DebateKey) -> LibraryResult<bool> {
        let saved = self.is_saved(key)?;
        self.set_saved(key, !saved)
    }

    /// Newest first.
    fn list_saved(&self, user_id: &UserId) -> LibraryResult<Vec<SavedDebate>>;

    /// Replaces tags and folder of a saved debate; `Ok(None)` when not saved.
    fn organize_saved(
        &self,
        key: &DebateKey,
        tags: Vec<String>,
        folder_id: Option<FolderId>,
    ) -> LibraryResult<Option<SavedDebate>>;
}

pub trait NoteStore {
    fn create_note(&self, user_id: &UserId, note: NewNote) -> LibraryResult<Note>;
    /// `Ok(None)` when the note does not exist or belongs to another user.
    fn update_note(
        &self,
        user_id: &UserId,
        id: NoteId,
        patch: NotePatch,
    ) -> LibraryResult<Option<Note>>;
    fn delete_note(&self, user_id: &UserId, id: NoteId) -> LibraryResult<bool>;
    /// Most recently updated first.
    fn list_notes(&self, user_id: &UserId) -> LibraryResult<Vec<Note>>;
}

pub trait FolderStore {
    fn create_folder(&self, user_id: &UserId, name: &str) -> LibraryResult<Folder>;
    /// Oldest first.
    fn list_folders(&self, user_id: &UserId) -> LibraryResult<Vec<Folder>>;
    /// Deletes the folder and detaches the notes and saved debates filed in it.
    fn delete_folder(&self, user_id: &UserId, id: FolderId) -> LibraryResult<bool>;
}

pub trait LibraryService: SavedDebateStore + NoteStore + FolderStore {}

impl<T: SavedDebateStore + NoteStore + FolderStore> LibraryService for T {}

#[derive(Clone)]
pub struct LmdbLibrary {
    db: Arc<AppDbState>,
}

impl LmdbLibrary {
    pub fn new(db: Arc<AppDbState>) -> Self {
        Self { db }
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut RwTransaction<'_>, &Tables) -> LibraryResult<T>,
    ) -> LibraryResult<T> {
        self.db.write_txn(f)
    }

    fn list<T: DeserializeOwned>(
        &self,
        table: Table,
        keep: impl Fn(&T) -> bool,
    ) -> LibraryResult<Vec<T>> {
        let mut out = Vec::new();
        for (_, raw) in self.db.records(table)? {
            let record: T = serde_json::from_str(&raw)?;
            if keep(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

fn put_json<T: Serialize>(
    txn: &mut RwTransaction<'_>,
    db: lmdb::Database,
    key: &str,
    record: &T,
) -> LibraryResult<()> {
    let json = serde_json::to_string(record)?;
    txn.put(db, &key, &json, WriteFlags::empty())?;
    Ok(())
}

fn get_json<T: DeserializeOwned, Txn: Transaction>(
    txn: &Txn,
    db: lmdb::Database,
    key: &str,
) -> LibraryResult<Option<T>> {
    match read_value(txn, db, key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn new_saved_record(key: &DebateKey) -> SavedDebate {
    SavedDebate {
        id: SavedDebateId::new(),
        user_id: key.user_id.clone(),
        debate_category_id: key.debate_category_id,
        debate_sub_item_name: key.debate_sub_item_name.clone(),
        tags: Vec::new(),
        folder_id: None,
        saved_at: Utc::now(),
    }
}

fn non_empty(value: &str, field: &str) -> LibraryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

impl SavedDebateStore for LmdbLibrary {
    fn is_saved(&self, key: &DebateKey) -> LibraryResult<bool> {
        let found = self
            .db
            .get_record(Table::SavedDebates, &key.storage_key())?;
        Ok(found.is_some())
    }

    fn set_saved(&self, key: &DebateKey, saved: bool) -> LibraryResult<bool> {
        let storage_key = key.storage_key();
        self.write(|txn, tables| {
            let db = tables.get(Table::SavedDebates);
            let exists = read_value(&*txn, db, &storage_key)?.is_some();
            match (saved, exists) {
                (true, false) => {
                    let record = new_saved_record(key);
                    put_json(txn, db, &storage_key, &record)?;
                    info!(
                        "User {} saved debate '{}' in category {}",
                        key.user_id, key.debate_sub_item_name, key.debate_category_id
                    );
                }
                (false, true) => {
                    delete_value(txn, db, &storage_key)?;
                    info!(
                        "User {} removed debate '{}' in category {}",
                        key.user_id, key.debate_sub_item_name, key.debate_category_id
                    );
                }
                _ => debug!("Saved state for '{storage_key}' already {saved}"),
            }
            Ok(saved)
        })
    }

    /// Read and write happen in one transaction, so concurrent toggles of the
    /// same key are serialized by LMDB.
    fn toggle_save(&self, key: &DebateKey) -> LibraryResult<bool> {
        let storage_key = key.storage_key();
        let now_saved = self.write(|txn, tables| {
            let db = tables.get(Table::SavedDebates);
            if delete_value(txn, db, &storage_key)? {
                return Ok(false);
            }
            let record = new_saved_record(key);
            put_json(txn, db, &storage_key, &record)?;
            Ok(true)
        })?;
        info!(
            "User {} toggled debate '{}' in category {} to saved={now_saved}",
            key.user_id, key.debate_sub_item_name, key.debate_category_id
        );
        Ok(now_saved)
    }

    fn list_saved(&self, user_id: &UserId) -> LibraryResult<Vec<SavedDebate>> {
        let mut saved = self.list(Table::SavedDebates, |r: &SavedDebate| &r.user_id == user_id)?;
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saved)
    }

    fn organize_saved(
        &self,
        key: &DebateKey,
        tags: Vec<String>,
        folder_id: Option<FolderId>,
    ) -> LibraryResult<Option<SavedDebate>> {
        let storage_key = key.storage_key();
        self.write(|txn, tables| {
            let db = tables.get(Table::SavedDebates);
            let Some(mut record) = get_json::<SavedDebate, _>(&*txn, db, &storage_key)? else {
                return Ok(None);
            };
            record.tags = tags;
            record.folder_id = folder_id;
            put_json(txn, db, &storage_key, &record)?;
            Ok(Some(record))
        })
    }
}

impl NoteStore for LmdbLibrary {
    fn create_note(&self, user_id: &UserId, note: NewNote) -> LibraryResult<Note> {
        let title = non_empty(&note.resolved_title(), "note title")?;
        let now = Utc::now();
        let record = Note {
            id: NoteId::new(),
            user_id: user_id.clone(),
            debate_category_id: note.debate_category_id,
            debate_sub_item_name: note.debate_sub_item_name,
            title,
            content: NoteContent { text: note.text },
            tags: note.tags,
            folder_id: note.folder_id,
            created_at: now,
            updated_at: now,
        };
        let key = record.id.to_string();
        self.write(|txn, tables| put_json(txn, tables.get(Table::PrivateNotes), &key, &record))?;
        info!("User {user_id} created note {}", record.id);
        Ok(record)
    }

    fn update_note(
        &self,
        user_id: &UserId,
        id: NoteId,
        patch: NotePatch,
    ) -> LibraryResult<Option<Note>> {
        let title = patch
            .title
            .as_deref()
            .map(|t| non_empty(t, "note title"))
            .transpose()?;
        let key = id.to_string();
        self.write(|txn, tables| {
            let db = tables.get(Table::PrivateNotes);
            let Some(mut note) = get_json::<Note, _>(&*txn, db, &key)? else {
                return Ok(None);
            };
            if &note.user_id != user_id {
                return Ok(None);
            }
            if let Some(title) = title {
                note.title = title;
            }
            if let Some(text) = patch.text {
                note.content.text = text;
            }
            if let Some(tags) = patch.tags {
                note.tags = tags;
            }
            if let Some(folder_id) = patch.folder_id {
                note.folder_id = folder_id;
            }
            note.updated_at = Utc::now();
            put_json(txn, db, &key, &note)?;
            Ok(Some(note))
        })
    }

    fn delete_note(&self, user_id: &UserId, id: NoteId) -> LibraryResult<bool> {
        let key = id.to_string();
        let deleted = self.write(|txn, tables| {
            let db = tables.get(Table::PrivateNotes);
            match get_json::<Note, _>(&*txn, db, &key)? {
                Some(note) if &note.user_id == user_id => Ok(delete_value(txn, db, &key)?),
                _ => Ok(false),
            }
        })?;
        if deleted {
            info!("User {user_id} deleted note {id}");
        }
        Ok(deleted)
    }

    fn list_notes(&self, user_id: &UserId) -> LibraryResult<Vec<Note>> {
        let mut notes = self.list(Table::PrivateNotes, |n: &Note| &n.user_id == user_id)?;
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }
}

impl FolderStore for LmdbLibrary {
    fn create_folder(&self, user_id: &UserId, name: &str) -> LibraryResult<Folder> {
        let folder = Folder {
            id: FolderId::new(),
            user_id: user_id.clone(),
            name: non_empty(name, "folder name")?,
            created_at: Utc::now(),
        };
        let key = folder.id.to_string();
        self.write(|txn, tables| put_json(txn, tables.get(Table::Folders), &key, &folder))?;
        Ok(folder)
    }

    fn list_folders(&self, user_id: &UserId) -> LibraryResult<Vec<Folder>> {
        let mut folders = self.list(Table::Folders, |f: &Folder| &f.user_id == user_id)?;
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(folders)
    }

    fn delete_folder(&self, user_id: &UserId, id: FolderId) -> LibraryResult<bool> {
        let key = id.to_string();
        self.write(|txn, tables| {
            let folders = tables.get(Table::Folders);
            match get_json::<Folder, _>(&*txn, folders, &key)? {
                Some(folder) if &folder.user_id == user_id => {}
                _ => return Ok(false),
            }
            delete_value(txn, folders, &key)?;

            let notes = tables.get(Table::PrivateNotes);
            for (note_key, raw) in collect_values(&*txn, notes)? {
                let mut note: Note = serde_json::from_str(&raw)?;
                if note.folder_id == Some(id) {
                    note.folder_id = None;
                    put_json(txn, notes, &note_key, &note)?;
                }
            }

            let saved = tables.get(Table::SavedDebates);
            for (saved_key, raw) in collect_values(&*txn, saved)? {
                let mut record: SavedDebate = serde_json::from_str(&raw)?;
                if record.folder_id == Some(id) {
                    record.folder_id = None;
                    put_json(txn, saved, &saved_key, &record)?;
                }
            }
            Ok(true)
        })
    }
}
