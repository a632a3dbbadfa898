//! # Debate Catalog Core
//!
//! Local storage and query layer for a catalog of debate topics. Each topic
//! presents a Republican and a Democratic stance with reasoning, sources and
//! framing vocabulary. Users keep a private library of saved debates, notes
//! and folders next to the catalog.
//!
//! The catalog is a single JSON document (category → topics) persisted through
//! a [`store_adapter::StoreAdapter`]; the production adapter is an LMDB
//! environment ([`local_db_state::AppDbState`]) that also holds the library
//! tables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use debate_catalog_core::{create_catalog, catalog_resolve, free_response};
//! use std::ffi::CString;
//!
//! let config = CString::new(r#"{"db_name":"debates"}"#).unwrap();
//! let state = create_catalog(config.as_ptr());
//!
//! let path = CString::new("/debate/1/Limited-Government").unwrap();
//! let response = catalog_resolve(state, path.as_ptr());
//! free_response(response);
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a JSON-serialized [`app_response::AppResponse`]
//! that must be released with [`free_response`]:
//!
//! - [`create_catalog`] / [`close_catalog`] - open and release an instance
//! - [`catalog_get_all`], [`catalog_get_sorted`], [`catalog_get_category`],
//!   [`catalog_resolve`], [`catalog_stats`], [`catalog_export`] - reads
//! - [`catalog_create_category`], [`catalog_update_category`],
//!   [`catalog_delete_category`], [`catalog_add_sub_item`],
//!   [`catalog_update_sub_item`], [`catalog_delete_sub_item`],
//!   [`catalog_import`] - content editing
//! - [`library_is_saved`], [`library_toggle_save`] - bookmarks

pub mod app_response;
pub mod catalog;
pub mod config;
pub mod core_state;
pub mod debate_model;
pub mod errors;
pub mod library;
pub mod library_model;
pub mod library_view;
pub mod local_db_state;
pub mod projection;
pub mod seed;
pub mod store_adapter;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::str::FromStr;

use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::app_response::AppResponse;
use crate::config::CoreConfig;
use crate::core_state::CoreState;
use crate::debate_model::{CategoryId, CategoryPatch, SubItemDraft, SubItemId, SubItemPatch};
use crate::library::SavedDebateStore;
use crate::library_model::DebateKey;
use crate::projection::{all_sub_items_sorted, CategoryOverview};

/// Opens a catalog instance.
///
/// `config_json` is a [`CoreConfig`] as JSON; missing fields take their
/// defaults. The catalog is seeded on first use.
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON configuration, `{}` for defaults
///
/// # Returns
///
/// An opaque handle for the other functions, to be released with
/// [`close_catalog`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use debate_catalog_core::create_catalog;
///
/// let config = CString::new(r#"{"db_name":"debates"}"#).unwrap();
/// let state = create_catalog(config.as_ptr());
/// assert!(!state.is_null());
/// ```
///
/// # Errors
///
/// Returns a null pointer if:
/// - `config_json` is null or not valid UTF-8
/// - the configuration is not valid JSON
/// - the LMDB environment cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_catalog(config_json: *const c_char) -> *mut CoreState {
    let raw = match read_c_str(config_json) {
        Some(s) => s,
        None => {
            warn!("Null or non UTF-8 config passed to create_catalog");
            return std::ptr::null_mut();
        }
    };

    let config = match CoreConfig::from_json_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid catalog configuration: {e}");
            return std::ptr::null_mut();
        }
    };

    info!("Opening catalog at {}", config.lmdb_dir());
    match CoreState::open(config) {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(e) => {
            warn!("Failed to open catalog: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns the whole category tree.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries the JSON array of categories with their topics.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_get_all(state: *mut CoreState) -> *const c_char {
    respond(state, "catalog_get_all", |state| {
        to_json(&state.catalog().load()?)
    })
}

/// Returns every topic tagged with its category, sorted by name
/// (case-insensitive, lowercase first).
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_get_sorted(state: *mut CoreState) -> *const c_char {
    respond(state, "catalog_get_sorted", |state| {
        to_json(&all_sub_items_sorted(&state.catalog().load()?))
    })
}

/// Returns the overview of one category: title, topic count and a
/// shortened preview per topic.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `id` - Category id
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `NotFound` when no category has `id`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_get_category(state: *mut CoreState, id: i64) -> *const c_char {
    respond(state, "catalog_get_category", |state| {
        let preview_chars = state.catalog().config().preview_summary_chars;
        match state.catalog().find_category(CategoryId(id))? {
            Some(category) => to_json(&CategoryOverview::new(&category, preview_chars)),
            None => Err(AppResponse::NotFound(format!("No category with id: {id}"))),
        }
    })
}

/// Resolves a debate route.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `path` - `/debates/{id}` or `/debate/{categoryId}/{slug}`
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries a `DebateView` tagged by `kind` (`category` or `debate`);
/// `NotFound` covers unknown paths, categories and slugs.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use debate_catalog_core::{catalog_resolve, create_catalog, free_response};
///
/// let config = CString::new("{}").unwrap();
/// let state = create_catalog(config.as_ptr());
/// let path = CString::new("/debate/1/Limited-Government").unwrap();
/// let response = catalog_resolve(state, path.as_ptr());
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_resolve(state: *mut CoreState, path: *const c_char) -> *const c_char {
    respond(state, "catalog_resolve", |state| {
        let path = arg(path, "path")?;
        match state.resolve(&path)? {
            Some(view) => to_json(&view),
            None => Err(AppResponse::NotFound(format!("No debate at path: {path}"))),
        }
    })
}

/// Returns the number of categories and topics.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries `{"totalCategories": n, "totalSubItems": m}`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_stats(state: *mut CoreState) -> *const c_char {
    respond(state, "catalog_stats", |state| to_json(&state.catalog().stats()?))
}

/// Exports the category tree as pretty-printed JSON.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// The `Ok` payload can be fed back to [`catalog_import`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_export(state: *mut CoreState) -> *const c_char {
    respond(state, "catalog_export", |state| Ok(state.catalog().export_json()?))
}

/// Replaces the whole category tree with `json`.
///
/// The tree is validated first (non-empty titles and names, unique category
/// ids, unique slugs); the stored tree is untouched when validation fails.
/// Topics without an id get one.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `json` - JSON array of categories, as produced by [`catalog_export`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `ValidationError` when `json` does not parse or fails validation.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_import(state: *mut CoreState, json: *const c_char) -> *const c_char {
    respond(state, "catalog_import", |state| {
        let json = arg(json, "JSON")?;
        to_json(&state.catalog().import_json(&json)?)
    })
}

/// Creates an empty category with the next free id.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `title` - Category title, trimmed; must not be blank
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries the new category; `ValidationError` for a blank title.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_create_category(
    state: *mut CoreState,
    title: *const c_char,
) -> *const c_char {
    respond(state, "catalog_create_category", |state| {
        let title = arg(title, "title")?;
        to_json(&state.catalog().create_category(&title)?)
    })
}

/// Applies a [`CategoryPatch`] to a category.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `id` - Category id
/// * `patch_json` - JSON [`CategoryPatch`]; absent fields are left unchanged
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `NotFound` when no category has `id`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_update_category(
    state: *mut CoreState,
    id: i64,
    patch_json: *const c_char,
) -> *const c_char {
    respond(state, "catalog_update_category", |state| {
        let patch: CategoryPatch = parse_arg(patch_json, "patch")?;
        match state.catalog().update_category(CategoryId(id), patch)? {
            Some(category) => to_json(&category),
            None => Err(AppResponse::NotFound(format!("No category with id: {id}"))),
        }
    })
}

/// Deletes a category and all of its topics. Saved debates pointing at it
/// are kept.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `id` - Category id
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `NotFound` when no category has `id`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_delete_category(state: *mut CoreState, id: i64) -> *const c_char {
    respond(state, "catalog_delete_category", |state| {
        if state.catalog().delete_category(CategoryId(id))? {
            Ok(format!("Category {id} deleted"))
        } else {
            Err(AppResponse::NotFound(format!("No category with id: {id}")))
        }
    })
}

/// Appends a topic built from a content-editor draft.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `category_id` - Category receiving the topic
/// * `draft_json` - JSON [`SubItemDraft`]; sources and vocabulary are one
///   entry per line
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries the new topic including its id. `NotFound` for an unknown
/// category; `ValidationError` for a blank or already used name.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_add_sub_item(
    state: *mut CoreState,
    category_id: i64,
    draft_json: *const c_char,
) -> *const c_char {
    respond(state, "catalog_add_sub_item", |state| {
        let draft: SubItemDraft = parse_arg(draft_json, "draft")?;
        match state
            .catalog()
            .add_sub_item(CategoryId(category_id), draft.into_sub_item())?
        {
            Some(item) => to_json(&item),
            None => Err(AppResponse::NotFound(format!(
                "No category with id: {category_id}"
            ))),
        }
    })
}

/// Applies a [`SubItemPatch`] to a topic addressed by its stable id.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `category_id` - Category holding the topic
/// * `sub_item_id` - Topic id (UUID string)
/// * `patch_json` - JSON [`SubItemPatch`]; absent fields are left unchanged
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `BadRequest` for a malformed id; `NotFound` when the topic is not in the
/// category.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_update_sub_item(
    state: *mut CoreState,
    category_id: i64,
    sub_item_id: *const c_char,
    patch_json: *const c_char,
) -> *const c_char {
    respond(state, "catalog_update_sub_item", |state| {
        let id = parse_sub_item_id(sub_item_id)?;
        let patch: SubItemPatch = parse_arg(patch_json, "patch")?;
        match state
            .catalog()
            .update_sub_item(CategoryId(category_id), id, patch)?
        {
            Some(item) => to_json(&item),
            None => Err(AppResponse::NotFound(format!(
                "No topic {id} in category {category_id}"
            ))),
        }
    })
}

/// Deletes a topic addressed by its stable id.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `category_id` - Category holding the topic
/// * `sub_item_id` - Topic id (UUID string)
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `BadRequest` for a malformed id; `NotFound` when the topic is not in the
/// category.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn catalog_delete_sub_item(
    state: *mut CoreState,
    category_id: i64,
    sub_item_id: *const c_char,
) -> *const c_char {
    respond(state, "catalog_delete_sub_item", |state| {
        let id = parse_sub_item_id(sub_item_id)?;
        if state.catalog().delete_sub_item(CategoryId(category_id), id)? {
            Ok(format!("Topic {id} deleted"))
        } else {
            Err(AppResponse::NotFound(format!(
                "No topic {id} in category {category_id}"
            )))
        }
    })
}

/// Reports whether a user has saved a debate.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `key_json` - JSON [`DebateKey`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries `true` or `false`.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn library_is_saved(state: *mut CoreState, key_json: *const c_char) -> *const c_char {
    respond(state, "library_is_saved", |state| {
        let key: DebateKey = parse_arg(key_json, "key")?;
        to_json(&state.library().is_saved(&key)?)
    })
}

/// Saves or unsaves a debate for a user.
///
/// The check and the write run in one transaction, so concurrent calls
/// never leave two records for the same key.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
/// * `key_json` - JSON [`DebateKey`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]. A null `state` yields `BadRequest`.
/// `Ok` carries the new saved state.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_catalog`] that has
/// not been passed to [`close_catalog`]. String arguments must be null or
/// null-terminated.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn library_toggle_save(
    state: *mut CoreState,
    key_json: *const c_char,
) -> *const c_char {
    respond(state, "library_toggle_save", |state| {
        let key: DebateKey = parse_arg(key_json, "key")?;
        to_json(&state.library().toggle_save(&key)?)
    })
}

/// Closes the environment and frees the handle.
///
/// # Parameters
///
/// * `state` - Handle from [`create_catalog`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string, released with
/// [`free_response`]; `BadRequest` for a null handle.
///
/// # Safety
///
/// The pointer must not be used after this call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_catalog(state: *mut CoreState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_catalog".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { Box::from_raw(state) };
    match state.close() {
        Ok(()) => response_to_c_string(&AppResponse::success("Catalog closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Frees a string returned by any function of this library.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library, freed once.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn respond<F>(state: *mut CoreState, caller: &str, f: F) -> *const c_char
where
    F: FnOnce(&CoreState) -> Result<String, AppResponse>,
{
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            return response_to_c_string(&error);
        }
    };

    match f(state) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(error) => response_to_c_string(&error),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppResponse> {
    serde_json::to_string(value).map_err(AppResponse::from)
}

fn arg(ptr: *const c_char, field_name: &str) -> Result<String, AppResponse> {
    if ptr.is_null() {
        return Err(AppResponse::BadRequest(format!("Null {field_name} pointer")));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => Err(AppResponse::BadRequest(format!(
            "Invalid UTF-8 in {field_name}: {e}"
        ))),
    }
}

fn parse_arg<T: serde::de::DeserializeOwned>(
    ptr: *const c_char,
    field_name: &str,
) -> Result<T, AppResponse> {
    let raw = arg(ptr, field_name)?;
    serde_json::from_str(&raw)
        .map_err(|e| AppResponse::SerializationError(format!("Invalid {field_name} JSON: {e}")))
}

fn parse_sub_item_id(ptr: *const c_char) -> Result<SubItemId, AppResponse> {
    let raw = arg(ptr, "topic id")?;
    Uuid::from_str(raw.trim())
        .map(SubItemId)
        .map_err(|e| AppResponse::BadRequest(format!("Invalid topic id '{raw}': {e}")))
}

fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(str::to_string) }
}

fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}
