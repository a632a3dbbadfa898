//! Catalog repository: the category tree persisted as a single JSON document.
//!
//! Every mutation is a full read-modify-write of the tree through the injected
//! [`StoreAdapter`]. Within one instance calls are sequential; two instances
//! writing the same store overwrite each other (last write wins, no merge).

use log::{debug, info, warn};

use crate::config::CoreConfig;
use crate::debate_model::{
    Category, CategoryId, CategoryPatch, SubItem, SubItemId, SubItemPatch,
};
use crate::errors::{CatalogError, CatalogResult};
use crate::projection::slugify;
use crate::seed::default_categories;
use crate::store_adapter::StoreAdapter;

/// Totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_categories: usize,
    pub total_sub_items: usize,
}

pub struct CatalogRepository<S: StoreAdapter> {
    store: S,
    config: CoreConfig,
}

impl<S: StoreAdapter> CatalogRepository<S> {
    pub fn new(store: S, config: CoreConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns the persisted tree, seeding the store on first use.
    ///
    /// A stored value that does not parse is replaced by the seed dataset
    /// (see [`CoreConfig::persist_seed_on_corruption`]) instead of failing.
    pub fn load(&self) -> CatalogResult<Vec<Category>> {
        match self.try_load() {
            Err(CatalogError::CorruptStore(reason)) => {
                warn!("Stored catalog is corrupt ({reason}); falling back to seed data");
                let seed = default_categories();
                if self.config.persist_seed_on_corruption {
                    self.replace(&seed)?;
                }
                Ok(seed)
            }
            other => other,
        }
    }

    /// Like [`load`](Self::load) but reports an unparsable document as
    /// [`CatalogError::CorruptStore`].
    pub fn try_load(&self) -> CatalogResult<Vec<Category>> {
        let Some(raw) = self.store.read(&self.config.catalog_key)? else {
            info!("No stored catalog under '{}'; seeding defaults", self.config.catalog_key);
            let seed = default_categories();
            self.replace(&seed)?;
            return Ok(seed);
        };

        let mut categories: Vec<Category> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::CorruptStore(e.to_string()))?;

        if assign_missing_ids(&mut categories) {
            debug!("Assigned stable ids to legacy topics");
            self.replace(&categories)?;
        }
        Ok(categories)
    }

    /// Overwrites the whole persisted tree.
    pub fn replace(&self, categories: &[Category]) -> CatalogResult<()> {
        let json = serde_json::to_string(categories)?;
        self.store.write(&self.config.catalog_key, &json)?;
        Ok(())
    }

    pub fn find_category(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        Ok(self.load()?.into_iter().find(|c| c.id == id))
    }

    pub fn create_category(&self, title: &str) -> CatalogResult<Category> {
        let title = non_empty(title, "category title")?;
        let mut categories = self.load()?;
        let id = next_category_id(&categories)?;
        let category = Category {
            id,
            title,
            sub_items: Vec::new(),
        };
        categories.push(category.clone());
        self.replace(&categories)?;
        info!("Created category {id}");
        Ok(category)
    }

    /// Returns `Ok(None)` without writing when `id` does not exist.
    pub fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> CatalogResult<Option<Category>> {
        let title = patch
            .title
            .as_deref()
            .map(|t| non_empty(t, "category title"))
            .transpose()?;
        let mut categories = self.load()?;
        let Some(category) = categories.iter_mut().find(|c| c.id == id) else {
            debug!("update_category: category {id} not found");
            return Ok(None);
        };
        if let Some(title) = title {
            category.title = title;
        }
        let updated = category.clone();
        self.replace(&categories)?;
        info!("Updated category {id}");
        Ok(Some(updated))
    }

    /// Removes the category and all of its topics.
    pub fn delete_category(&self, id: CategoryId) -> CatalogResult<bool> {
        let mut categories = self.load()?;
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Ok(false);
        }
        self.replace(&categories)?;
        info!("Deleted category {id}");
        Ok(true)
    }

    /// Appends `sub_item` to the category. A nil id is replaced with a fresh
    /// one. Returns `Ok(None)` when the category does not exist.
    pub fn add_sub_item(
        &self,
        category_id: CategoryId,
        mut sub_item: SubItem,
    ) -> CatalogResult<Option<SubItem>> {
        sub_item.name = non_empty(&sub_item.name, "topic name")?;
        if !sub_item.id.is_assigned() {
            sub_item.id = SubItemId::new();
        }
        let mut categories = self.load()?;
        if !categories.iter().any(|c| c.id == category_id) {
            debug!("add_sub_item: category {category_id} not found");
            return Ok(None);
        }
        ensure_unique_slug(&categories, &sub_item.name, None)?;
        let Some(category) = categories.iter_mut().find(|c| c.id == category_id) else {
            return Ok(None);
        };
        category.sub_items.push(sub_item.clone());
        self.replace(&categories)?;
        info!("Added topic '{}' to category {category_id}", sub_item.name);
        Ok(Some(sub_item))
    }

    pub fn update_sub_item(
        &self,
        category_id: CategoryId,
        sub_item_id: SubItemId,
        mut patch: SubItemPatch,
    ) -> CatalogResult<Option<SubItem>> {
        if let Some(name) = patch.name.take() {
            patch.name = Some(non_empty(&name, "topic name")?);
        }
        let mut categories = self.load()?;
        if let Some(name) = &patch.name {
            ensure_unique_slug(&categories, name, Some(sub_item_id))?;
        }
        let Some(item) = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.sub_items.iter_mut().find(|s| s.id == sub_item_id))
        else {
            debug!("update_sub_item: topic {sub_item_id} not found in category {category_id}");
            return Ok(None);
        };
        patch.apply(item);
        let updated = item.clone();
        self.replace(&categories)?;
        info!("Updated topic {sub_item_id} in category {category_id}");
        Ok(Some(updated))
    }

    pub fn delete_sub_item(
        &self,
        category_id: CategoryId,
        sub_item_id: SubItemId,
    ) -> CatalogResult<bool> {
        let mut categories = self.load()?;
        let Some(category) = categories.iter_mut().find(|c| c.id == category_id) else {
            return Ok(false);
        };
        let before = category.sub_items.len();
        category.sub_items.retain(|s| s.id != sub_item_id);
        if category.sub_items.len() == before {
            return Ok(false);
        }
        self.replace(&categories)?;
        info!("Deleted topic {sub_item_id} from category {category_id}");
        Ok(true)
    }

    /// Moves a topic to `new_index` within its category, clamped to the end.
    pub fn move_sub_item(
        &self,
        category_id: CategoryId,
        sub_item_id: SubItemId,
        new_index: usize,
    ) -> CatalogResult<bool> {
        let mut categories = self.load()?;
        let Some(category) = categories.iter_mut().find(|c| c.id == category_id) else {
            return Ok(false);
        };
        let Some(from) = category.position_of(sub_item_id) else {
            return Ok(false);
        };
        let item = category.sub_items.remove(from);
        let to = new_index.min(category.sub_items.len());
        category.sub_items.insert(to, item);
        self.replace(&categories)?;
        Ok(true)
    }

    /// Translates a display position into the topic's stable id.
    pub fn sub_item_id_at(
        &self,
        category_id: CategoryId,
        index: usize,
    ) -> CatalogResult<Option<SubItemId>> {
        Ok(self
            .find_category(category_id)?
            .and_then(|c| c.sub_items.get(index).map(|s| s.id)))
    }

    pub fn stats(&self) -> CatalogResult<CatalogStats> {
        let categories = self.load()?;
        Ok(CatalogStats {
            total_categories: categories.len(),
            total_sub_items: categories.iter().map(|c| c.sub_items.len()).sum(),
        })
    }

    pub fn export_json(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(&self.load()?)?)
    }

    /// Validates a full tree and replaces the stored one with it. The stored
    /// tree is untouched when validation fails.
    pub fn import_json(&self, json: &str) -> CatalogResult<Vec<Category>> {
        let mut categories: Vec<Category> =
            serde_json::from_str(json).map_err(|e| CatalogError::Validation(e.to_string()))?;
        assign_missing_ids(&mut categories);
        validate_tree(&categories)?;
        self.replace(&categories)?;
        info!("Imported catalog with {} categories", categories.len());
        Ok(categories)
    }

    pub fn reset_to_seed(&self) -> CatalogResult<Vec<Category>> {
        let seed = default_categories();
        self.replace(&seed)?;
        info!("Catalog reset to seed data");
        Ok(seed)
    }
}

/// `max(existing ids, 0) + 1`. Fails once the largest id is `i64::MAX`.
pub fn next_category_id(categories: &[Category]) -> CatalogResult<CategoryId> {
    let max = categories.iter().map(|c| c.id.get()).max().unwrap_or(0).max(0);
    max.checked_add(1)
        .map(CategoryId)
        .ok_or_else(|| CatalogError::Validation(format!("no category id left after {max}")))
}

fn assign_missing_ids(categories: &mut [Category]) -> bool {
    let mut changed = false;
    for item in categories.iter_mut().flat_map(|c| c.sub_items.iter_mut()) {
        if !item.id.is_assigned() {
            item.id = SubItemId::new();
            changed = true;
        }
    }
    changed
}

fn non_empty(value: &str, field: &str) -> CatalogResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Slugs are unique across the whole catalog, not only within a category.
fn ensure_unique_slug(
    categories: &[Category],
    name: &str,
    except: Option<SubItemId>,
) -> CatalogResult<()> {
    let slug = slugify(name);
    for category in categories {
        if let Some(existing) = category
            .sub_items
            .iter()
            .find(|s| Some(s.id) != except && slugify(&s.name) == slug)
        {
            debug!("Slug '{slug}' already taken by topic {}", existing.id);
            return Err(CatalogError::DuplicateSlug {
                slug,
                category_id: category.id,
            });
        }
    }
    Ok(())
}

fn validate_tree(categories: &[Category]) -> CatalogResult<()> {
    let mut ids = std::collections::HashSet::new();
    let mut slugs = std::collections::HashSet::new();
    let mut topic_ids = std::collections::HashSet::new();
    for category in categories {
        non_empty(&category.title, "category title")?;
        if !ids.insert(category.id) {
            return Err(CatalogError::Validation(format!(
                "duplicate category id {}",
                category.id
            )));
        }
        for item in &category.sub_items {
            non_empty(&item.name, "topic name")?;
            if !topic_ids.insert(item.id) {
                return Err(CatalogError::Validation(format!("duplicate topic id {}", item.id)));
            }
            let slug = slugify(&item.name);
            if !slugs.insert(slug.clone()) {
                return Err(CatalogError::DuplicateSlug {
                    slug,
                    category_id: category.id,
                });
            }
        }
    }
    Ok(())
}
