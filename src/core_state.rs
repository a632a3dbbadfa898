//! One opened catalog instance: the LMDB environment plus the catalog
//! repository and user library that share it.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::catalog::CatalogRepository;
use crate::config::CoreConfig;
use crate::debate_model::{CategoryId, SubItem};
use crate::errors::{CatalogResult, StoreResult};
use crate::library::LmdbLibrary;
use crate::local_db_state::AppDbState;
use crate::projection::{CategoryOverview, DebateAddress, ResolvedDebate, SourceKind};

/// What a debate route renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DebateView {
    Category(CategoryOverview),
    #[serde(rename_all = "camelCase")]
    Debate {
        category_id: CategoryId,
        category_title: String,
        sub_item: SubItem,
        republican_sources: Vec<SourceKind>,
        democratic_sources: Vec<SourceKind>,
    },
}

pub struct CoreState {
    db: Arc<AppDbState>,
    catalog: CatalogRepository<Arc<AppDbState>>,
    library: LmdbLibrary,
}

impl CoreState {
    pub fn open(config: CoreConfig) -> StoreResult<Self> {
        let db = Arc::new(AppDbState::init(config.clone())?);
        let catalog = CatalogRepository::new(Arc::clone(&db), config);
        let library = LmdbLibrary::new(Arc::clone(&db));
        Ok(Self {
            db,
            catalog,
            library,
        })
    }

    pub fn catalog(&self) -> &CatalogRepository<Arc<AppDbState>> {
        &self.catalog
    }

    pub fn library(&self) -> &LmdbLibrary {
        &self.library
    }

    /// Resolves a `/debates/{id}` or `/debate/{categoryId}/{slug}` path.
    /// `Ok(None)` covers unparsable paths as well as missing data.
    pub fn resolve(&self, path: &str) -> CatalogResult<Option<DebateView>> {
        let Some(address) = DebateAddress::parse(path) else {
            return Ok(None);
        };
        let categories = self.catalog.load()?;
        let preview_chars = self.catalog.config().preview_summary_chars;
        let view = address.resolve(&categories).map(|resolved| match resolved {
            ResolvedDebate::Category(category) => {
                DebateView::Category(CategoryOverview::new(category, preview_chars))
            }
            ResolvedDebate::Debate { category, sub_item } => DebateView::Debate {
                category_id: category.id,
                category_title: category.title.clone(),
                republican_sources: classify_all(&sub_item.republican.sources),
                democratic_sources: classify_all(&sub_item.democratic.sources),
                sub_item: sub_item.clone(),
            },
        });
        Ok(view)
    }

    /// Releases the environment. Fails softly when other handles to it are
    /// still alive; the environment then closes once they are dropped.
    pub fn close(self) -> StoreResult<()> {
        let CoreState {
            db,
            catalog,
            library,
        } = self;
        drop(catalog);
        drop(library);
        match Arc::try_unwrap(db) {
            Ok(mut db) => {
                db.close_database()?;
                info!("Catalog closed");
            }
            Err(_) => warn!("Catalog environment still shared; deferring close"),
        }
        Ok(())
    }
}

fn classify_all(sources: &[String]) -> Vec<SourceKind> {
    sources.iter().map(|s| SourceKind::classify(s)).collect()
}
