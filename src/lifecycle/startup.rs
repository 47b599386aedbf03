//! Startup orchestration.
//!
//! # Responsibilities
//! - Create the in-process template store and model/entity catalog
//! - Wire routing and rendering into an [`AppState`]
//! - Load the optional seed file through the template repository

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::http::AppState;
use crate::render::{HandlebarsEngine, InMemoryCatalog};
use crate::seed::{SeedError, SeedFile};
use crate::template::InMemoryTemplateStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("seed file {path}: {source}")]
    Seed {
        path: String,
        #[source]
        source: SeedError,
    },
}

/// Everything the server needs, plus handles on the in-process stores.
pub struct Services {
    pub state: AppState,
    pub store: InMemoryTemplateStore,
    pub catalog: InMemoryCatalog,
}

pub async fn bootstrap(config: AppConfig) -> Result<Services, StartupError> {
    let store = InMemoryTemplateStore::new();
    let catalog = InMemoryCatalog::new();
    let seed_file = config.store.seed_file.clone();

    let state = AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(catalog.clone()),
        Arc::new(catalog.clone()),
        Arc::new(HandlebarsEngine::new()),
    );

    if let Some(path) = seed_file {
        let seed_err = |source: SeedError| StartupError::Seed {
            path: path.clone(),
            source,
        };
        let seed = SeedFile::load(Path::new(&path)).map_err(seed_err)?;
        seed.apply(&state.repository, &catalog).await.map_err(seed_err)?;
    } else {
        tracing::warn!("No seed file configured; starting with an empty template store");
    }

    Ok(Services {
        state,
        store,
        catalog,
    })
}
