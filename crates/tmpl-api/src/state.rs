//! Application state.

use std::sync::Arc;

use tmpl_creatomate::CreatomateClient;
use tmpl_importer::{
    ImporterConfig, InMemoryRenderStore, InMemoryTemplateStore, RenderStore, TemplateImporter,
    TemplateStore,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub creatomate: Arc<CreatomateClient>,
    pub importer: Arc<TemplateImporter>,
    pub templates: Arc<dyn TemplateStore>,
    pub renders: Arc<dyn RenderStore>,
}

impl AppState {
    /// Build state around an existing client, with in-memory stores.
    pub fn new(config: ApiConfig, creatomate: CreatomateClient, importer_config: ImporterConfig) -> Self {
        let creatomate = Arc::new(creatomate);
        let importer = TemplateImporter::new(creatomate.clone(), creatomate.clone(), importer_config);

        Self {
            config,
            creatomate,
            importer: Arc::new(importer),
            templates: Arc::new(InMemoryTemplateStore::new()),
            renders: Arc::new(InMemoryRenderStore::new()),
        }
    }
}
