//! Persistence for imported templates and render jobs.
//!
//! The traits are the seam to a real database; the in-memory
//! implementations back the API server and the tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tmpl_models::{ImportedTemplate, RenderJob, RenderJobId, TemplateId};

use crate::error::ImportResult;

#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Insert or replace a template.
    async fn save(&self, template: ImportedTemplate) -> ImportResult<()>;

    async fn get(&self, id: &TemplateId) -> ImportResult<Option<ImportedTemplate>>;

    /// Templates ordered newest first. Inactive ones only when asked for.
    async fn list(&self, include_inactive: bool) -> ImportResult<Vec<ImportedTemplate>>;

    /// Returns false if there was nothing to delete.
    async fn delete(&self, id: &TemplateId) -> ImportResult<bool>;
}

#[async_trait]
pub trait RenderStore: Send + Sync {
    /// Insert or replace a render job.
    async fn save(&self, job: RenderJob) -> ImportResult<()>;

    async fn get(&self, id: &RenderJobId) -> ImportResult<Option<RenderJob>>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: Arc<RwLock<HashMap<TemplateId, ImportedTemplate>>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn save(&self, template: ImportedTemplate) -> ImportResult<()> {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template);
        Ok(())
    }

    async fn get(&self, id: &TemplateId) -> ImportResult<Option<ImportedTemplate>> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn list(&self, include_inactive: bool) -> ImportResult<Vec<ImportedTemplate>> {
        let mut templates: Vec<ImportedTemplate> = self
            .templates
            .read()
            .await
            .values()
            .filter(|t| include_inactive || t.is_active)
            .cloned()
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn delete(&self, id: &TemplateId) -> ImportResult<bool> {
        Ok(self.templates.write().await.remove(id).is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRenderStore {
    jobs: Arc<RwLock<HashMap<RenderJobId, RenderJob>>>,
}

impl InMemoryRenderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RenderStore for InMemoryRenderStore {
    async fn save(&self, job: RenderJob) -> ImportResult<()> {
        self.jobs.write().await.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &RenderJobId) -> ImportResult<Option<RenderJob>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }
}
