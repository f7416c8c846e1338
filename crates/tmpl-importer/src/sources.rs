//! Collaborators the importer reads from.

use async_trait::async_trait;
use tmpl_creatomate::{CreatomateClient, CreatomateResult, CreatomateTemplate};
use tmpl_models::VariableMap;

/// Fetches template definitions.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_template(&self, template_id: &str) -> CreatomateResult<CreatomateTemplate>;
}

/// Looks up modifications used by earlier renders of a template.
#[async_trait]
pub trait RenderSource: Send + Sync {
    /// Modifications of the most recent render, if any.
    async fn latest_modifications(&self, template_id: &str) -> CreatomateResult<Option<VariableMap>>;
}

#[async_trait]
impl TemplateSource for CreatomateClient {
    async fn fetch_template(&self, template_id: &str) -> CreatomateResult<CreatomateTemplate> {
        self.get_template(template_id).await
    }
}

#[async_trait]
impl RenderSource for CreatomateClient {
    async fn latest_modifications(&self, template_id: &str) -> CreatomateResult<Option<VariableMap>> {
        Ok(self
            .latest_render(template_id)
            .await?
            .and_then(|render| render.modifications))
    }
}
