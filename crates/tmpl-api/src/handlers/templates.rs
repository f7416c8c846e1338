//! Template read handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tmpl_models::{CategorizedVariables, ImportedTemplate, TemplateId};
use tmpl_variables::categorize_variables;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListTemplatesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<ImportedTemplate>,
    pub total: usize,
}

/// Editor view of a template's variables.
#[derive(Serialize)]
pub struct TemplateVariablesResponse {
    pub template_id: TemplateId,
    #[serde(flatten)]
    pub variables: CategorizedVariables,
    pub has_variables: bool,
}

/// List templates, newest first.
pub async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<ListTemplatesQuery>,
) -> ApiResult<Json<TemplateListResponse>> {
    let templates = state.templates.list(query.include_inactive).await?;

    Ok(Json(TemplateListResponse {
        total: templates.len(),
        templates,
    }))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<ImportedTemplate>> {
    Ok(Json(load_template(&state, &template_id).await?))
}

/// Variables grouped into text, media and color sections.
pub async fn get_template_variables(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<Json<TemplateVariablesResponse>> {
    let template = load_template(&state, &template_id).await?;
    let variables = categorize_variables(&template.variables);

    Ok(Json(TemplateVariablesResponse {
        template_id: template.id,
        has_variables: variables.has_variables(),
        variables,
    }))
}

pub(crate) async fn load_template(state: &AppState, template_id: &str) -> ApiResult<ImportedTemplate> {
    state
        .templates
        .get(&TemplateId::from(template_id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Template {} not found", template_id)))
}
