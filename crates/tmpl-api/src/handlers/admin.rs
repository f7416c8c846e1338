//! Admin handlers for importing and maintaining templates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tmpl_importer::ImportRequest;
use tmpl_models::{ImportedTemplate, Platform, TemplateId, VariableMap};
use tmpl_variables::normalize_variables;
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::handlers::templates::load_template;
use crate::state::AppState;

/// Import request. One of `template_id` and `curl_command` is required.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportTemplateBody {
    #[validate(length(min = 1, max = 200))]
    pub template_id: Option<String>,

    #[validate(length(min = 1, max = 100000))]
    pub curl_command: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl ImportTemplateBody {
    fn has_source(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.template_id) || present(&self.curl_command)
    }

    fn into_request(self) -> ImportRequest {
        ImportRequest {
            template_id: self.template_id,
            curl_command: self.curl_command,
            name: self.name,
            category: self.category,
            platforms: self.platforms,
        }
    }
}

/// Partial template update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTemplateBody {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    pub is_active: Option<bool>,

    pub platforms: Option<Vec<Platform>>,

    pub variables: Option<VariableMap>,
}

/// Import a template from the rendering service and store it.
pub async fn import_template(
    State(state): State<AppState>,
    Json(body): Json<ImportTemplateBody>,
) -> ApiResult<(StatusCode, Json<ImportedTemplate>)> {
    body.validate()?;
    if !body.has_source() {
        return Err(ApiError::bad_request(
            "Either template_id or curl_command is required",
        ));
    }

    let report = state
        .importer
        .import_and_store(&body.into_request(), state.templates.as_ref())
        .await?;

    info!(
        template_id = %report.template.id,
        creatomate_template_id = %report.template.creatomate_template_id,
        curl = report.curl_variables,
        elements = report.element_variables,
        sample = report.sample_variables,
        description = report.description_variables,
        "Template imported"
    );

    Ok((StatusCode::CREATED, Json(report.template)))
}

/// Edit a stored template. Variables are re-normalized before saving.
pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
    Json(body): Json<UpdateTemplateBody>,
) -> ApiResult<Json<ImportedTemplate>> {
    body.validate()?;

    let mut template = load_template(&state, &template_id).await?;

    if let Some(name) = body.name {
        template.name = name.trim().to_string();
    }
    if let Some(description) = body.description {
        template.description = description;
    }
    if let Some(category) = body.category {
        template.category = Some(category).filter(|c| !c.trim().is_empty());
    }
    if let Some(is_active) = body.is_active {
        template.is_active = is_active;
    }
    if let Some(platforms) = body.platforms {
        template.platforms = platforms;
    }
    if let Some(variables) = body.variables {
        template.variables = normalize_variables(&variables);
    }
    template.touch();

    state.templates.save(template.clone()).await?;
    info!(template_id = %template.id, "Template updated");

    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.templates.delete(&TemplateId::from(template_id.as_str())).await? {
        return Err(ApiError::not_found(format!("Template {} not found", template_id)));
    }

    info!(template_id = %template_id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}
