//! Render submission handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tmpl_creatomate::CreateRenderRequest;
use tmpl_models::{RenderJob, RenderJobId, RenderStatus, VariableMap};
use tmpl_variables::normalize_variables;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::handlers::templates::load_template;
use crate::metrics::record_render_submitted;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRenderBody {
    /// Local template id
    #[validate(length(min = 1, max = 200))]
    pub template_id: String,

    #[validate(length(min = 1, max = 100))]
    pub platform_id: Option<String>,

    #[serde(default)]
    pub modifications: VariableMap,
}

/// Submit a render of a stored template.
///
/// The job is stored before the rendering service is called, so a fast
/// webhook always finds it. A failed submission is kept as a failed job.
pub async fn create_render(
    State(state): State<AppState>,
    Json(body): Json<CreateRenderBody>,
) -> ApiResult<(StatusCode, Json<RenderJob>)> {
    body.validate()?;

    let template = load_template(&state, &body.template_id).await?;
    if !template.is_active {
        return Err(ApiError::bad_request(format!(
            "Template {} is not active",
            template.id
        )));
    }

    if let Some(platform_id) = &body.platform_id {
        if template.platform(platform_id).is_none() {
            return Err(ApiError::bad_request(format!(
                "Template {} has no platform {}",
                template.id, platform_id
            )));
        }
    }

    let job = RenderJob::new(
        template.id.clone(),
        template.creatomate_template_id.clone(),
        body.platform_id,
        normalize_variables(&body.modifications),
    );
    state.renders.save(job.clone()).await?;

    let request = CreateRenderRequest::new(&job.creatomate_template_id, job.modifications.clone())
        .with_metadata(job.metadata().encode())
        .with_webhook_url(state.config.webhook_url());

    match state.creatomate.create_render(&request).await {
        Ok(render) => {
            let job = record_submission(&state, job, |job| {
                job.creatomate_render_id.get_or_insert_with(|| render.id.clone());
                job.apply_status(
                    render.status,
                    render.url.clone(),
                    render.snapshot_url.clone(),
                    render.error_message.clone(),
                );
            })
            .await?;
            record_render_submitted("submitted");

            info!(
                job_id = %job.id,
                render_id = %render.id,
                status = %job.status,
                "Render submitted"
            );
            Ok((StatusCode::ACCEPTED, Json(job)))
        }
        Err(e) => {
            warn!(job_id = %job.id, error = %e, "Render submission failed");
            record_submission(&state, job, |job| {
                job.apply_status(RenderStatus::Failed, None, None, Some(e.to_string()));
            })
            .await?;
            record_render_submitted("failed");
            Err(e.into())
        }
    }
}

/// Apply the submission outcome to the stored copy of the job.
///
/// A webhook may have updated the job while the submission was in flight,
/// so the outcome is applied to what the store holds now. `apply_status`
/// leaves a terminal job untouched.
async fn record_submission(
    state: &AppState,
    submitted: RenderJob,
    update: impl FnOnce(&mut RenderJob),
) -> ApiResult<RenderJob> {
    let mut job = state.renders.get(&submitted.id).await?.unwrap_or(submitted);
    update(&mut job);
    state.renders.save(job.clone()).await?;
    Ok(job)
}

pub async fn get_render(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<RenderJob>> {
    state
        .renders
        .get(&RenderJobId::from_string(job_id.as_str()))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Render {} not found", job_id)))
}
