//! Rendering service webhook receiver.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tmpl_creatomate::Render;
use tmpl_models::{RenderJobId, RenderMetadata};
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::metrics::record_webhook;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    /// Local render job the callback was matched to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<RenderJobId>,
}

impl WebhookAck {
    fn unmatched() -> Self {
        Self {
            received: true,
            job_id: None,
        }
    }
}

/// Apply a render status callback to its job.
///
/// Callbacks that cannot be matched are acknowledged so the sender does not
/// retry them.
pub async fn creatomate_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Render>,
) -> ApiResult<Json<WebhookAck>> {
    let metadata = match payload.metadata.as_deref().map(RenderMetadata::parse) {
        Some(Ok(metadata)) => metadata,
        Some(Err(e)) => {
            warn!(render_id = %payload.id, error = %e, "Webhook metadata unusable");
            record_webhook("bad_metadata");
            return Ok(Json(WebhookAck::unmatched()));
        }
        None => {
            warn!(render_id = %payload.id, "Webhook without metadata");
            record_webhook("bad_metadata");
            return Ok(Json(WebhookAck::unmatched()));
        }
    };

    let job_id = RenderJobId::from_string(metadata.job_id);
    let Some(mut job) = state.renders.get(&job_id).await? else {
        warn!(render_id = %payload.id, job_id = %job_id, "Webhook for unknown render job");
        record_webhook("unknown_job");
        return Ok(Json(WebhookAck::unmatched()));
    };

    if job.creatomate_render_id.is_none() {
        job.creatomate_render_id = Some(payload.id.clone());
    }

    let status = payload.status;
    if job.apply_status(status, payload.url, payload.snapshot_url, payload.error_message) {
        state.renders.save(job).await?;
        record_webhook("updated");
        info!(job_id = %job_id, render_id = %payload.id, status = %status, "Render status updated");
    } else {
        record_webhook("ignored");
        debug!(job_id = %job_id, status = %status, "Late webhook ignored for finished job");
    }

    Ok(Json(WebhookAck {
        received: true,
        job_id: Some(job_id),
    }))
}
