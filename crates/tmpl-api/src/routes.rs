//! API routes.

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    create_render, creatomate_webhook, delete_template, get_render, get_template,
    get_template_variables, health, import_template, list_templates, update_template,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let template_routes = Router::new()
        .route("/templates", get(list_templates))
        .route("/templates/:template_id", get(get_template))
        .route("/templates/:template_id/variables", get(get_template_variables));

    let admin_routes = Router::new()
        .route("/admin/templates/import", post(import_template))
        .route(
            "/admin/templates/:template_id",
            patch(update_template).delete(delete_template),
        );

    let render_routes = Router::new()
        .route("/renders", post(create_render))
        .route("/renders/:job_id", get(get_render));

    // Called by the rendering service, see ApiConfig::webhook_url
    let webhook_routes = Router::new().route("/webhooks/creatomate", post(creatomate_webhook));

    let api_routes = Router::new()
        .merge(template_routes)
        .merge(admin_routes)
        .merge(render_routes)
        .merge(webhook_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
