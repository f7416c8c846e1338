//! Creatomate REST API client.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};

use crate::config::CreatomateConfig;
use crate::error::{CreatomateError, CreatomateResult};
use crate::metrics::record_request;
use crate::retry::with_retry;
use crate::types::{
    CreateRenderRequest, CreateRenderResponse, CreatomateTemplate, Render, RenderListResponse,
};

/// Creatomate REST API client.
#[derive(Clone)]
pub struct CreatomateClient {
    http: Client,
    config: CreatomateConfig,
}

impl CreatomateClient {
    /// Create a new client.
    pub fn new(config: CreatomateConfig) -> CreatomateResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("tmpl-creatomate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CreatomateError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> CreatomateResult<Self> {
        Self::new(CreatomateConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch a template by id.
    pub async fn get_template(&self, template_id: &str) -> CreatomateResult<CreatomateTemplate> {
        let url = format!("{}/templates/{}", self.config.base_url, template_id);

        let template: CreatomateTemplate = self
            .execute("get_template", || self.http.get(&url))
            .await?;

        debug!(
            template_id = %template_id,
            elements = template.elements().len(),
            "Fetched Creatomate template"
        );

        Ok(template)
    }

    /// List the most recent renders of a template, newest first.
    pub async fn list_renders(&self, template_id: &str, limit: u32) -> CreatomateResult<Vec<Render>> {
        let url = format!("{}/renders", self.config.base_url);
        let limit = limit.to_string();

        let response: RenderListResponse = self
            .execute("list_renders", || {
                self.http
                    .get(&url)
                    .query(&[("template_id", template_id), ("limit", limit.as_str())])
            })
            .await?;

        Ok(response.into_renders())
    }

    /// Most recent render of a template, if there is one.
    pub async fn latest_render(&self, template_id: &str) -> CreatomateResult<Option<Render>> {
        Ok(self.list_renders(template_id, 1).await?.into_iter().next())
    }

    /// Submit a render. When the API answers with several renders (one per
    /// output) the first one is returned.
    pub async fn create_render(&self, request: &CreateRenderRequest) -> CreatomateResult<Render> {
        let url = format!("{}/renders", self.config.base_url);

        let response: CreateRenderResponse = self
            .execute("create_render", || self.http.post(&url).json(request))
            .await?;

        response
            .into_first()
            .ok_or_else(|| CreatomateError::invalid_response("create_render returned no renders"))
    }

    /// Send an authenticated request with retry and decode the JSON body.
    async fn execute<T, B>(&self, operation: &str, build: B) -> CreatomateResult<T>
    where
        T: DeserializeOwned,
        B: Fn() -> RequestBuilder,
    {
        let span = info_span!("creatomate_request", operation = %operation);
        let start = Instant::now();

        let result = with_retry(&self.config.retry, operation, || async {
            let response = build().bearer_auth(&self.config.api_key).send().await?;
            let status = response.status();

            if !status.is_success() {
                let retry_after_ms = retry_after_ms(response.headers());
                let body = response.text().await.unwrap_or_default();
                return Err(CreatomateError::from_http_status(
                    status.as_u16(),
                    format!("{} failed: {}", operation, body),
                )
                .with_retry_after(retry_after_ms));
            }

            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| {
                CreatomateError::invalid_response(format!("{} returned unexpected body: {}", operation, e))
            })
        })
        .instrument(span)
        .await;

        let latency_ms = start.elapsed().as_millis() as f64;
        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }
}

/// `Retry-After` in delay-seconds form, as milliseconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}
