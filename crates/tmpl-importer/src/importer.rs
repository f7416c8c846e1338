//! Template import orchestrator.
//!
//! Variable sources, in priority order:
//! 1. modifications from the pasted CURL command
//! 2. variables derived from the template's element tree
//! 3. string/number modifications of the template's latest render
//! 4. modifications found in the template description, only when 1-3 are empty
//!
//! Only the template fetch is fatal. The sample-render lookup is best-effort
//! and nothing is persisted until the last stage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tmpl_creatomate::CreatomateTemplate;
use tmpl_models::{ImportedTemplate, Platform, VariableMap};
use tmpl_variables::{
    extract_element_variables, extract_modifications, merge_sources, parse_curl_command,
};
use tracing::Instrument;

use crate::config::ImporterConfig;
use crate::error::{ImportError, ImportResult};
use crate::logging::ImportLogger;
use crate::metrics::{record_import, record_variables};
use crate::sources::{RenderSource, TemplateSource};
use crate::store::TemplateStore;

/// Import stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStage {
    ParseCurl,
    FetchTemplate,
    ExtractElements,
    FetchSampleRender,
    FetchFromDescription,
    Merge,
    Persist,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::ParseCurl => "parse_curl",
            ImportStage::FetchTemplate => "fetch_template",
            ImportStage::ExtractElements => "extract_elements",
            ImportStage::FetchSampleRender => "fetch_sample_render",
            ImportStage::FetchFromDescription => "fetch_from_description",
            ImportStage::Merge => "merge",
            ImportStage::Persist => "persist",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to import. At least one of `template_id` and `curl_command` is needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub template_id: Option<String>,

    #[serde(default)]
    pub curl_command: Option<String>,

    /// Overrides the name from the rendering API
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl ImportRequest {
    pub fn from_template_id(template_id: impl Into<String>) -> Self {
        Self {
            template_id: Some(template_id.into()),
            ..Default::default()
        }
    }

    pub fn from_curl(curl_command: impl Into<String>) -> Self {
        Self {
            curl_command: Some(curl_command.into()),
            ..Default::default()
        }
    }
}

/// Result of an import, with per-source variable counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub template: ImportedTemplate,
    pub curl_variables: usize,
    pub element_variables: usize,
    pub sample_variables: usize,
    pub description_variables: usize,
}

impl ImportReport {
    pub fn variable_count(&self) -> usize {
        self.template.variables.len()
    }
}

/// Composes the variable pipeline with its remote collaborators.
#[derive(Clone)]
pub struct TemplateImporter {
    templates: Arc<dyn TemplateSource>,
    renders: Arc<dyn RenderSource>,
    config: ImporterConfig,
}

impl TemplateImporter {
    pub fn new(
        templates: Arc<dyn TemplateSource>,
        renders: Arc<dyn RenderSource>,
        config: ImporterConfig,
    ) -> Self {
        Self {
            templates,
            renders,
            config,
        }
    }

    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Run every stage except persistence.
    pub async fn import(&self, request: &ImportRequest) -> ImportResult<ImportReport> {
        let result = self.run(request).await;
        record_outcome(&result);
        result
    }

    /// Import and save the resulting template.
    pub async fn import_and_store(
        &self,
        request: &ImportRequest,
        store: &dyn TemplateStore,
    ) -> ImportResult<ImportReport> {
        let result = match self.run(request).await {
            Ok(report) => {
                let logger = ImportLogger::new(&report.template.creatomate_template_id);
                match store.save(report.template.clone()).await {
                    Ok(()) => {
                        logger.log_stage(
                            ImportStage::Persist,
                            &format!("saved as {}", report.template.id),
                        );
                        Ok(report)
                    }
                    Err(e) => {
                        logger.log_error(ImportStage::Persist, &e.to_string());
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        };

        record_outcome(&result);
        result
    }

    async fn run(&self, request: &ImportRequest) -> ImportResult<ImportReport> {
        let parsed = request
            .curl_command
            .as_deref()
            .map(parse_curl_command)
            .unwrap_or_default();

        let template_id = request
            .template_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or(parsed.template_id)
            .ok_or(ImportError::MissingTemplateId)?;

        let curl_variables = parsed.modifications.unwrap_or_default();
        let logger = ImportLogger::new(&template_id);

        self.run_stages(request, &template_id, curl_variables, &logger)
            .instrument(logger.create_span())
            .await
    }

    async fn run_stages(
        &self,
        request: &ImportRequest,
        template_id: &str,
        curl_variables: VariableMap,
        logger: &ImportLogger,
    ) -> ImportResult<ImportReport> {
        logger.log_start(if request.curl_command.is_some() {
            "from CURL command"
        } else {
            "from template id"
        });
        logger.log_stage(
            ImportStage::ParseCurl,
            &format!("{} modifications", curl_variables.len()),
        );

        let remote = self
            .templates
            .fetch_template(template_id)
            .await
            .map_err(|source| {
                logger.log_error(ImportStage::FetchTemplate, &source.to_string());
                ImportError::TemplateFetch {
                    stage: ImportStage::FetchTemplate,
                    template_id: template_id.to_string(),
                    source,
                }
            })?;

        let element_variables = extract_element_variables(remote.elements());
        logger.log_stage(
            ImportStage::ExtractElements,
            &format!("{} element variables", element_variables.len()),
        );

        let sample_variables = self.sample_variables(template_id, logger).await;

        let description_variables = if curl_variables.is_empty()
            && element_variables.is_empty()
            && sample_variables.is_empty()
        {
            self.description_variables(&remote, logger)
        } else {
            VariableMap::new()
        };

        let variables = merge_sources([
            &curl_variables,
            &element_variables,
            &sample_variables,
            &description_variables,
        ]);
        logger.log_stage(ImportStage::Merge, &format!("{} variables", variables.len()));

        let template = build_template(request, template_id, &remote, variables);
        logger.log_completion(&format!(
            "'{}' with {} variables",
            template.name,
            template.variables.len()
        ));

        Ok(ImportReport {
            template,
            curl_variables: curl_variables.len(),
            element_variables: element_variables.len(),
            sample_variables: sample_variables.len(),
            description_variables: description_variables.len(),
        })
    }

    async fn sample_variables(&self, template_id: &str, logger: &ImportLogger) -> VariableMap {
        if !self.config.sample_render {
            return VariableMap::new();
        }

        match self.renders.latest_modifications(template_id).await {
            Ok(Some(modifications)) => {
                let values = scalar_values(&modifications);
                logger.log_stage(
                    ImportStage::FetchSampleRender,
                    &format!("{} sample values", values.len()),
                );
                values
            }
            Ok(None) => {
                logger.log_stage(ImportStage::FetchSampleRender, "no previous render");
                VariableMap::new()
            }
            Err(e) => {
                logger.log_warning(ImportStage::FetchSampleRender, &e.to_string());
                VariableMap::new()
            }
        }
    }

    fn description_variables(&self, remote: &CreatomateTemplate, logger: &ImportLogger) -> VariableMap {
        if !self.config.description_fallback {
            return VariableMap::new();
        }

        let found = remote
            .description
            .as_deref()
            .and_then(extract_modifications)
            .unwrap_or_default();
        logger.log_stage(
            ImportStage::FetchFromDescription,
            &format!("{} variables in description", found.len()),
        );
        found
    }
}

fn record_outcome(result: &ImportResult<ImportReport>) {
    match result {
        Ok(report) => {
            record_import("success");
            record_variables(report.variable_count());
        }
        Err(e) => record_import(e.outcome()),
    }
}

/// Keep string and number values only.
fn scalar_values(modifications: &VariableMap) -> VariableMap {
    modifications
        .iter()
        .filter(|(_, value)| matches!(value, Value::String(_) | Value::Number(_)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn build_template(
    request: &ImportRequest,
    template_id: &str,
    remote: &CreatomateTemplate,
    variables: VariableMap,
) -> ImportedTemplate {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| Some(remote.name.trim()).filter(|n| !n.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Template {}", template_id));

    let platforms = if !request.platforms.is_empty() {
        request.platforms.clone()
    } else {
        remote
            .dimensions()
            .map(|(width, height)| vec![Platform::new("default", "Default", width, height)])
            .unwrap_or_default()
    };

    let mut template = ImportedTemplate::new(name, template_id);
    template.description = remote.description.clone().unwrap_or_default();
    template.preview_image_url = remote.preview_url.clone();
    template.category = request.category.clone();
    template.platforms = platforms;
    template.variables = variables;
    template
}
