//! Importer configuration.

/// Which optional import stages run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterConfig {
    /// Look up the template's latest render for sample values
    pub sample_render: bool,
    /// Scan the template description when nothing else produced variables
    pub description_fallback: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            sample_render: true,
            description_fallback: true,
        }
    }
}

impl ImporterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            sample_render: env_flag("IMPORT_SAMPLE_RENDER", true),
            description_fallback: env_flag("IMPORT_DESCRIPTION_FALLBACK", true),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}
