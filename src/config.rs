//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. The file lives in
//! the root of the WordPress export (the docs directory) and is optional:
//! stock defaults are used for anything it doesn't set.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Adventures of Gallivanter Ganter"  # Used when h1.site-title is missing
//! base_url = ""                                # "/gnarwall" for subpath hosting
//! static_pages = ["about", "contact"]          # <slug>/index.html pages to extract
//!
//! [extract]
//! strategy = "structural"                      # or "pattern"
//!
//! [processing]
//! max_processes = 4                            # omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub extract: ExtractConfig,
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url(&self.site.base_url)?;
        for page in &self.site.static_pages {
            if page.is_empty() || page.contains('/') || page.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "site.static_pages entry {page:?} must be a single path segment"
                )));
            }
        }
        Ok(())
    }
}

/// Check that a base URL is either empty or a root-relative prefix without a
/// trailing slash, so `{{ base_url }}/...` in templates never doubles up.
pub fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.is_empty() {
        return Ok(());
    }
    if !base_url.starts_with('/') {
        return Err(ConfigError::Validation(
            "site.base_url must be empty or start with '/'".into(),
        ));
    }
    if base_url.ends_with('/') {
        return Err(ConfigError::Validation(
            "site.base_url must not end with '/'".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Site title used when the homepage has no `h1.site-title`.
    pub title: String,
    /// Prefix for every absolute link in rendered output.
    pub base_url: String,
    /// Static page directories to extract, e.g. `about/index.html`.
    pub static_pages: Vec<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Adventures of Gallivanter Ganter".to_string(),
            base_url: String::new(),
            static_pages: vec!["about".to_string(), "contact".to_string()],
        }
    }
}

/// Which extraction backend reads the WordPress markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// DOM parsing with CSS selectors.
    #[default]
    Structural,
    /// Regex matching over the raw markup. Less robust, kept as a fallback.
    Pattern,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractConfig {
    pub strategy: Strategy,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel extraction workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load config from `config.toml` in the given directory.
///
/// A missing file means stock defaults. Keys the file leaves out fall back
/// to their defaults through `#[serde(default)]`; unknown keys are rejected
/// and the result is validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("config.toml");
    let config: SiteConfig = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# wp-static configuration
# =======================
# Place this file in the root of the WordPress export (next to index.html).
# All settings are optional; values shown are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Title used when the homepage has no h1.site-title element.
title = "Adventures of Gallivanter Ganter"

# Prefix added to every absolute link in the rendered site.
# Leave empty for root hosting; use "/project" when the site lives under a
# subpath (e.g. GitHub Pages project sites). No trailing slash.
base_url = ""

# Static pages to extract; each is read from <slug>/index.html.
static_pages = ["about", "contact"]

# ---------------------------------------------------------------------------
# Extraction
# ---------------------------------------------------------------------------
[extract]
# "structural" parses the DOM and uses CSS selectors.
# "pattern" uses regular expressions over the raw markup. It is less robust:
# titles containing nested tags come back empty.
strategy = "structural"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel extraction workers. Omit for auto (= CPU cores).
# max_processes = 4
"##
}
