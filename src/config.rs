//! Site configuration module.
//!
//! Handles loading and validating `config.toml` from the inbox root. The
//! config file is optional — stock defaults cover the common layout — and
//! sparse: override just the values you want. Unknown keys are rejected to
//! catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! url_prefix = "/blog/"      # URL root under which shared assets are served
//! index_file = "i.html"      # Name of the document file in every folder
//! local_script = "local.js"  # Per-document script referenced by submissions
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file in the inbox root. The shared-asset scan skips
/// it, so it never gets versioned into the published tree.
pub const CONFIG_FILENAME: &str = "config.toml";

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
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// URL root under which shared assets are served. Script references in
    /// document heads that start with this prefix resolve against the shared
    /// version table; the prefix is also emitted on generated links.
    pub url_prefix: String,
    /// Name of the index document inside every inbox and published folder.
    pub index_file: String,
    /// Sentinel name submissions use to reference their per-document script.
    pub local_script: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/blog/".to_string(),
            index_file: "i.html".to_string(),
            local_script: "local.js".to_string(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url_prefix.starts_with('/') || !self.url_prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "url_prefix must start and end with '/'".into(),
            ));
        }
        if self.index_file.is_empty() || self.index_file.contains('/') {
            return Err(ConfigError::Validation(
                "index_file must be a bare file name".into(),
            ));
        }
        if self.local_script.is_empty() || self.local_script.contains('/') {
            return Err(ConfigError::Validation(
                "local_script must be a bare file name".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from `config.toml` in `inbox_root`, falling back to
/// stock defaults when the file doesn't exist.
pub fn load_config(inbox_root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = inbox_root.join(CONFIG_FILENAME);
    let config = if path.is_file() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A documented stock `config.toml` for `inkpress gen-config`.
pub fn stock_config_toml() -> String {
    let d = SiteConfig::default();
    format!(
        r#"# inkpress configuration. All options are optional; the values below
# are the stock defaults. Place this file in the inbox root.

# URL root under which shared assets (core script, stylesheet, favicon)
# are served. Script references starting with this prefix resolve against
# the shared asset version table.
url_prefix = "{}"

# Name of the index document inside every inbox and published folder.
# An index document of one byte or less marks the folder for deletion.
index_file = "{}"

# Sentinel name submissions use to reference their per-document script.
local_script = "{}"
"#,
        d.url_prefix, d.index_file, d.local_script
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(tmp.path()).unwrap();
        assert_eq!(cfg.url_prefix, "/blog/");
        assert_eq!(cfg.index_file, "i.html");
        assert_eq!(cfg.local_script, "local.js");
    }

    #[test]
    fn partial_override() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILENAME), "url_prefix = \"/docs/\"\n").unwrap();
        let cfg = load_config(tmp.path()).unwrap();
        assert_eq!(cfg.url_prefix, "/docs/");
        assert_eq!(cfg.index_file, "i.html");
    }

    #[test]
    fn unknown_keys_rejected() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILENAME), "url_prefics = \"/x/\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn bad_prefix_rejected() {
        let cfg = SiteConfig {
            url_prefix: "blog".into(),
            ..SiteConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn index_file_must_be_bare() {
        let cfg = SiteConfig {
            index_file: "a/i.html".into(),
            ..SiteConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let parsed: SiteConfig = toml::from_str(&stock_config_toml()).unwrap();
        assert_eq!(parsed.url_prefix, SiteConfig::default().url_prefix);
        assert_eq!(parsed.index_file, SiteConfig::default().index_file);
        assert_eq!(parsed.local_script, SiteConfig::default().local_script);
    }
}
