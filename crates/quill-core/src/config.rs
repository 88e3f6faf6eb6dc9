//! Quill configuration file (`quill.toml`) parsing

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::{GenerationMarker, Highlight, RenderOptions};
use crate::sink::{SqlOptions, XmlSiteInfo};

/// Default configuration file name
pub const CONFIG_FILE: &str = "quill.toml";

/// The complete quill.toml configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuillConfig {
    /// Page rendering settings.
    #[serde(default)]
    pub render: RenderSection,

    /// Wiki site metadata used by the XML dump and the index page.
    #[serde(default)]
    pub wiki: WikiSection,

    /// Relational sink settings.
    #[serde(default)]
    pub sql: SqlSection,

    /// JSON file listing extra type names to cross-link.
    #[serde(default)]
    pub user_types: Option<PathBuf>,
}

/// Values supplied on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub highlight: Option<String>,
    pub no_marker: bool,
    pub no_marker_seconds: bool,
    pub project_name: Option<String>,
    pub site_name: Option<String>,
    pub base_url: Option<String>,
    pub contributor: Option<String>,
    pub sql_batch: bool,
    pub sql_batch_size: Option<usize>,
    pub sql_batch_id: Option<String>,
    pub user_types: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    /// Syntax highlight language (`normal` and `fallback` are aliases).
    pub highlight: String,
    /// Embed the invisible generation marker.
    pub marker: bool,
    /// Keep seconds in the marker timestamp.
    pub marker_seconds: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            highlight: "papyrus".to_string(),
            marker: true,
            marker_seconds: true,
        }
    }
}

/// `[wiki]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiSection {
    pub project_name: String,
    pub site_name: String,
    pub base_url: String,
    pub contributor: String,
}

impl Default for WikiSection {
    fn default() -> Self {
        Self {
            project_name: "PapyrusDocs".to_string(),
            site_name: "PapyrusDocs".to_string(),
            base_url: "http://localhost/wiki/Main_Page".to_string(),
            contributor: "Quill".to_string(),
        }
    }
}

/// `[sql]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SqlSection {
    /// Buffer rows and insert them in bulk.
    pub batch: bool,
    pub batch_size: usize,
    pub batch_id: Option<String>,
}

impl Default for SqlSection {
    fn default() -> Self {
        Self {
            batch: false,
            batch_size: 500,
            batch_id: None,
        }
    }
}

impl QuillConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load `quill.toml` from a directory when present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.highlight.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "render.highlight must not be empty".to_string(),
            ));
        }
        if self.sql.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "sql.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply command line overrides and re-validate.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(highlight) = overrides.highlight {
            self.render.highlight = highlight;
        }
        if overrides.no_marker {
            self.render.marker = false;
        }
        if overrides.no_marker_seconds {
            self.render.marker_seconds = false;
        }
        if let Some(name) = overrides.project_name {
            self.wiki.project_name = name;
        }
        if let Some(name) = overrides.site_name {
            self.wiki.site_name = name;
        }
        if let Some(url) = overrides.base_url {
            self.wiki.base_url = url;
        }
        if let Some(user) = overrides.contributor {
            self.wiki.contributor = user;
        }
        if overrides.sql_batch {
            self.sql.batch = true;
        }
        if let Some(size) = overrides.sql_batch_size {
            self.sql.batch_size = size;
        }
        if overrides.sql_batch_id.is_some() {
            self.sql.batch_id = overrides.sql_batch_id;
        }
        if overrides.user_types.is_some() {
            self.user_types = overrides.user_types;
        }
        self.validate()
    }

    /// Rendering options described by the `[render]` section.
    pub fn render_options(&self) -> RenderOptions {
        let marker = match (self.render.marker, self.render.marker_seconds) {
            (false, _) => GenerationMarker::Off,
            (true, true) => GenerationMarker::Seconds,
            (true, false) => GenerationMarker::Minutes,
        };
        RenderOptions {
            highlight: Highlight::for_language(&self.render.highlight),
            marker,
        }
    }

    /// Site metadata for the XML dump sink.
    pub fn site_info(&self) -> XmlSiteInfo {
        XmlSiteInfo {
            site_name: self.wiki.site_name.clone(),
            base_url: self.wiki.base_url.clone(),
            contributor: self.wiki.contributor.clone(),
            ..XmlSiteInfo::default()
        }
    }

    /// Options for the relational sink.
    pub fn sql_options(&self) -> SqlOptions {
        SqlOptions {
            batch: self.sql.batch,
            batch_size: self.sql.batch_size,
            batch_id: self.sql.batch_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = QuillConfig::parse("").unwrap();
        assert_eq!(config, QuillConfig::default());
        assert_eq!(config.render_options().marker, GenerationMarker::Seconds);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
user_types = "types.json"

[render]
highlight = "fallback"
marker_seconds = false

[wiki]
project_name = "Starbase"
site_name = "Starbase Wiki"
contributor = "DocBot"

[sql]
batch = true
batch_size = 50
batch_id = "nightly"
"#;
        let config = QuillConfig::parse(toml).unwrap();
        assert_eq!(config.user_types, Some(PathBuf::from("types.json")));
        assert_eq!(config.render_options().marker, GenerationMarker::Minutes);
        assert_eq!(config.render_options().highlight.language(), "AutoIt");
        assert_eq!(config.site_info().site_name, "Starbase Wiki");
        assert_eq!(config.site_info().contributor, "DocBot");
        let sql = config.sql_options();
        assert!(sql.batch);
        assert_eq!(sql.batch_size, 50);
        assert_eq!(sql.batch_id.as_deref(), Some("nightly"));
    }

    #[test]
    fn test_marker_disabled() {
        let config = QuillConfig::parse("[render]\nmarker = false\n").unwrap();
        assert_eq!(config.render_options().marker, GenerationMarker::Off);
    }

    #[test]
    fn test_invalid_batch_size() {
        let result = QuillConfig::parse("[sql]\nbatch_size = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = QuillConfig::parse("[render]\ncolour = true\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = QuillConfig::parse("[sql]\nbatch_size = 10\n").unwrap();
        config
            .apply_overrides(ConfigOverrides {
                highlight: Some("normal".to_string()),
                no_marker: true,
                contributor: Some("Editor".to_string()),
                sql_batch: true,
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.render_options().highlight.language(), "papyrus");
        assert_eq!(config.render_options().marker, GenerationMarker::Off);
        assert_eq!(config.wiki.contributor, "Editor");
        assert!(config.sql.batch);
        assert_eq!(config.sql.batch_size, 10);
    }

    #[test]
    fn test_override_rejects_zero_batch() {
        let mut config = QuillConfig::default();
        let result = config.apply_overrides(ConfigOverrides {
            sql_batch_size: Some(0),
            ..ConfigOverrides::default()
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_discover_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(QuillConfig::discover(dir.path()).unwrap(), QuillConfig::default());
    }
}
