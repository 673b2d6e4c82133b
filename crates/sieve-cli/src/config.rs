//! # Configuration File
//!
//! A YAML file holding the batch settings, so a pipeline stage can be
//! described once and rerun. Every field is optional; command-line flags
//! override what the file sets.
//!
//! ```yaml
//! schema_path: schemas/customer.schema.json
//! data_source: customJson
//! custom_json_pointer: /body
//! continue_on_fail: true
//! engine:
//!   draft: draft7
//!   validateFormats: true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use sieve_core::{ConfigError, DataSource, JsonInput};
use sieve_schema::EngineOptions;

/// Settings as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Inline schema, as JSON text or as a YAML mapping.
    pub schema: Option<JsonInput>,
    /// Schema file, relative to the configuration file.
    pub schema_path: Option<PathBuf>,
    /// What to validate per record.
    pub data_source: Option<DataSource>,
    /// Custom JSON used for every record.
    pub custom_json: Option<JsonInput>,
    /// JSON Pointer into each record selecting its custom JSON.
    pub custom_json_pointer: Option<String>,
    /// Route per-record failures to the invalid output.
    pub continue_on_fail: Option<bool>,
    /// Compiler options.
    pub engine: Option<EngineOptions>,
}

impl FileConfig {
    /// Load and check a configuration file.
    ///
    /// A relative `schema_path` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        if let (Some(schema_path), Some(dir)) = (&config.schema_path, path.parent()) {
            if schema_path.is_relative() {
                config.schema_path = Some(dir.join(schema_path));
            }
        }

        config.check()?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Reject settings that exclude each other.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.schema.is_some() && self.schema_path.is_some() {
            return Err(ConfigError::Conflict(
                "`schema` and `schema_path` are mutually exclusive".to_string(),
            ));
        }
        if self.custom_json.is_some() && self.custom_json_pointer.is_some() {
            return Err(ConfigError::Conflict(
                "`custom_json` and `custom_json_pointer` are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_config() {
        let config: FileConfig = serde_yaml::from_str(
            r#"
schema:
  type: object
  required: [name]
data_source: customJson
custom_json_pointer: /body
continue_on_fail: true
engine:
  draft: draft7
"#,
        )
        .unwrap();
        assert_eq!(
            config.schema,
            Some(JsonInput::from(json!({"type": "object", "required": ["name"]})))
        );
        assert_eq!(config.data_source, Some(DataSource::CustomJson));
        assert_eq!(config.custom_json_pointer.as_deref(), Some("/body"));
        assert_eq!(config.continue_on_fail, Some(true));
        let engine = config.engine.unwrap();
        assert!(engine.validate_formats);
        assert_eq!(engine.draft, Some(sieve_schema::SchemaDraft::Draft7));
    }

    #[test]
    fn schema_text_stays_text() {
        let config: FileConfig = serde_yaml::from_str(r#"schema: '{"type": "string"}'"#).unwrap();
        assert_eq!(config.schema, Some(JsonInput::from(r#"{"type": "string"}"#)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_yaml::from_str::<FileConfig>("shema: {}").is_err());
    }

    #[test]
    fn unknown_data_source_is_rejected() {
        assert!(serde_yaml::from_str::<FileConfig>("data_source: everything").is_err());
    }

    #[test]
    fn conflicting_schema_settings_are_rejected() {
        let config = FileConfig {
            schema: Some(JsonInput::from("{}")),
            schema_path: Some(PathBuf::from("s.json")),
            ..FileConfig::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::Conflict(_))));
    }

    #[test]
    fn schema_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sieve.yaml");
        std::fs::write(&path, "schema_path: schemas/a.json\n").unwrap();
        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.schema_path, Some(dir.path().join("schemas/a.json")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config file"));
    }
}
