//! Embedding configuration
//!
//! Controls how target class names are derived when an association does not
//! name its class explicitly. Can be loaded from YAML or the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{ModelError, ModelResult};
use crate::naming::NamingConvention;

/// Environment variable selecting the naming convention
pub const NAMING_ENV_VAR: &str = "ELIF_EMBED_NAMING";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// `classify`, `camelize`, or `custom: "<pattern>"`
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub naming: NamingConvention,
}

impl EmbedConfig {
    pub fn new(naming: NamingConvention) -> Self {
        Self { naming }
    }

    /// Parse configuration from a YAML document
    pub fn from_yaml_str(content: &str) -> ModelResult<Self> {
        let config: EmbedConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Configuration(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> ModelResult<Self> {
        let config = Self {
            naming: naming_from_var(env::var(NAMING_ENV_VAR))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ModelResult<()> {
        if let NamingConvention::Custom(pattern) = &self.naming {
            if !pattern.contains("{name}") {
                return Err(ModelError::Configuration(format!(
                    "Custom naming pattern '{}' must contain a {{name}} placeholder",
                    pattern
                )));
            }
        }
        Ok(())
    }
}

fn naming_from_var(value: Result<String, env::VarError>) -> ModelResult<NamingConvention> {
    match value {
        Ok(value) => parse_naming(&value),
        Err(env::VarError::NotPresent) => Ok(NamingConvention::default()),
        Err(env::VarError::NotUnicode(_)) => Err(ModelError::Configuration(format!(
            "{} is not valid unicode",
            NAMING_ENV_VAR
        ))),
    }
}

fn parse_naming(value: &str) -> ModelResult<NamingConvention> {
    match value.trim().to_lowercase().as_str() {
        "classify" => Ok(NamingConvention::Classify),
        "camelize" => Ok(NamingConvention::Camelize),
        _ if value.contains("{name}") => Ok(NamingConvention::Custom(value.trim().to_string())),
        _ => Err(ModelError::Configuration(format!(
            "Invalid value '{}' for {}: expected classify, camelize, or a pattern with {{name}}",
            value, NAMING_ENV_VAR
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_classify() {
        assert_eq!(EmbedConfig::default().naming, NamingConvention::Classify);
    }

    #[test]
    fn test_from_yaml_str() {
        let config = EmbedConfig::from_yaml_str("naming: camelize\n").unwrap();
        assert_eq!(config.naming, NamingConvention::Camelize);

        let config = EmbedConfig::from_yaml_str("naming:\n  custom: \"{name}Doc\"\n").unwrap();
        assert_eq!(config.naming, NamingConvention::Custom("{name}Doc".to_string()));

        let config = EmbedConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.naming, NamingConvention::Classify);
    }

    #[test]
    fn test_custom_pattern_requires_placeholder() {
        let err = EmbedConfig::from_yaml_str("naming:\n  custom: Document\n").unwrap_err();
        assert_eq!(
            err,
            ModelError::Configuration(
                "Custom naming pattern 'Document' must contain a {name} placeholder".to_string()
            )
        );
    }

    #[test]
    fn test_unknown_naming_is_rejected() {
        let result = EmbedConfig::from_yaml_str("naming: plural\n");
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_custom_naming_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "naming:\n  custom: \"{{name}}Record\"").unwrap();

        let config = EmbedConfig::from_file(file.path()).unwrap();
        assert_eq!(config.naming.class_name_for("projects"), "ProjectRecord");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "naming: classify").unwrap();

        let config = EmbedConfig::from_file(file.path()).unwrap();
        assert_eq!(config.naming, NamingConvention::Classify);
    }

    #[test]
    fn test_from_missing_file() {
        let result = EmbedConfig::from_file("/nonexistent/embed.yaml");
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn test_parse_naming() {
        assert_eq!(parse_naming("Camelize").unwrap(), NamingConvention::Camelize);
        assert_eq!(
            parse_naming("{name}Model").unwrap(),
            NamingConvention::Custom("{name}Model".to_string())
        );
        assert!(parse_naming("plural").is_err());
    }

    #[test]
    fn test_naming_from_env_value() {
        assert_eq!(
            naming_from_var(Err(env::VarError::NotPresent)).unwrap(),
            NamingConvention::Classify
        );
        assert_eq!(
            naming_from_var(Ok("camelize".to_string())).unwrap(),
            NamingConvention::Camelize
        );

        let result = naming_from_var(Err(env::VarError::NotUnicode(std::ffi::OsString::from("x"))));
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }
}
