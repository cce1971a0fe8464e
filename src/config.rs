//! Configuration management for fieldset-gen
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (fieldset-gen.toml)
//! - Environment variables (FIELDSET_GEN__*)
//!
//! ## Example config file (fieldset-gen.toml):
//! ```toml
//! [source]
//! dir = "./schemas"
//!
//! [output]
//! dir = "./generated"
//! generators = ["rust", "avro"]
//!
//! [naming]
//! acronyms = ["IP", "DNS", "TLS"]
//!
//! [filter]
//! allow = ["^client\\.", "^tls\\."]
//! deny = ["\\.original$"]
//!
//! [avro]
//! namespace = "com.example"
//! name = "Event"
//! owner = "Jane Engineer"
//!
//! [rust]
//! derives = ["Debug", "Clone", "Serialize", "Deserialize"]
//! ```

use std::path::{Path, PathBuf};

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::codegen::{AvroSettings, GeneratorSettings, RustSettings};
use crate::error::{Result, SchemaError};
use crate::filter::{FieldFilter, FilterConfig};
use crate::naming::{Casing, NamingConfig};

/// Environment variable prefix (`FIELDSET_GEN__OUTPUT__DIR`)
pub const ENV_PREFIX: &str = "FIELDSET_GEN";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Where schema sources are read from
    #[serde(default)]
    pub source: SourceConfig,

    /// Where artifacts go and which generators run
    #[serde(default)]
    pub output: OutputConfig,

    /// Acronym table for identifier casing
    #[serde(default)]
    pub naming: NamingConfig,

    /// Field allow/deny patterns
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub avro: AvroSettings,

    #[serde(default)]
    pub rust: RustSettings,
}

/// Source configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding `*.yml` fieldset definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Generator ids to run
    #[serde(default = "default_generators")]
    pub generators: Vec<String>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_generators() -> Vec<String> {
    vec!["rust".to_string()]
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            generators: default_generators(),
        }
    }
}

impl GenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "fieldset-gen.toml",
            ".fieldset-gen.toml",
            "config/fieldset-gen.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "fieldset", "fieldset-gen")
        {
            let xdg_config = config_dir.config_dir().join("fieldset-gen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("output.generators")
                .with_list_parse_key("naming.acronyms")
                .with_list_parse_key("filter.allow")
                .with_list_parse_key("filter.deny")
                .with_list_parse_key("rust.derives")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SchemaError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that a generation run can start
    pub fn validate(&self) -> Result<()> {
        let source_dir = self
            .source
            .dir
            .as_ref()
            .ok_or_else(|| SchemaError::InvalidConfig("source.dir is not set".to_string()))?;
        if !source_dir.is_dir() {
            return Err(SchemaError::InvalidSourceDir(
                source_dir.display().to_string(),
            ));
        }

        if self.output.dir.as_os_str().is_empty() {
            return Err(SchemaError::InvalidConfig("output.dir is empty".to_string()));
        }

        if self.output.generators.is_empty() {
            return Err(SchemaError::InvalidConfig(
                "output.generators lists no generators".to_string(),
            ));
        }

        self.field_filter()?;
        Ok(())
    }

    /// Acronym table built from `[naming]`
    pub fn casing(&self) -> Casing {
        Casing::new(&self.naming)
    }

    /// Compiled `[filter]` patterns
    pub fn field_filter(&self) -> Result<FieldFilter> {
        FieldFilter::from_config(&self.filter)
    }

    /// Per-generator settings
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            avro: self.avro.clone(),
            rust: self.rust.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert_eq!(config.output.generators, vec!["rust"]);
        assert_eq!(config.output.dir, PathBuf::from("generated"));
        assert!(config.naming.acronyms.contains(&"DNS".to_string()));
        assert!(config.source.dir.is_none());
    }

    #[test]
    fn test_serialize_config() {
        let config = GenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[naming]"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fieldset-gen.toml");

        let mut config = GenConfig::default();
        config.source.dir = Some(dir.path().to_path_buf());
        config.output.generators = vec!["debug".to_string(), "avro".to_string()];
        config.filter.deny = vec![r"\.original$".to_string()];
        config.avro.owner = Some("Jane Engineer".to_string());
        config.save(&path).unwrap();

        let loaded = GenConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.source.dir, config.source.dir);
        assert_eq!(loaded.output.generators, config.output.generators);
        assert_eq!(loaded.filter.deny, config.filter.deny);
        assert_eq!(loaded.avro.owner.as_deref(), Some("Jane Engineer"));
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(GenConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let mut config = GenConfig::default();
        assert!(matches!(config.validate(), Err(SchemaError::InvalidConfig(_))));

        config.source.dir = Some(dir.path().join("missing"));
        assert!(matches!(config.validate(), Err(SchemaError::InvalidSourceDir(_))));

        config.source.dir = Some(dir.path().to_path_buf());
        config.output.generators.clear();
        assert!(matches!(config.validate(), Err(SchemaError::InvalidConfig(_))));

        config.output.generators = vec!["json".to_string()];
        config.filter.allow = vec!["(".to_string()];
        assert!(matches!(config.validate(), Err(SchemaError::InvalidPattern { .. })));
    }

    #[test]
    fn test_casing_from_naming() {
        let config = GenConfig {
            naming: NamingConfig {
                acronyms: vec!["TLS".to_string()],
            },
            ..Default::default()
        };
        let casing = config.casing();
        assert_eq!(casing.acronym("tls"), Some("TLS"));
        assert_eq!(casing.acronym("ip"), None);
    }
}
