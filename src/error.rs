//! Error types for schema ingestion, graph construction and generation

use std::fmt;

use thiserror::Error;

use crate::schema::Definitions;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema graph errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Malformed field path '{path}' in type '{type_name}': {reason}")]
    MalformedPath {
        type_name: String,
        path: String,
        reason: &'static str,
    },

    #[error("Empty {what} name in type '{type_name}'")]
    EmptyName { what: &'static str, type_name: String },

    #[error("Invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Source directory {0} does not exist or is not a directory")]
    InvalidSourceDir(String),

    #[error("No schema definitions (*.yml, *.yaml) found in {0}")]
    NoDefinitions(String),

    #[error(transparent)]
    Load(#[from] LoadFailure),

    #[error("Generator '{0}' is already registered")]
    DuplicateGenerator(String),

    #[error("Unknown generator '{name}'. Valid options: {available}")]
    UnknownGenerator { name: String, available: String },

    #[error("Invalid settings for generator '{generator}': {message}")]
    InvalidSettings { generator: String, message: String },

    #[error("Members '{first}' and '{second}' of type '{type_name}' both emit as '{member}'")]
    MemberCollision {
        type_name: String,
        member: String,
        first: String,
        second: String,
    },

    #[error("No translation for type '{field_type}' (field {field})")]
    UnsupportedType { field_type: String, field: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SchemaError {
    pub(crate) fn malformed(
        type_name: impl Into<String>,
        path: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::MalformedPath {
            type_name: type_name.into(),
            path: path.into(),
            reason,
        }
    }
}

/// A single schema source that could not be read or parsed
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("error reading schema source {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("error parsing schema source {source_name}: {error}")]
    Yaml {
        source_name: String,
        #[source]
        error: serde_yaml::Error,
    },
}

impl SourceError {
    /// Label of the source that failed
    pub fn source_name(&self) -> &str {
        match self {
            SourceError::Io { source_name, .. } | SourceError::Yaml { source_name, .. } => {
                source_name
            }
        }
    }
}

/// Every source failure from one ingestion run, plus what did load.
#[derive(Debug)]
pub struct LoadFailure {
    errors: Vec<SourceError>,
    partial: Definitions,
}

impl LoadFailure {
    pub(crate) fn new(errors: Vec<SourceError>, partial: Definitions) -> Self {
        Self { errors, partial }
    }

    /// Individual source errors, in source order
    pub fn errors(&self) -> &[SourceError] {
        &self.errors
    }

    /// Definitions from the sources that loaded cleanly
    pub fn partial(&self) -> &Definitions {
        &self.partial
    }

    pub fn into_partial(self) -> Definitions {
        self.partial
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema source(s) failed to load", self.errors.len())?;
        for error in &self.errors {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadFailure {}
