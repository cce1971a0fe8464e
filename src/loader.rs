//! Schema Loading
//!
//! Discovers fieldset sources on disk, parses them in parallel and merges the
//! results into one [`Definitions`] map.
//!
//! Parsing fans out across a rayon pool with no shared state; each source
//! returns its own outcome. The merge runs afterwards on the calling thread in
//! source order, so a type declared by two sources always resolves to the one
//! that comes later in the list.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::error::{LoadFailure, Result, SchemaError, SourceError};
use crate::schema::{Definitions, SourceDocument, TypeDef};

/// File extensions recognized as schema sources
pub const SOURCE_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// One logical schema source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A YAML file on disk
    Path(PathBuf),
    /// YAML held in memory, labelled for error reporting
    Inline { label: String, content: String },
}

impl Source {
    pub fn inline(label: impl Into<String>, content: impl Into<String>) -> Self {
        Source::Inline {
            label: label.into(),
            content: content.into(),
        }
    }

    /// Name used in logs and errors
    pub fn label(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Inline { label, .. } => label.clone(),
        }
    }

    /// Read and parse this source into its type definitions.
    pub fn parse(&self) -> std::result::Result<Vec<TypeDef>, SourceError> {
        let content = match self {
            Source::Path(path) => fs::read_to_string(path).map_err(|error| SourceError::Io {
                source_name: self.label(),
                error,
            })?,
            Source::Inline { content, .. } => content.clone(),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        // a null document (`---`, comments only) declares nothing
        let document: Option<SourceDocument> =
            serde_yaml::from_str(&content).map_err(|error| SourceError::Yaml {
                source_name: self.label(),
                error,
            })?;
        Ok(document.map(SourceDocument::into_types).unwrap_or_default())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

/// List the schema files directly inside `dir`, sorted by path.
pub fn discover_sources(dir: &Path) -> Result<Vec<Source>> {
    if !dir.is_dir() {
        return Err(SchemaError::InvalidSourceDir(dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
                .unwrap_or(false)
        })
        .collect();

    if paths.is_empty() {
        return Err(SchemaError::NoDefinitions(dir.display().to_string()));
    }

    paths.sort();
    debug!(dir = %dir.display(), count = paths.len(), "discovered schema sources");
    Ok(paths.into_iter().map(Source::Path).collect())
}

/// Parse every source and merge the results.
///
/// Every source is attempted. If any fail, the returned [`LoadFailure`] lists
/// all of their errors and still carries the definitions that did load.
pub fn load_sources(sources: &[Source]) -> std::result::Result<Definitions, LoadFailure> {
    let outcomes: Vec<std::result::Result<Vec<TypeDef>, SourceError>> =
        sources.par_iter().map(Source::parse).collect();

    let mut definitions = Definitions::new();
    let mut errors = Vec::new();

    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(types) => {
                debug!(source = %source.label(), types = types.len(), "loaded schema source");
                for def in types {
                    let name = def.name.clone();
                    if definitions.insert(def).is_some() {
                        warn!(
                            type_name = %name,
                            source = %source.label(),
                            "type redeclared, later source wins"
                        );
                    }
                }
            }
            Err(err) => {
                error!(source = %err.source_name(), "{}", err);
                errors.push(err);
            }
        }
    }

    if errors.is_empty() {
        Ok(definitions)
    } else {
        Err(LoadFailure::new(errors, definitions))
    }
}

/// Discover and load every schema source in a directory.
pub fn load_dir(dir: &Path) -> Result<Definitions> {
    let sources = discover_sources(dir)?;
    Ok(load_sources(&sources)?)
}
