//! Fieldset Graph
//!
//! Builds a typed object graph from flat, dot-addressed field schemas (fieldset
//! definitions such as `client.nat.ip`) and drives code generators off it.
//!
//! ## Features
//!
//! - **Parallel Ingestion**: YAML sources parsed concurrently, every failure reported
//! - **Path Chains**: `tls.server.hash.sha1` becomes `tls -> tls_server -> tls_server_hash`
//! - **Shared Reuse**: reusable fieldsets embedded by reference, never copied
//! - **Deterministic Output**: all enumeration sorted by snake-cased identifier
//! - **Pluggable Generators**: debug tree, JSON snapshot, Rust structs, Avro schema
//!
//! ## Pipeline
//!
//! ```text
//! *.yml ──load_sources──▶ Definitions ──Namespace::build──▶ Namespace
//!                                                              │
//!                                      walk / snapshot ◀───────┤
//!                                                              ▼
//!                                                  Registry ─▶ artifacts
//! ```

pub mod codegen;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod naming;
pub mod schema;
pub mod walk;

pub use codegen::{GenContext, Generator, GeneratorSettings, Registry};
pub use config::GenConfig;
pub use error::{LoadFailure, Result, SchemaError, SourceError};
pub use filter::{FieldFilter, FilterConfig};
pub use graph::{Field, Link, LinkKind, Namespace, NamespaceSnapshot, Object, ObjectId};
pub use loader::{discover_sources, load_dir, load_sources, Source};
pub use naming::{Casing, Identifier, NamingConfig};
pub use schema::{Definitions, FieldDef, ReusableDef, TypeDef};
pub use walk::{walk, Node, NodeKind, Visit, Walkable};
