//! idxtpl-engine: reconciles declared index templates against Elasticsearch.
//!
//! - `resolver` decides whether a cluster can serve `/_index_template`
//! - `dialect` holds the per-dialect adapters behind one trait
//! - `equivalence` compares template bodies semantically
//! - `reconciler` sequences create, read, update, delete and import
//!
//! # Example
//! ```ignore
//! use idxtpl_engine::{ClientConfig, ClusterHandle, TemplateBody, TemplateName, TemplateReconciler};
//!
//! let handle = ClusterHandle::connect(&ClientConfig::from_env()?).await?;
//! let reconciler = TemplateReconciler::new(handle);
//! let name = TemplateName::new("logs")?;
//! reconciler.create(&name, &TemplateBody::parse(r#"{"index_patterns":["logs-*"]}"#)?).await?;
//! ```

pub mod client;
pub mod config;
pub mod dialect;
pub mod equivalence;
pub mod error;
pub mod reconciler;
pub mod resolver;
pub mod version;

pub use client::{ClusterClient, ClusterHandle, Dialect};
pub use config::ClientConfig;
pub use dialect::DialectAdapter;
pub use equivalence::{equivalent, suppress_diff};
pub use error::{Error, Result};
pub use reconciler::{Outcome, Reconciler, TemplateBody, TemplateName, TemplateReconciler};
pub use resolver::{Capability, MIN_INDEX_TEMPLATE_VERSION};
pub use version::ClusterVersion;
