//! Dialect adapters for the index template API.
//!
//! The resolver picks one adapter per handle; the reconciler then works only
//! against the [`DialectAdapter`] trait.

mod v7;

pub use v7::IndexTemplateV2;

use async_trait::async_trait;

use crate::error::Result;

/// Template operations offered by a supported dialect.
#[async_trait]
pub trait DialectAdapter: Send + Sync {
    /// Create or replace a template. With `create` set, an existing template
    /// yields [`crate::Error::Conflict`]; otherwise the call is an upsert.
    async fn put(&self, name: &str, body: &str, create: bool) -> Result<()>;

    /// Fetch a template as canonical JSON, or [`crate::Error::NotFound`].
    async fn get(&self, name: &str) -> Result<String>;

    /// Delete a template. Absence is reported as [`crate::Error::NotFound`].
    async fn delete(&self, name: &str) -> Result<()>;
}
