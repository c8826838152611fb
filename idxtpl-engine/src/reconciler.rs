//! Template reconciler - drives index templates on a cluster towards declared state.
//!
//! Every operation resolves the handle's capability first, then issues exactly
//! one adapter call. Two absences are not errors: deleting a missing template
//! succeeds, and reading one reports [`Outcome::NotFound`].

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::ClusterHandle;
use crate::equivalence::suppress_diff;
use crate::error::{Error, Result};
use crate::resolver::adapter_for;

/// Durable identifier of a template; never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Parse("template name must not be empty".into()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Desired template document, guaranteed to be a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBody(String);

impl TemplateBody {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(_)) => Ok(Self(text)),
            Ok(_) => Err(Error::Parse("template body must be a JSON object".into())),
            Err(e) => Err(Error::Parse(e.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a reconciliation step, handed to whoever persists identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// Remote body already matched the desired one; nothing was written.
    Unchanged,
    Found(String),
    /// The template is gone; the caller should forget the identity.
    NotFound,
    Deleted,
    Imported(String),
}

/// Create or replace a template on the cluster.
pub async fn put(handle: &ClusterHandle, name: &str, body: &str, create: bool) -> Result<()> {
    let adapter = adapter_for(handle).await?;
    adapter.put(name, body, create).await
}

/// Fetch a template as canonical JSON.
pub async fn get(handle: &ClusterHandle, name: &str) -> Result<String> {
    let adapter = adapter_for(handle).await?;
    adapter.get(name).await
}

/// Delete a template; a template that is already absent counts as deleted.
pub async fn delete(handle: &ClusterHandle, name: &str) -> Result<()> {
    let adapter = adapter_for(handle).await?;
    match adapter.delete(name).await {
        Err(Error::NotFound(_)) => {
            info!("Index template {} already absent", name);
            Ok(())
        }
        other => other,
    }
}

/// Trait for resource reconcilers.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// The declared state.
    type Spec;
    /// The outcome reported back.
    type Status;

    /// Compare desired vs actual state and converge.
    async fn reconcile(&self, id: &str, spec: &Self::Spec) -> Result<Self::Status>;

    /// Remove the resource.
    async fn finalize(&self, id: &str) -> Result<()>;
}

/// Index template reconciler bound to one cluster handle.
pub struct TemplateReconciler {
    handle: ClusterHandle,
}

impl TemplateReconciler {
    pub fn new(handle: ClusterHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ClusterHandle {
        &self.handle
    }

    /// Absent -> Present. A name that already exists is a conflict, never an update.
    pub async fn create(&self, name: &TemplateName, body: &TemplateBody) -> Result<Outcome> {
        put(&self.handle, name.as_str(), body.as_str(), true).await?;
        info!("Created index template {}", name);
        Ok(Outcome::Created)
    }

    /// Present -> Present. Upserts, so it also succeeds when the template is missing.
    pub async fn update(&self, name: &TemplateName, body: &TemplateBody) -> Result<Outcome> {
        put(&self.handle, name.as_str(), body.as_str(), false).await?;
        info!("Updated index template {}", name);
        Ok(Outcome::Updated)
    }

    pub async fn read(&self, name: &TemplateName) -> Result<Outcome> {
        let adapter = adapter_for(&self.handle).await?;
        match adapter.get(name.as_str()).await {
            Ok(body) => Ok(Outcome::Found(body)),
            Err(Error::NotFound(_)) => {
                warn!("Index template ({}) not found, removing from state", name);
                Ok(Outcome::NotFound)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, name: &TemplateName) -> Result<Outcome> {
        delete(&self.handle, name.as_str()).await?;
        info!("Deleted index template {}", name);
        Ok(Outcome::Deleted)
    }

    /// Adopt an existing remote template. Unlike `read`, absence is an error.
    pub async fn import(&self, name: &TemplateName) -> Result<Outcome> {
        let body = get(&self.handle, name.as_str()).await?;
        info!("Imported index template {}", name);
        Ok(Outcome::Imported(body))
    }

    pub async fn exists(&self, name: &TemplateName) -> Result<bool> {
        Ok(matches!(self.read(name).await?, Outcome::Found(_)))
    }
}

#[async_trait]
impl Reconciler for TemplateReconciler {
    type Spec = TemplateBody;
    type Status = Outcome;

    async fn reconcile(&self, id: &str, spec: &Self::Spec) -> Result<Self::Status> {
        let name = TemplateName::new(id)?;
        info!("Reconciling index template {}", name);

        match self.read(&name).await? {
            Outcome::Found(current) if suppress_diff(&current, spec.as_str()) => {
                Ok(Outcome::Unchanged)
            }
            Outcome::Found(_) => self.update(&name, spec).await,
            _ => self.create(&name, spec).await,
        }
    }

    async fn finalize(&self, id: &str) -> Result<()> {
        info!("Finalizing (deleting) index template {}", id);
        let name = TemplateName::new(id)?;
        self.delete(&name).await?;
        Ok(())
    }
}
