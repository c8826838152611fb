//! Version resolver - decides whether a cluster can serve the index template API.
//!
//! Capability is derived fresh from the live handle on every call and never
//! cached: a handle may outlive the assumptions it was built under.

use tracing::debug;

use crate::client::{ClusterHandle, Dialect};
use crate::dialect::{DialectAdapter, IndexTemplateV2};
use crate::error::{Error, Result};
use crate::version::ClusterVersion;

/// First release that ships the composable index template API.
pub const MIN_INDEX_TEMPLATE_VERSION: ClusterVersion = ClusterVersion::new(7, 8, 0);

/// What a cluster offers for index template management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    pub dialect: Dialect,
    /// Only queried for dialects that could plausibly support the feature.
    pub version: Option<ClusterVersion>,
    pub index_template_v2: bool,
}

/// Determine the capability of a handle without failing on an unsupported cluster.
///
/// Performs one round-trip for the v7 dialect and none for older dialects.
pub async fn probe(handle: &ClusterHandle) -> Result<Capability> {
    match handle {
        ClusterHandle::Elastic7(client) => {
            let version: ClusterVersion = client.cluster_version().await?.parse()?;
            debug!("Cluster reports version {}", version);
            Ok(Capability {
                dialect: Dialect::Elastic7,
                version: Some(version),
                index_template_v2: version >= MIN_INDEX_TEMPLATE_VERSION,
            })
        }
        ClusterHandle::Elastic5(_) | ClusterHandle::Elastic6(_) => Ok(Capability {
            dialect: handle.dialect(),
            version: None,
            index_template_v2: false,
        }),
    }
}

/// Resolve a capability, failing with [`Error::Capability`] when the feature is unusable.
pub async fn resolve(handle: &ClusterHandle) -> Result<Capability> {
    let capability = probe(handle).await?;
    if capability.index_template_v2 {
        return Ok(capability);
    }
    let reason = match capability.version {
        Some(version) => format!("cluster runs {version}"),
        None => format!("dialect {} has no index template API", capability.dialect),
    };
    Err(Error::capability(reason))
}

/// Resolve the handle and select the adapter for its dialect.
pub async fn adapter_for(handle: &ClusterHandle) -> Result<Box<dyn DialectAdapter + '_>> {
    let capability = resolve(handle).await?;
    match (capability.dialect, handle) {
        (Dialect::Elastic7, ClusterHandle::Elastic7(client)) => {
            Ok(Box::new(IndexTemplateV2::new(client)))
        }
        (dialect, _) => Err(Error::capability(format!(
            "no index template adapter for dialect {dialect}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClusterClient;
    use crate::config::ClientConfig;

    fn handle(dialect: Dialect) -> ClusterHandle {
        // Nothing listens here; legacy dialects must not touch the network.
        let client = ClusterClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        ClusterHandle::new(dialect, client)
    }

    #[tokio::test]
    async fn test_legacy_dialects_rejected_without_round_trip() {
        for dialect in [Dialect::Elastic5, Dialect::Elastic6] {
            let capability = probe(&handle(dialect)).await.unwrap();
            assert_eq!(capability.dialect, dialect);
            assert_eq!(capability.version, None);
            assert!(!capability.index_template_v2);

            let err = resolve(&handle(dialect)).await.unwrap_err();
            assert!(err.is_capability(), "unexpected error: {err}");
        }
    }

    #[tokio::test]
    async fn test_adapter_for_legacy_dialect_fails() {
        let h = handle(Dialect::Elastic6);
        let err = adapter_for(&h).await.err().unwrap();
        assert!(err.is_capability());
    }

    #[test]
    fn test_minimum_version() {
        assert_eq!(MIN_INDEX_TEMPLATE_VERSION.to_string(), "7.8.0");
    }
}
