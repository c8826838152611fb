//! Cluster client handle and HTTP transport.
//!
//! A [`ClusterHandle`] is bound to exactly one API dialect when it is built.
//! The resolver and adapters only ever call the per-dialect operations exposed
//! here; they never renegotiate the dialect.

use std::fmt;
use std::str::FromStr;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::version::ClusterVersion;

/// Administrative API family offered by a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    Elastic5,
    Elastic6,
    Elastic7,
}

impl Dialect {
    /// Dialect that serves a cluster of the given version.
    pub fn for_version(version: ClusterVersion) -> Result<Self> {
        match version.major {
            5 => Ok(Dialect::Elastic5),
            6 => Ok(Dialect::Elastic6),
            m if m >= 7 => Ok(Dialect::Elastic7),
            _ => Err(Error::capability(format!(
                "no client dialect for Elasticsearch {version}"
            ))),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v5" | "5" => Ok(Dialect::Elastic5),
            "v6" | "6" => Ok(Dialect::Elastic6),
            "v7" | "7" => Ok(Dialect::Elastic7),
            other => Err(Error::Config(format!("unknown dialect: {other:?}"))),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Elastic5 => write!(f, "v5"),
            Dialect::Elastic6 => write!(f, "v6"),
            Dialect::Elastic7 => write!(f, "v7"),
        }
    }
}

/// One entry of a `GET /_index_template/<name>` response.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexTemplateItem {
    pub name: String,
    pub index_template: Value,
}

#[derive(Debug, Deserialize)]
struct IndexTemplatesResponse {
    #[serde(default)]
    index_templates: Vec<IndexTemplateItem>,
}

#[derive(Debug, Deserialize)]
struct RootResponse {
    version: RootVersion,
}

#[derive(Debug, Deserialize)]
struct RootVersion {
    number: String,
}

/// HTTP transport for a single cluster.
#[derive(Clone)]
pub struct ClusterClient {
    http: reqwest::Client,
    base: Url,
    username: Option<String>,
    password: Option<String>,
}

impl fmt::Debug for ClusterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterClient")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ClusterClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base = Url::parse(config.base_url())
            .map_err(|e| Error::Config(format!("invalid url {:?}: {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("url {:?} cannot be a base", config.url)));
        }
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.username {
            Some(user) => builder.basic_auth(user, self.password.as_deref()),
            None => builder,
        }
    }

    /// Fetch the version string the cluster reports on `GET /`.
    pub async fn cluster_version(&self) -> Result<String> {
        let response = self.request(Method::GET, &[]).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::Remote {
                status: StatusCode::NOT_FOUND,
                error_type: "version_endpoint_missing".to_string(),
                reason: format!("no cluster info at {}", self.base),
            });
        }
        let response = check(response, "cluster").await?;
        let root: RootResponse = response.json().await?;
        Ok(root.version.number)
    }

    /// `PUT /_index_template/<name>`; with `create` the cluster refuses to replace.
    pub async fn put_index_template(&self, name: &str, body: &str, create: bool) -> Result<()> {
        let response = self
            .request(Method::PUT, &["_index_template", name])
            .query(&[("create", create)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?;
        check(response, name).await?;
        Ok(())
    }

    /// `GET /_index_template/<name>`.
    pub async fn get_index_template(&self, name: &str) -> Result<Vec<IndexTemplateItem>> {
        let response = self
            .request(Method::GET, &["_index_template", name])
            .send()
            .await?;
        let response = check(response, name).await?;
        let parsed: IndexTemplatesResponse = response.json().await?;
        Ok(parsed.index_templates)
    }

    /// `DELETE /_index_template/<name>`.
    pub async fn delete_index_template(&self, name: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &["_index_template", name])
            .send()
            .await?;
        check(response, name).await?;
        Ok(())
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check(response: Response, subject: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (error_type, reason) = parse_error_body(&body);

    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(subject.to_string()));
    }
    if is_conflict(status, &error_type, &reason) {
        return Err(Error::Conflict(format!("{subject}: {reason}")));
    }
    Err(Error::Remote {
        status,
        error_type,
        reason,
    })
}

fn is_conflict(status: StatusCode, error_type: &str, reason: &str) -> bool {
    if status == StatusCode::CONFLICT {
        return true;
    }
    // Elasticsearch reports a create collision as a 400
    status == StatusCode::BAD_REQUEST
        && (error_type == "resource_already_exists_exception"
            || (error_type == "illegal_argument_exception" && reason.contains("already exists")))
}

/// Extract `(type, reason)` from an Elasticsearch error document.
fn parse_error_body(body: &str) -> (String, String) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ("unknown".to_string(), body.trim().to_string());
    };
    match value.get("error") {
        Some(Value::Object(err)) => {
            let error_type = err
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let reason = err
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (error_type, reason)
        }
        Some(Value::String(reason)) => ("unknown".to_string(), reason.clone()),
        _ => ("unknown".to_string(), body.trim().to_string()),
    }
}

/// A ready-to-use client bound to one dialect.
#[derive(Debug, Clone)]
pub enum ClusterHandle {
    Elastic5(ClusterClient),
    Elastic6(ClusterClient),
    Elastic7(ClusterClient),
}

impl ClusterHandle {
    pub fn new(dialect: Dialect, client: ClusterClient) -> Self {
        match dialect {
            Dialect::Elastic5 => ClusterHandle::Elastic5(client),
            Dialect::Elastic6 => ClusterHandle::Elastic6(client),
            Dialect::Elastic7 => ClusterHandle::Elastic7(client),
        }
    }

    /// Build a handle, sniffing the dialect from the cluster unless the config pins it.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let client = ClusterClient::new(config)?;
        let dialect = match config.dialect {
            Some(dialect) => dialect,
            None => {
                let version: ClusterVersion = client.cluster_version().await?.parse()?;
                Dialect::for_version(version)?
            }
        };
        info!("Connected to {} using dialect {}", config.base_url(), dialect);
        Ok(Self::new(dialect, client))
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            ClusterHandle::Elastic5(_) => Dialect::Elastic5,
            ClusterHandle::Elastic6(_) => Dialect::Elastic6,
            ClusterHandle::Elastic7(_) => Dialect::Elastic7,
        }
    }

    pub fn client(&self) -> &ClusterClient {
        match self {
            ClusterHandle::Elastic5(c) | ClusterHandle::Elastic6(c) | ClusterHandle::Elastic7(c) => {
                c
            }
        }
    }
}
