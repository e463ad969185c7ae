use super::ContentBackend;
use crate::{
    http,
    provision::{AccessToken, AclMode, ClientError, ContentProject, Dataset, OneTimeSecret},
};
use reqwest::{Client, Method};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use std::{collections::BTreeSet, fmt};
use tracing::info_span;

/// HTTP client for the content platform API.
#[derive(Clone)]
pub struct ContentBackendClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    studio_host: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetResponse {
    #[serde(default)]
    dataset_name: Option<String>,
    #[serde(default)]
    acl_mode: Option<AclMode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RoleRef {
    Name(String),
    Named { name: String },
}

// No Debug: `key` is the one-time token secret.
#[derive(Deserialize)]
struct TokenResponse {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    roles: Vec<RoleRef>,
}

impl ContentBackendClient {
    /// `api_url` is the platform host, `api_version` the versioned path prefix
    /// (e.g. `v2021-06-07`).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(api_url: &str, api_version: &str, token: SecretString) -> Result<Self, ClientError> {
        let base_url = format!(
            "{}/{}",
            api_url.trim_end_matches('/'),
            api_version.trim_matches('/')
        );
        http::endpoint_url(&base_url, &[])?;

        Ok(Self {
            client: http::client()?,
            base_url,
            token,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &serde_json::Value,
        operation: &'static str,
    ) -> Result<T, ClientError> {
        let url = http::endpoint_url(&self.base_url, segments)?;
        let span = info_span!(
            "content.request",
            operation,
            http.method = %method,
            url = %url
        );
        let request = http::request(&self.client, method, url, &self.token, Some(body));

        http::send(request, span).await
    }
}

impl fmt::Debug for ContentBackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentBackendClient")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

impl ContentBackend for ContentBackendClient {
    async fn create_project(&self, display_name: &str) -> Result<ContentProject, ClientError> {
        let response: ProjectResponse = self
            .call(
                Method::POST,
                &["projects"],
                &json!({ "displayName": display_name }),
                "create_project",
            )
            .await?;

        Ok(ContentProject {
            id: response.id,
            display_name: response
                .display_name
                .unwrap_or_else(|| display_name.to_string()),
            host: response.studio_host,
        })
    }

    async fn create_dataset(
        &self,
        project_id: &str,
        name: &str,
        acl_mode: AclMode,
    ) -> Result<Dataset, ClientError> {
        let response: DatasetResponse = self
            .call(
                Method::PUT,
                &["projects", project_id, "datasets", name],
                &json!({ "aclMode": acl_mode }),
                "create_dataset",
            )
            .await?;

        Ok(Dataset {
            name: response.dataset_name.unwrap_or_else(|| name.to_string()),
            acl_mode: response.acl_mode.unwrap_or(acl_mode),
        })
    }

    async fn create_token(
        &self,
        project_id: &str,
        label: &str,
        roles: &[String],
    ) -> Result<AccessToken, ClientError> {
        let response: TokenResponse = self
            .call(
                Method::POST,
                &["projects", project_id, "tokens"],
                &json!({ "label": label, "roles": roles }),
                "create_token",
            )
            .await?;

        let mut granted: BTreeSet<String> = response
            .roles
            .into_iter()
            .map(|role| match role {
                RoleRef::Name(name) | RoleRef::Named { name } => name,
            })
            .collect();
        if granted.is_empty() {
            granted = roles.iter().cloned().collect();
        }

        Ok(AccessToken {
            id: response.id,
            label: response.label.unwrap_or_else(|| label.to_string()),
            roles: granted,
            // The token exists even when the key is missing; the caller decides.
            secret: response
                .key
                .map(SecretString::from)
                .map_or_else(OneTimeSecret::empty, OneTimeSecret::new),
        })
    }
}
