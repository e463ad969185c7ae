use super::HostingBackend;
use crate::{
    http,
    provision::{ClientError, EnvUpsertAck, EnvVarSpec, HostingProject, SourceRepository},
};
use reqwest::{Client, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::info_span;
use url::Url;

/// HTTP client for the hosting platform API, optionally scoped to a team.
#[derive(Clone)]
pub struct HostingClient {
    client: Client,
    base_url: String,
    token: SecretString,
    team_id: Option<String>,
}

#[derive(Deserialize)]
struct ProjectResponse {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl HostingClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        token: SecretString,
        team_id: Option<String>,
    ) -> Result<Self, ClientError> {
        let base_url = api_url.trim_end_matches('/').to_string();
        http::endpoint_url(&base_url, &[])?;

        Ok(Self {
            client: http::client()?,
            base_url,
            token,
            team_id: team_id.filter(|id| !id.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = http::endpoint_url(&self.base_url, segments)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if let Some(team_id) = &self.team_id {
                pairs.append_pair("teamId", team_id);
            }
        }
        // `query_pairs_mut` leaves a dangling `?` when nothing was appended
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &Value,
        operation: &'static str,
    ) -> Result<T, ClientError> {
        let span = info_span!(
            "hosting.request",
            operation,
            http.method = "POST",
            url = %url
        );
        let request = http::request(&self.client, Method::POST, url, &self.token, Some(body));

        http::send(request, span).await
    }
}

impl fmt::Debug for HostingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostingClient")
            .field("base_url", &self.base_url)
            .field("team_id", &self.team_id)
            .field("token", &"***")
            .finish_non_exhaustive()
    }
}

impl HostingBackend for HostingClient {
    async fn create_project(
        &self,
        name: &str,
        framework: &str,
        repository: &SourceRepository,
    ) -> Result<HostingProject, ClientError> {
        let body = json!({
            "name": name,
            "framework": framework,
            "gitRepository": {
                "type": repository.provider,
                "repo": repository.repo,
                "ref": repository.git_ref,
            },
        });
        let url = self.url(&["v10", "projects"], &[])?;
        let response: ProjectResponse = self.call(url, &body, "create_project").await?;

        Ok(HostingProject {
            id: response.id,
            name: response.name.unwrap_or_else(|| name.to_string()),
            source_repository: repository.clone(),
        })
    }

    async fn upsert_env_vars(
        &self,
        project: &str,
        specs: &[EnvVarSpec],
    ) -> Result<EnvUpsertAck, ClientError> {
        // The only place an encrypted value is exposed: the request body itself.
        let body = Value::Array(
            specs
                .iter()
                .map(|spec| {
                    json!({
                        "key": spec.key,
                        "value": spec.value.expose_secret(),
                        "type": spec.sensitivity,
                        "target": spec.targets,
                    })
                })
                .collect(),
        );
        let url = self.url(&["v10", "projects", project, "env"], &[("upsert", "true")])?;
        let _: Value = self.call(url, &body, "upsert_env_vars").await?;

        Ok(EnvUpsertAck { count: specs.len() })
    }
}
