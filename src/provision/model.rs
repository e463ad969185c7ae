//! Records exchanged with the two platforms and the result handed back to callers.

use super::secret::OneTimeSecret;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use utoipa::ToSchema;

/// Remote platform a step talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Content,
    Hosting,
}

impl Platform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Hosting => "hosting",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five pipeline steps, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStep {
    CreateContentProject,
    CreateDataset,
    CreateToken,
    CreateHostingProject,
    UpsertEnvVars,
}

impl ProvisionStep {
    pub const ALL: [Self; 5] = [
        Self::CreateContentProject,
        Self::CreateDataset,
        Self::CreateToken,
        Self::CreateHostingProject,
        Self::UpsertEnvVars,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateContentProject => "create_content_project",
            Self::CreateDataset => "create_dataset",
            Self::CreateToken => "create_token",
            Self::CreateHostingProject => "create_hosting_project",
            Self::UpsertEnvVars => "upsert_env_vars",
        }
    }

    #[must_use]
    pub const fn platform(self) -> Platform {
        match self {
            Self::CreateContentProject | Self::CreateDataset | Self::CreateToken => {
                Platform::Content
            }
            Self::CreateHostingProject | Self::UpsertEnvVars => Platform::Hosting,
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentProject {
    pub id: String,
    pub display_name: String,
    pub host: Option<String>,
}

/// Dataset visibility on the content platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AclMode {
    #[default]
    Public,
    Private,
}

impl AclMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl FromStr for AclMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("invalid dataset ACL mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub acl_mode: AclMode,
}

/// Token issued by the content platform. The secret can be taken exactly once.
#[derive(Debug)]
pub struct AccessToken {
    pub id: String,
    pub label: String,
    pub roles: BTreeSet<String>,
    pub secret: OneTimeSecret,
}

/// Git repository a hosting project deploys from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRepository {
    pub provider: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostingProject {
    pub id: String,
    pub name: String,
    pub source_repository: SourceRepository,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Plain,
    Encrypted,
}

/// Hosting deployment environments an env var can be exposed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployTarget {
    Production,
    Preview,
    Development,
}

impl DeployTarget {
    #[must_use]
    pub fn all() -> BTreeSet<Self> {
        BTreeSet::from([Self::Production, Self::Preview, Self::Development])
    }
}

impl FromStr for DeployTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "preview" => Ok(Self::Preview),
            "development" => Ok(Self::Development),
            other => Err(format!("invalid deployment target: {other}")),
        }
    }
}

/// One environment variable to upsert on a hosting project.
///
/// The value is held as a secret regardless of sensitivity so that encrypted
/// values cannot leak through formatting; `Debug` only prints plain values.
#[derive(Clone)]
pub struct EnvVarSpec {
    pub key: String,
    pub value: SecretString,
    pub sensitivity: Sensitivity,
    pub targets: BTreeSet<DeployTarget>,
}

impl EnvVarSpec {
    #[must_use]
    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: SecretString::from(value.into()),
            sensitivity: Sensitivity::Plain,
            targets: DeployTarget::all(),
        }
    }

    #[must_use]
    pub fn encrypted(
        key: impl Into<String>,
        value: SecretString,
        targets: BTreeSet<DeployTarget>,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            sensitivity: Sensitivity::Encrypted,
            targets,
        }
    }
}

impl fmt::Debug for EnvVarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.sensitivity {
            Sensitivity::Plain => self.value.expose_secret(),
            Sensitivity::Encrypted => "***",
        };
        f.debug_struct("EnvVarSpec")
            .field("key", &self.key)
            .field("value", &value)
            .field("sensitivity", &self.sensitivity)
            .field("targets", &self.targets)
            .finish()
    }
}

/// Acknowledgement of a batched env var upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvUpsertAck {
    pub count: usize,
}

/// Entry in the run-local ledger of remote resources created so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedResource {
    pub platform: Platform,
    pub kind: String,
    pub id: String,
}

impl CreatedResource {
    #[must_use]
    pub fn new(platform: Platform, kind: &str, id: impl Into<String>) -> Self {
        Self {
            platform,
            kind: kind.to_string(),
            id: id.into(),
        }
    }
}

/// Non-secret summary of a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResult {
    pub content_project_id: String,
    pub content_display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_host: Option<String>,
    pub dataset: String,
    pub dataset_acl: AclMode,
    pub token_id: String,
    pub token_label: String,
    pub hosting_project_id: String,
    pub hosting_project_name: String,
    pub env_keys: Vec<String>,
    pub notes: Vec<String>,
}
