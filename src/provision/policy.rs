//! Provisioning policy: the knobs that decide what gets created and how the
//! hosting project is wired. Defaults reproduce the historical fixed values.

use super::model::{AclMode, DeployTarget, SourceRepository};
use anyhow::{anyhow, Result};
use std::collections::BTreeSet;

pub const DEFAULT_TOKEN_ROLE: &str = "editor";
pub const DEFAULT_FRAMEWORK: &str = "nextjs";
pub const TOKEN_LABEL_SUFFIX: &str = "-server";

/// Prefix the frontend framework inlines into the browser bundle.
pub const PUBLIC_ENV_PREFIX: &str = "NEXT_PUBLIC_";

/// Keys of the three environment variables written to the hosting project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvKeys {
    pub project_id: String,
    pub dataset: String,
    pub token: String,
}

impl Default for EnvKeys {
    fn default() -> Self {
        Self {
            project_id: "NEXT_PUBLIC_SANITY_PROJECT_ID".to_string(),
            dataset: "NEXT_PUBLIC_SANITY_DATASET".to_string(),
            token: "SANITY_API_TOKEN".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProvisionPolicy {
    dataset_acl: AclMode,
    token_roles: BTreeSet<String>,
    framework: String,
    secret_targets: BTreeSet<DeployTarget>,
    repository: SourceRepository,
    env_keys: EnvKeys,
}

impl ProvisionPolicy {
    /// Default policy: public dataset, `editor` token, `nextjs` framework, token
    /// secret exposed to production and preview only.
    #[must_use]
    pub fn new(repository: SourceRepository) -> Self {
        Self {
            dataset_acl: AclMode::Public,
            token_roles: BTreeSet::from([DEFAULT_TOKEN_ROLE.to_string()]),
            framework: DEFAULT_FRAMEWORK.to_string(),
            secret_targets: BTreeSet::from([DeployTarget::Production, DeployTarget::Preview]),
            repository,
            env_keys: EnvKeys::default(),
        }
    }

    #[must_use]
    pub fn with_dataset_acl(mut self, acl: AclMode) -> Self {
        self.dataset_acl = acl;
        self
    }

    #[must_use]
    pub fn with_token_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.token_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }

    #[must_use]
    pub fn with_secret_targets(mut self, targets: BTreeSet<DeployTarget>) -> Self {
        self.secret_targets = targets;
        self
    }

    #[must_use]
    pub fn with_env_keys(mut self, env_keys: EnvKeys) -> Self {
        self.env_keys = env_keys;
        self
    }

    /// Reject policies that would leak the token or produce an unusable token.
    ///
    /// # Errors
    /// Returns an error describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.token_roles.iter().all(|role| role.trim().is_empty()) {
            return Err(anyhow!("at least one token role is required"));
        }
        if self.secret_targets.is_empty() {
            return Err(anyhow!("the token secret needs at least one deployment target"));
        }
        if self.secret_targets.contains(&DeployTarget::Development) {
            return Err(anyhow!(
                "the token secret must not be exposed to the development environment"
            ));
        }
        if self.env_keys.token.starts_with(PUBLIC_ENV_PREFIX) {
            return Err(anyhow!(
                "token env key {} would be world-readable ({PUBLIC_ENV_PREFIX} prefix)",
                self.env_keys.token
            ));
        }
        if self.repository.repo.trim().is_empty() {
            return Err(anyhow!("git repository is required"));
        }
        Ok(())
    }

    #[must_use]
    pub fn token_label(site_name: &str) -> String {
        format!("{site_name}{TOKEN_LABEL_SUFFIX}")
    }

    #[must_use]
    pub const fn dataset_acl(&self) -> AclMode {
        self.dataset_acl
    }

    #[must_use]
    pub fn token_roles(&self) -> Vec<String> {
        self.token_roles.iter().cloned().collect()
    }

    #[must_use]
    pub fn framework(&self) -> &str {
        &self.framework
    }

    #[must_use]
    pub fn secret_targets(&self) -> &BTreeSet<DeployTarget> {
        &self.secret_targets
    }

    #[must_use]
    pub fn repository(&self) -> &SourceRepository {
        &self.repository
    }

    #[must_use]
    pub fn env_keys(&self) -> &EnvKeys {
        &self.env_keys
    }
}
