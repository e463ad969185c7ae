//! Recording fakes for the two platforms.
//!
//! Every call is appended to a shared log so tests can assert ordering and
//! that nothing runs after a failed step.

#![allow(dead_code)]

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use siteforge::{
    content::ContentBackend,
    hosting::HostingBackend,
    provision::{
        AccessToken, AclMode, ClientError, ContentProject, Dataset, DeployTarget, EnvUpsertAck,
        EnvVarSpec, HostingProject, OneTimeSecret, ProvisionPolicy, Provisioner, Sensitivity,
        SourceRepository,
    },
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, PoisonError},
};

pub const TOKEN_SECRET: &str = "sk-one-time-0123456789abcdef";

pub const CREATE_PROJECT: &str = "content.create_project";
pub const CREATE_DATASET: &str = "content.create_dataset";
pub const CREATE_TOKEN: &str = "content.create_token";
pub const CREATE_HOSTING_PROJECT: &str = "hosting.create_project";
pub const UPSERT_ENV_VARS: &str = "hosting.upsert_env_vars";

pub const ALL_CALLS: [&str; 5] = [
    CREATE_PROJECT,
    CREATE_DATASET,
    CREATE_TOKEN,
    CREATE_HOSTING_PROJECT,
    UPSERT_ENV_VARS,
];

#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, call: &'static str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }
}

/// Stored env var: (value, sensitivity, targets).
pub type StoredEnv = (String, Sensitivity, BTreeSet<DeployTarget>);

#[derive(Clone, Debug)]
pub struct Failure {
    pub call: &'static str,
    pub status: StatusCode,
    pub body: String,
}

#[derive(Clone, Debug, Default)]
pub struct FakeContent {
    log: CallLog,
    failure: Option<Failure>,
    /// Answer `create_token` successfully but without the secret.
    withhold_secret: bool,
    projects: Arc<Mutex<u32>>,
    pub display_names: Arc<Mutex<Vec<String>>>,
    pub dataset_requests: Arc<Mutex<Vec<(String, String, AclMode)>>>,
    pub token_requests: Arc<Mutex<Vec<(String, String, Vec<String>)>>>,
}

impl FakeContent {
    fn check(&self, call: &'static str) -> Result<(), ClientError> {
        self.log.push(call);
        match &self.failure {
            Some(failure) if failure.call == call => Err(ClientError::Status {
                status: failure.status,
                body: failure.body.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl ContentBackend for FakeContent {
    async fn create_project(&self, display_name: &str) -> Result<ContentProject, ClientError> {
        self.check(CREATE_PROJECT)?;
        self.display_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(display_name.to_string());
        let mut counter = self.projects.lock().unwrap_or_else(PoisonError::into_inner);
        *counter += 1;
        Ok(ContentProject {
            id: format!("proj-{counter}"),
            display_name: display_name.to_string(),
            host: None,
        })
    }

    async fn create_dataset(
        &self,
        project_id: &str,
        name: &str,
        acl_mode: AclMode,
    ) -> Result<Dataset, ClientError> {
        self.check(CREATE_DATASET)?;
        self.dataset_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((project_id.to_string(), name.to_string(), acl_mode));
        Ok(Dataset {
            name: name.to_string(),
            acl_mode,
        })
    }

    async fn create_token(
        &self,
        project_id: &str,
        label: &str,
        roles: &[String],
    ) -> Result<AccessToken, ClientError> {
        self.check(CREATE_TOKEN)?;
        self.token_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((project_id.to_string(), label.to_string(), roles.to_vec()));
        Ok(AccessToken {
            id: format!("tok-{project_id}"),
            label: label.to_string(),
            roles: roles.iter().cloned().collect(),
            secret: if self.withhold_secret {
                OneTimeSecret::empty()
            } else {
                OneTimeSecret::new(SecretString::from(TOKEN_SECRET.to_string()))
            },
        })
    }
}

/// Hosting fake with upsert semantics keyed by (project, env key).
#[derive(Clone, Debug, Default)]
pub struct FakeHosting {
    log: CallLog,
    failure: Option<Failure>,
    pub projects: Arc<Mutex<Vec<(String, String, SourceRepository)>>>,
    pub env: Arc<Mutex<BTreeMap<String, BTreeMap<String, StoredEnv>>>>,
}

impl FakeHosting {
    fn check(&self, call: &'static str) -> Result<(), ClientError> {
        self.log.push(call);
        match &self.failure {
            Some(failure) if failure.call == call => Err(ClientError::Status {
                status: failure.status,
                body: failure.body.clone(),
            }),
            _ => Ok(()),
        }
    }

    pub fn env_for(&self, project: &str) -> BTreeMap<String, StoredEnv> {
        self.env
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project)
            .cloned()
            .unwrap_or_default()
    }
}

impl HostingBackend for FakeHosting {
    async fn create_project(
        &self,
        name: &str,
        framework: &str,
        repository: &SourceRepository,
    ) -> Result<HostingProject, ClientError> {
        self.check(CREATE_HOSTING_PROJECT)?;
        self.projects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), framework.to_string(), repository.clone()));
        Ok(HostingProject {
            id: format!("prj_{name}"),
            name: name.to_string(),
            source_repository: repository.clone(),
        })
    }

    async fn upsert_env_vars(
        &self,
        project: &str,
        specs: &[EnvVarSpec],
    ) -> Result<EnvUpsertAck, ClientError> {
        self.check(UPSERT_ENV_VARS)?;
        let mut env = self.env.lock().unwrap_or_else(PoisonError::into_inner);
        let vars = env.entry(project.to_string()).or_default();
        for spec in specs {
            vars.insert(
                spec.key.clone(),
                (
                    spec.value.expose_secret().to_string(),
                    spec.sensitivity,
                    spec.targets.clone(),
                ),
            );
        }
        Ok(EnvUpsertAck { count: specs.len() })
    }
}

pub fn repository() -> SourceRepository {
    SourceRepository {
        provider: "github".to_string(),
        repo: "acme/site-template".to_string(),
        git_ref: "main".to_string(),
    }
}

pub struct Harness {
    pub log: CallLog,
    pub content: FakeContent,
    pub hosting: FakeHosting,
}

impl Harness {
    pub fn new() -> Self {
        Self::failing(None)
    }

    pub fn failing(failure: Option<Failure>) -> Self {
        let log = CallLog::default();
        let content = FakeContent {
            log: log.clone(),
            failure: failure.clone(),
            ..FakeContent::default()
        };
        let hosting = FakeHosting {
            log: log.clone(),
            failure,
            ..FakeHosting::default()
        };
        Self {
            log,
            content,
            hosting,
        }
    }

    pub fn fail_at(call: &'static str, status: StatusCode, body: &str) -> Self {
        Self::failing(Some(Failure {
            call,
            status,
            body: body.to_string(),
        }))
    }

    /// Harness whose content fake creates the token but omits its secret.
    pub fn withholding_token_secret() -> Self {
        let mut harness = Self::new();
        harness.content.withhold_secret = true;
        harness
    }

    /// Provisioner sharing this harness' fakes (clones share state).
    pub fn provisioner(&self) -> Provisioner<FakeContent, FakeHosting> {
        Provisioner::new(
            self.content.clone(),
            self.hosting.clone(),
            ProvisionPolicy::new(repository()),
        )
    }
}
