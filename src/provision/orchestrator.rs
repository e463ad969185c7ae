use super::{
    error::{ClientError, ProvisionError},
    locks::SiteLocks,
    model::{CreatedResource, EnvVarSpec, Platform, ProvisionResult, ProvisionStep},
    policy::ProvisionPolicy,
    request::ProvisionRequest,
};
use crate::{content::ContentBackend, hosting::HostingBackend};
use secrecy::{ExposeSecret, SecretString};
use std::{future::Future, pin::Pin};
use tracing::{debug, info, instrument, warn};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe view of a provisioner, so the HTTP layer does not depend on the
/// concrete backends.
pub trait ProvisionService: Send + Sync {
    fn provision<'a>(
        &'a self,
        request: &'a ProvisionRequest,
    ) -> BoxFuture<'a, Result<ProvisionResult, ProvisionError>>;
}

/// Drives one provisioning run at a time per call; holds no per-run state.
///
/// Steps run strictly in order and the first failure ends the run. Nothing
/// created by earlier steps is deleted: the error lists those resources instead.
#[derive(Debug)]
pub struct Provisioner<C, H> {
    content: C,
    hosting: H,
    policy: ProvisionPolicy,
    locks: Option<SiteLocks>,
}

/// Run-local bookkeeping: what exists remotely so far, and which values must be
/// scrubbed from any error message.
#[derive(Default)]
struct Run {
    created: Vec<CreatedResource>,
    secrets: Vec<SecretString>,
}

impl Run {
    fn record(&mut self, platform: Platform, kind: &str, id: &str) {
        debug!(%platform, kind, id, "remote resource created");
        self.created.push(CreatedResource::new(platform, kind, id));
    }

    fn fail(&self, step: ProvisionStep, err: &ClientError) -> ProvisionError {
        let message = scrub(err.to_string(), &self.secrets);
        let status = err.status();

        warn!(
            step = %step,
            status,
            orphaned = self.created.len(),
            "provisioning aborted: {}",
            message
        );
        for resource in &self.created {
            warn!(
                platform = %resource.platform,
                kind = %resource.kind,
                id = %resource.id,
                "left behind, needs manual cleanup"
            );
        }

        ProvisionError::Upstream {
            platform: step.platform(),
            step,
            status,
            message,
            created: self.created.clone(),
        }
    }
}

fn scrub(mut message: String, secrets: &[SecretString]) -> String {
    for secret in secrets {
        let value = secret.expose_secret();
        if !value.is_empty() {
            message = message.replace(value, "***");
        }
    }
    message
}

impl<C: ContentBackend, H: HostingBackend> Provisioner<C, H> {
    #[must_use]
    pub fn new(content: C, hosting: H, policy: ProvisionPolicy) -> Self {
        Self {
            content,
            hosting,
            policy,
            locks: None,
        }
    }

    /// Reject a second concurrent run for a site name that is already in flight.
    #[must_use]
    pub fn with_site_locks(mut self, locks: SiteLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Provision the content backend and hosting project for `request`.
    ///
    /// # Errors
    /// Returns `ProvisionError::Upstream` naming the first failed step, or
    /// `ProvisionError::InFlight` when site locks are enabled and the site name
    /// is already being provisioned.
    #[instrument(skip_all, fields(site_name = %request.site_name()))]
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionResult, ProvisionError> {
        let _permit = match &self.locks {
            Some(locks) => Some(locks.try_acquire(request.site_name()).ok_or_else(|| {
                ProvisionError::InFlight {
                    site_name: request.site_name().to_string(),
                }
            })?),
            None => None,
        };

        let mut run = Run::default();

        info!(step = %ProvisionStep::CreateContentProject, "starting");
        let project = self
            .content
            .create_project(request.display_name())
            .await
            .map_err(|e| run.fail(ProvisionStep::CreateContentProject, &e))?;
        run.record(Platform::Content, "content_project", &project.id);

        info!(step = %ProvisionStep::CreateDataset, project_id = %project.id, "starting");
        let dataset = self
            .content
            .create_dataset(&project.id, request.dataset(), self.policy.dataset_acl())
            .await
            .map_err(|e| run.fail(ProvisionStep::CreateDataset, &e))?;
        run.record(
            Platform::Content,
            "dataset",
            &format!("{}/{}", project.id, dataset.name),
        );

        let label = ProvisionPolicy::token_label(request.site_name());
        info!(step = %ProvisionStep::CreateToken, label = %label, "starting");
        let mut token = self
            .content
            .create_token(&project.id, &label, &self.policy.token_roles())
            .await
            .map_err(|e| run.fail(ProvisionStep::CreateToken, &e))?;
        run.record(Platform::Content, "access_token", &token.id);
        let secret = token
            .secret
            .take()
            .ok_or_else(|| {
                run.fail(ProvisionStep::CreateToken, &ClientError::MissingField("key"))
            })?;
        run.secrets.push(secret.clone());

        info!(step = %ProvisionStep::CreateHostingProject, "starting");
        let hosting_project = self
            .hosting
            .create_project(
                request.site_name(),
                self.policy.framework(),
                self.policy.repository(),
            )
            .await
            .map_err(|e| run.fail(ProvisionStep::CreateHostingProject, &e))?;
        run.record(Platform::Hosting, "hosting_project", &hosting_project.id);

        let keys = self.policy.env_keys();
        let specs = [
            EnvVarSpec::plain(&keys.project_id, &project.id),
            EnvVarSpec::plain(&keys.dataset, &dataset.name),
            EnvVarSpec::encrypted(&keys.token, secret, self.policy.secret_targets().clone()),
        ];

        info!(step = %ProvisionStep::UpsertEnvVars, hosting_project_id = %hosting_project.id, "starting");
        let ack = self
            .hosting
            .upsert_env_vars(&hosting_project.id, &specs)
            .await
            .map_err(|e| run.fail(ProvisionStep::UpsertEnvVars, &e))?;
        debug!(count = ack.count, "environment variables upserted");

        info!(
            content_project_id = %project.id,
            hosting_project_id = %hosting_project.id,
            "provisioning complete"
        );

        Ok(ProvisionResult {
            content_project_id: project.id,
            content_display_name: project.display_name,
            content_host: project.host,
            dataset: dataset.name,
            dataset_acl: dataset.acl_mode,
            token_id: token.id,
            token_label: token.label,
            hosting_project_id: hosting_project.id,
            hosting_project_name: hosting_project.name,
            env_keys: specs.iter().map(|spec| spec.key.clone()).collect(),
            notes: notes(self.policy.env_keys().token.as_str()),
        })
    }
}

impl<C, H> ProvisionService for Provisioner<C, H>
where
    C: ContentBackend + 'static,
    H: HostingBackend + 'static,
{
    fn provision<'a>(
        &'a self,
        request: &'a ProvisionRequest,
    ) -> BoxFuture<'a, Result<ProvisionResult, ProvisionError>> {
        Box::pin(Provisioner::provision(self, request))
    }
}

fn notes(token_key: &str) -> Vec<String> {
    vec![
        format!(
            "The API token secret was stored only as the encrypted {token_key} variable on the hosting project; it is not shown again."
        ),
        "No deployment was triggered: push to the linked repository or redeploy from the hosting dashboard.".to_string(),
        "Add the production domain to the content project's CORS origins before going live.".to_string(),
    ]
}
