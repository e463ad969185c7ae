use crate::{
    api,
    cli::{globals::GlobalArgs, telemetry},
    content::ContentBackendClient,
    hosting::HostingClient,
    provision::{ProvisionPolicy, ProvisionService, Provisioner, SiteLocks},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub content_api_url: String,
    pub content_api_version: String,
    pub content_token: SecretString,
    pub hosting_api_url: String,
    pub hosting_token: SecretString,
    pub hosting_team_id: Option<String>,
    pub policy: ProvisionPolicy,
    pub dedupe_in_flight: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a platform client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.content_token, args.hosting_token);
    globals.set_team_id(args.hosting_team_id);

    debug!("Global args: {:?}", globals);

    let content = ContentBackendClient::new(
        &args.content_api_url,
        &args.content_api_version,
        globals.content_token.clone(),
    )
    .context("Failed to build content platform client")?;

    let hosting = HostingClient::new(
        &args.hosting_api_url,
        globals.hosting_token.clone(),
        globals.hosting_team_id.clone(),
    )
    .context("Failed to build hosting platform client")?;

    info!(
        content_api = %content.base_url(),
        hosting_team = ?hosting.team_id(),
        repository = %args.policy.repository().repo,
        dedupe_in_flight = args.dedupe_in_flight,
        "Provisioner configured"
    );

    let mut provisioner = Provisioner::new(content, hosting, args.policy);
    if args.dedupe_in_flight {
        provisioner = provisioner.with_site_locks(SiteLocks::new());
    }
    let provisioner: Arc<dyn ProvisionService> = Arc::new(provisioner);

    let result = api::new(args.port, provisioner).await;

    telemetry::shutdown_tracer();

    result
}
