//! Hosting platform: projects linked to a git repository and their environment.

mod client;

pub use client::HostingClient;

use crate::provision::{ClientError, EnvUpsertAck, EnvVarSpec, HostingProject, SourceRepository};
use std::future::Future;

/// Operations the provisioner needs from the hosting platform.
pub trait HostingBackend: Send + Sync {
    fn create_project(
        &self,
        name: &str,
        framework: &str,
        repository: &SourceRepository,
    ) -> impl Future<Output = Result<HostingProject, ClientError>> + Send;

    /// Batched upsert keyed by env var name: re-sending a key overwrites it.
    fn upsert_env_vars(
        &self,
        project: &str,
        specs: &[EnvVarSpec],
    ) -> impl Future<Output = Result<EnvUpsertAck, ClientError>> + Send;
}
