//! Content platform: projects, datasets and scoped API tokens.

mod client;

pub use client::ContentBackendClient;

use crate::provision::{AccessToken, AclMode, ClientError, ContentProject, Dataset};
use std::future::Future;

/// Operations the provisioner needs from the content platform.
pub trait ContentBackend: Send + Sync {
    fn create_project(
        &self,
        display_name: &str,
    ) -> impl Future<Output = Result<ContentProject, ClientError>> + Send;

    /// Upsert by name: an existing dataset is updated rather than duplicated.
    fn create_dataset(
        &self,
        project_id: &str,
        name: &str,
        acl_mode: AclMode,
    ) -> impl Future<Output = Result<Dataset, ClientError>> + Send;

    /// The returned token carries its secret exactly once.
    fn create_token(
        &self,
        project_id: &str,
        label: &str,
        roles: &[String],
    ) -> impl Future<Output = Result<AccessToken, ClientError>> + Send;
}
