//! Provisioning pipeline: request validation, policy and the orchestrator that
//! drives the content and hosting platforms.

mod error;
mod locks;
mod model;
mod orchestrator;
mod policy;
mod request;
mod secret;

pub use error::{ClientError, ProvisionError};
pub use locks::{SitePermit, SiteLocks};
pub use model::{
    AccessToken, AclMode, ContentProject, CreatedResource, Dataset, DeployTarget, EnvUpsertAck,
    EnvVarSpec, HostingProject, Platform, ProvisionResult, ProvisionStep, Sensitivity,
    SourceRepository,
};
pub use orchestrator::{BoxFuture, ProvisionService, Provisioner};
pub use policy::{EnvKeys, ProvisionPolicy, PUBLIC_ENV_PREFIX};
pub use request::{
    valid_dataset, valid_site_name, ProvisionRequest, ProvisionRequestBody, ValidationError,
    DEFAULT_DATASET,
};
pub use secret::OneTimeSecret;
