use super::handlers::{health, provision};
use crate::provision::{
    AclMode, CreatedResource, Platform, ProvisionRequestBody, ProvisionResult, ProvisionStep,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health::health, provision::provision),
    components(schemas(
        health::Health,
        ProvisionRequestBody,
        ProvisionResult,
        provision::ProvisionResponse,
        provision::FailureResponse,
        CreatedResource,
        AclMode,
        Platform,
        ProvisionStep,
    )),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "provision", description = "Content backend and hosting provisioning"),
    )
)]
struct ApiDoc;

/// `OpenAPI` document for the inbound API, stamped with Cargo metadata.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = env!("CARGO_PKG_NAME").to_string();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();
    doc.info.description = Some(env!("CARGO_PKG_DESCRIPTION").to_string());
    doc
}
