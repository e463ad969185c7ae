//! `POST /provision`: validate the body, run the pipeline, map the outcome.
//!
//! Validation failures never reach the provisioner. Upstream failures map to
//! `502` and carry the failed step plus the resources left behind; the token
//! secret is never part of either response.

use crate::provision::{
    CreatedResource, Platform, ProvisionError, ProvisionRequest, ProvisionRequestBody,
    ProvisionResult, ProvisionService, ProvisionStep,
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProvisionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: ProvisionResult,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<ProvisionStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<CreatedResource>,
}

impl FailureResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

fn failure(status: StatusCode, body: FailureResponse) -> Response {
    (status, Json(body)).into_response()
}

impl From<ProvisionError> for FailureResponse {
    fn from(err: ProvisionError) -> Self {
        let message = err.to_string();
        match err {
            ProvisionError::Upstream {
                platform,
                step,
                status,
                created,
                ..
            } => Self {
                message,
                step: Some(step),
                platform: Some(platform),
                upstream_status: status,
                created,
                ..Self::default()
            },
            ProvisionError::InFlight { .. } => Self::message(message),
        }
    }
}

#[utoipa::path(
    post,
    path = "/provision",
    request_body = ProvisionRequestBody,
    responses(
        (status = 200, description = "Content backend and hosting project provisioned", body = ProvisionResponse),
        (status = 400, description = "Malformed or invalid request; no remote call was made", body = FailureResponse),
        (status = 409, description = "A run for this site name is already in progress", body = FailureResponse),
        (status = 502, description = "A platform call failed; earlier resources are listed in `created`", body = FailureResponse),
    ),
    tag = "provision"
)]
pub async fn provision(
    provisioner: Extension<Arc<dyn ProvisionService>>,
    payload: Result<Json<ProvisionRequestBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Rejected provision payload: {}", rejection.body_text());

            return failure(
                StatusCode::BAD_REQUEST,
                FailureResponse::message(rejection.body_text()),
            );
        }
    };

    let request = match ProvisionRequest::try_from(body) {
        Ok(request) => request,
        Err(err) => {
            debug!("Invalid provision request: {}", err);

            return failure(
                StatusCode::BAD_REQUEST,
                FailureResponse {
                    message: err.to_string(),
                    field: Some(err.field.to_string()),
                    ..FailureResponse::default()
                },
            );
        }
    };

    match provisioner.provision(&request).await {
        Ok(result) => {
            info!(site_name = %request.site_name(), "Provisioned site");

            (
                StatusCode::OK,
                Json(ProvisionResponse {
                    success: true,
                    result,
                }),
            )
                .into_response()
        }
        Err(err @ ProvisionError::InFlight { .. }) => failure(StatusCode::CONFLICT, err.into()),
        Err(err) => {
            error!(site_name = %request.site_name(), "Provisioning failed: {}", err);

            failure(StatusCode::BAD_GATEWAY, err.into())
        }
    }
}
