use super::model::{CreatedResource, Platform, ProvisionStep};
use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single call against either platform.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; the body is kept verbatim.
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("response is missing field `{0}`")]
    MissingField(&'static str),
}

impl ClientError {
    /// Upstream HTTP status, when the platform answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(status.as_u16()),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Url(_) | Self::MissingField(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A remote step failed; `created` lists what earlier steps left behind.
    #[error("{platform} step {step} failed: {message}")]
    Upstream {
        platform: Platform,
        step: ProvisionStep,
        status: Option<u16>,
        message: String,
        created: Vec<CreatedResource>,
    },

    #[error("provisioning for site {site_name} is already in progress")]
    InFlight { site_name: String },
}

impl ProvisionError {
    #[must_use]
    pub fn step(&self) -> Option<ProvisionStep> {
        match self {
            Self::Upstream { step, .. } => Some(*step),
            Self::InFlight { .. } => None,
        }
    }

    #[must_use]
    pub fn created(&self) -> &[CreatedResource] {
        match self {
            Self::Upstream { created, .. } => created,
            Self::InFlight { .. } => &[],
        }
    }
}
