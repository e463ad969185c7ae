//! Inbound provisioning request and its validation rules.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const DEFAULT_DATASET: &str = "production";
pub const SITE_NAME_MIN: usize = 3;
pub const SITE_NAME_MAX: usize = 60;
pub const DATASET_MIN: usize = 1;
pub const DATASET_MAX: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw JSON body accepted by `POST /provision`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequestBody {
    pub site_name: String,
    #[serde(default)]
    pub content_display_name: Option<String>,
    #[serde(default)]
    pub dataset: Option<String>,
}

/// A validated request. Only constructible through [`ProvisionRequest::new`]
/// or `TryFrom<ProvisionRequestBody>`, so the slug invariants always hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvisionRequest {
    site_name: String,
    content_display_name: Option<String>,
    dataset: String,
}

impl ProvisionRequest {
    /// # Errors
    /// Returns a `ValidationError` naming the first offending field.
    pub fn new(
        site_name: &str,
        content_display_name: Option<&str>,
        dataset: Option<&str>,
    ) -> Result<Self, ValidationError> {
        if !valid_site_name(site_name) {
            return Err(ValidationError::new(
                "siteName",
                format!(
                    "must match [a-z0-9-]+ and be {SITE_NAME_MIN}-{SITE_NAME_MAX} characters long"
                ),
            ));
        }

        let dataset = dataset.unwrap_or(DEFAULT_DATASET);
        if !valid_dataset(dataset) {
            return Err(ValidationError::new(
                "dataset",
                format!("must match [a-z0-9_-]+ and be {DATASET_MIN}-{DATASET_MAX} characters long"),
            ));
        }

        // Blank display names fall back to the site name.
        let content_display_name = content_display_name
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string);

        Ok(Self {
            site_name: site_name.to_string(),
            content_display_name,
            dataset: dataset.to_string(),
        })
    }

    #[must_use]
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    #[must_use]
    pub fn content_display_name(&self) -> Option<&str> {
        self.content_display_name.as_deref()
    }

    /// Display name used for the content project.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.content_display_name().unwrap_or(&self.site_name)
    }

    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

impl TryFrom<ProvisionRequestBody> for ProvisionRequest {
    type Error = ValidationError;

    fn try_from(body: ProvisionRequestBody) -> Result<Self, Self::Error> {
        Self::new(
            &body.site_name,
            body.content_display_name.as_deref(),
            body.dataset.as_deref(),
        )
    }
}

pub fn valid_site_name(site_name: &str) -> bool {
    // ASCII-only pattern, so the byte length equals the character count
    Regex::new(r"^[a-z0-9-]{3,60}$").map_or(false, |re| re.is_match(site_name))
}

pub fn valid_dataset(dataset: &str) -> bool {
    Regex::new(r"^[a-z0-9_-]{1,32}$").map_or(false, |re| re.is_match(dataset))
}
