use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_API_URL: &str = "content-api-url";
pub const ARG_API_VERSION: &str = "content-api-version";
pub const ARG_TOKEN: &str = "content-token";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Content platform API host")
                .env("SITEFORGE_CONTENT_API_URL")
                .default_value("https://api.sanity.io"),
        )
        .arg(
            Arg::new(ARG_API_VERSION)
                .long(ARG_API_VERSION)
                .help("Content platform API version path prefix")
                .env("SITEFORGE_CONTENT_API_VERSION")
                .default_value("v2021-06-07"),
        )
        .arg(
            Arg::new(ARG_TOKEN)
                .long(ARG_TOKEN)
                .help("Content platform bearer token (management scope)")
                .env("SITEFORGE_CONTENT_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_url: String,
    pub api_version: String,
    pub token: SecretString,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            api_url: matches
                .get_one::<String>(ARG_API_URL)
                .cloned()
                .context("missing required argument: --content-api-url")?,
            api_version: matches
                .get_one::<String>(ARG_API_VERSION)
                .cloned()
                .context("missing required argument: --content-api-version")?,
            token: matches
                .get_one::<String>(ARG_TOKEN)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --content-token")?,
        })
    }
}
