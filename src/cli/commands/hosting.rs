use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_API_URL: &str = "hosting-api-url";
pub const ARG_TOKEN: &str = "hosting-token";
pub const ARG_TEAM_ID: &str = "hosting-team-id";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Hosting platform API base URL")
                .env("SITEFORGE_HOSTING_API_URL")
                .default_value("https://api.vercel.com"),
        )
        .arg(
            Arg::new(ARG_TOKEN)
                .long(ARG_TOKEN)
                .help("Hosting platform bearer token")
                .env("SITEFORGE_HOSTING_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TEAM_ID)
                .long(ARG_TEAM_ID)
                .help("Hosting team to create projects under (personal account if unset)")
                .env("SITEFORGE_HOSTING_TEAM_ID"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub api_url: String,
    pub token: SecretString,
    pub team_id: Option<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            api_url: matches
                .get_one::<String>(ARG_API_URL)
                .cloned()
                .context("missing required argument: --hosting-api-url")?,
            token: matches
                .get_one::<String>(ARG_TOKEN)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --hosting-token")?,
            team_id: matches.get_one::<String>(ARG_TEAM_ID).cloned(),
        })
    }
}
