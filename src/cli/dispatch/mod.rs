//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, resolving every
//! configuration group up front so a bad value stops the process before the
//! listener binds.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{content, hosting, policy, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or the policy is rejected.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let content_opts = content::Options::parse(matches)?;
    let hosting_opts = hosting::Options::parse(matches)?;
    let policy_opts = policy::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        content_api_url: content_opts.api_url,
        content_api_version: content_opts.api_version,
        content_token: content_opts.token,
        hosting_api_url: hosting_opts.api_url,
        hosting_token: hosting_opts.token,
        hosting_team_id: hosting_opts.team_id,
        policy: policy_opts.policy,
        dedupe_in_flight: policy_opts.dedupe_in_flight,
    }))
}
