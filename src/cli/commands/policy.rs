//! Repository defaults and provisioning policy options.

use crate::provision::{AclMode, DeployTarget, ProvisionPolicy, SourceRepository};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeSet;

pub const ARG_GIT_PROVIDER: &str = "git-provider";
pub const ARG_GIT_REPO: &str = "git-repo";
pub const ARG_GIT_REF: &str = "git-ref";
pub const ARG_DATASET_ACL: &str = "dataset-acl";
pub const ARG_TOKEN_ROLE: &str = "token-role";
pub const ARG_FRAMEWORK: &str = "framework";
pub const ARG_SECRET_TARGETS: &str = "secret-targets";
pub const ARG_DEDUPE_IN_FLIGHT: &str = "dedupe-in-flight";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GIT_PROVIDER)
                .long(ARG_GIT_PROVIDER)
                .help("Git provider of the site repository")
                .env("SITEFORGE_GIT_PROVIDER")
                .default_value("github"),
        )
        .arg(
            Arg::new(ARG_GIT_REPO)
                .long(ARG_GIT_REPO)
                .help("Repository every hosting project deploys from, example: acme/site-template")
                .env("SITEFORGE_GIT_REPO")
                .required(true),
        )
        .arg(
            Arg::new(ARG_GIT_REF)
                .long(ARG_GIT_REF)
                .help("Git ref the hosting project tracks")
                .env("SITEFORGE_GIT_REF")
                .default_value("main"),
        )
        .arg(
            Arg::new(ARG_DATASET_ACL)
                .long(ARG_DATASET_ACL)
                .help("Dataset ACL mode: public or private")
                .env("SITEFORGE_DATASET_ACL")
                .default_value("public")
                .value_parser(|s: &str| s.parse::<AclMode>()),
        )
        .arg(
            Arg::new(ARG_TOKEN_ROLE)
                .long(ARG_TOKEN_ROLE)
                .help("Role granted to the site API token (repeatable)")
                .env("SITEFORGE_TOKEN_ROLE")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_value("editor"),
        )
        .arg(
            Arg::new(ARG_FRAMEWORK)
                .long(ARG_FRAMEWORK)
                .help("Framework hint for new hosting projects")
                .env("SITEFORGE_FRAMEWORK")
                .default_value("nextjs"),
        )
        .arg(
            Arg::new(ARG_SECRET_TARGETS)
                .long(ARG_SECRET_TARGETS)
                .help("Deployment environments that receive the token secret")
                .env("SITEFORGE_SECRET_TARGETS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_values(["production", "preview"])
                .value_parser(|s: &str| s.parse::<DeployTarget>()),
        )
        .arg(
            Arg::new(ARG_DEDUPE_IN_FLIGHT)
                .long(ARG_DEDUPE_IN_FLIGHT)
                .help("Reject a request while another run for the same site name is in progress")
                .env("SITEFORGE_DEDUPE_IN_FLIGHT")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug)]
pub struct Options {
    pub policy: ProvisionPolicy,
    pub dedupe_in_flight: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing or the policy is unsafe.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let repository = SourceRepository {
            provider: matches
                .get_one::<String>(ARG_GIT_PROVIDER)
                .cloned()
                .context("missing required argument: --git-provider")?,
            repo: matches
                .get_one::<String>(ARG_GIT_REPO)
                .cloned()
                .context("missing required argument: --git-repo")?,
            git_ref: matches
                .get_one::<String>(ARG_GIT_REF)
                .cloned()
                .context("missing required argument: --git-ref")?,
        };

        let mut policy = ProvisionPolicy::new(repository);

        if let Some(acl) = matches.get_one::<AclMode>(ARG_DATASET_ACL) {
            policy = policy.with_dataset_acl(*acl);
        }
        if let Some(roles) = matches.get_many::<String>(ARG_TOKEN_ROLE) {
            policy = policy.with_token_roles(roles.map(|role| role.trim().to_string()));
        }
        if let Some(framework) = matches.get_one::<String>(ARG_FRAMEWORK) {
            policy = policy.with_framework(framework.clone());
        }
        if let Some(targets) = matches.get_many::<DeployTarget>(ARG_SECRET_TARGETS) {
            policy = policy.with_secret_targets(targets.copied().collect::<BTreeSet<_>>());
        }

        policy.validate().context("invalid provisioning policy")?;

        Ok(Self {
            policy,
            dedupe_in_flight: matches.get_flag(ARG_DEDUPE_IN_FLIGHT),
        })
    }
}
