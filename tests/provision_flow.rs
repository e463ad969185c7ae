mod common;

use common::{
    Harness, ALL_CALLS, CREATE_DATASET, CREATE_HOSTING_PROJECT, CREATE_PROJECT, CREATE_TOKEN,
    TOKEN_SECRET, UPSERT_ENV_VARS,
};
use reqwest::StatusCode;
use siteforge::provision::{
    AclMode, DeployTarget, Platform, ProvisionError, ProvisionRequest, ProvisionStep, Sensitivity,
    SiteLocks,
};
use std::collections::BTreeSet;

fn request(site_name: &str) -> ProvisionRequest {
    match ProvisionRequest::new(site_name, None, None) {
        Ok(request) => request,
        Err(err) => panic!("invalid test request: {err}"),
    }
}

#[tokio::test]
async fn provisions_in_fixed_order() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();

    let result = match provisioner.provision(&request("acme-site")).await {
        Ok(result) => result,
        Err(err) => panic!("provisioning failed: {err}"),
    };
    assert_eq!(harness.log.calls(), ALL_CALLS.to_vec());
    assert_eq!(result.content_project_id, "proj-1");
    assert_eq!(result.content_display_name, "acme-site");
    assert_eq!(result.dataset, "production");
    assert_eq!(result.dataset_acl, AclMode::Public);
    assert_eq!(result.token_label, "acme-site-server");
    assert_eq!(result.hosting_project_id, "prj_acme-site");
    assert_eq!(result.hosting_project_name, "acme-site");
    assert_eq!(
        result.env_keys,
        vec![
            "NEXT_PUBLIC_SANITY_PROJECT_ID".to_string(),
            "NEXT_PUBLIC_SANITY_DATASET".to_string(),
            "SANITY_API_TOKEN".to_string(),
        ]
    );
    assert!(!result.notes.is_empty());
}

#[tokio::test]
async fn data_flows_between_steps() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();
    let request = match ProvisionRequest::new("acme-site", Some("Acme Marketing"), Some("staging"))
    {
        Ok(request) => request,
        Err(err) => panic!("invalid test request: {err}"),
    };

    let result = provisioner.provision(&request).await;
    assert!(result.is_ok());

    assert_eq!(
        *harness.content.display_names.lock().unwrap_or_else(|e| e.into_inner()),
        vec!["Acme Marketing".to_string()]
    );
    assert_eq!(
        *harness.content.dataset_requests.lock().unwrap_or_else(|e| e.into_inner()),
        vec![("proj-1".to_string(), "staging".to_string(), AclMode::Public)]
    );
    assert_eq!(
        *harness.content.token_requests.lock().unwrap_or_else(|e| e.into_inner()),
        vec![(
            "proj-1".to_string(),
            "acme-site-server".to_string(),
            vec!["editor".to_string()]
        )]
    );

    let projects = harness.hosting.projects.lock().unwrap_or_else(|e| e.into_inner()).clone();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].0, "acme-site");
    assert_eq!(projects[0].1, "nextjs");
    assert_eq!(projects[0].2.repo, "acme/site-template");
}

#[tokio::test]
async fn env_vars_have_expected_visibility() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();

    assert!(provisioner.provision(&request("acme-site")).await.is_ok());

    let env = harness.hosting.env_for("prj_acme-site");
    assert_eq!(env.len(), 3);

    let project_id = &env["NEXT_PUBLIC_SANITY_PROJECT_ID"];
    assert_eq!(project_id.0, "proj-1");
    assert_eq!(project_id.1, Sensitivity::Plain);
    assert_eq!(project_id.2, DeployTarget::all());

    let dataset = &env["NEXT_PUBLIC_SANITY_DATASET"];
    assert_eq!(dataset.0, "production");
    assert_eq!(dataset.1, Sensitivity::Plain);
    assert_eq!(dataset.2, DeployTarget::all());

    let token = &env["SANITY_API_TOKEN"];
    assert_eq!(token.0, TOKEN_SECRET);
    assert_eq!(token.1, Sensitivity::Encrypted);
    assert_eq!(
        token.2,
        BTreeSet::from([DeployTarget::Production, DeployTarget::Preview])
    );
}

#[tokio::test]
async fn result_never_contains_token_secret() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();

    let result = match provisioner.provision(&request("acme-site")).await {
        Ok(result) => result,
        Err(err) => panic!("provisioning failed: {err}"),
    };

    let json = serde_json::to_string(&result).unwrap_or_default();
    assert!(!json.is_empty());
    assert!(!json.contains(TOKEN_SECRET));
    assert!(!format!("{result:?}").contains(TOKEN_SECRET));
}

#[tokio::test]
async fn dataset_failure_stops_pipeline() {
    let harness = Harness::fail_at(
        CREATE_DATASET,
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"dataset backend unavailable"}"#,
    );
    let provisioner = harness.provisioner();

    let (platform, step, status, message, created) =
        match provisioner.provision(&request("acme-site")).await {
            Err(ProvisionError::Upstream {
                platform,
                step,
                status,
                message,
                created,
            }) => (platform, step, status, message, created),
            other => panic!("expected upstream error, got {other:?}"),
        };
    assert_eq!(platform, Platform::Content);
    assert_eq!(step, ProvisionStep::CreateDataset);
    assert_eq!(status, Some(500));
    assert!(message.contains("dataset backend unavailable"));
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].kind, "content_project");
    assert_eq!(created[0].id, "proj-1");

    assert_eq!(harness.log.calls(), vec![CREATE_PROJECT, CREATE_DATASET]);
    assert_eq!(harness.log.count(CREATE_TOKEN), 0);
    assert_eq!(harness.log.count(CREATE_HOSTING_PROJECT), 0);
    assert_eq!(harness.log.count(UPSERT_ENV_VARS), 0);
}

#[tokio::test]
async fn each_failing_step_stops_the_rest() {
    for (index, &call) in ALL_CALLS.iter().enumerate() {
        let harness = Harness::fail_at(call, StatusCode::BAD_REQUEST, "rejected");
        let provisioner = harness.provisioner();

        let err = provisioner.provision(&request("acme-site")).await.err();

        assert_eq!(
            err.as_ref().and_then(ProvisionError::step),
            Some(ProvisionStep::ALL[index]),
            "{call}"
        );
        assert_eq!(harness.log.calls(), ALL_CALLS[..=index].to_vec(), "{call}");
        assert_eq!(
            err.as_ref().map(|e| e.created().len()),
            Some(index),
            "{call}"
        );
    }
}

#[tokio::test]
async fn upstream_error_never_echoes_token_secret() {
    let harness = Harness::fail_at(
        UPSERT_ENV_VARS,
        StatusCode::UNPROCESSABLE_ENTITY,
        &format!(r#"{{"error":"invalid value {TOKEN_SECRET} for SANITY_API_TOKEN"}}"#),
    );
    let provisioner = harness.provisioner();

    let err = provisioner.provision(&request("acme-site")).await.err();

    let Some(err) = err else {
        panic!("expected failure");
    };
    assert_eq!(err.step(), Some(ProvisionStep::UpsertEnvVars));
    assert!(!err.to_string().contains(TOKEN_SECRET));
    assert!(!format!("{err:?}").contains(TOKEN_SECRET));
    assert!(err.to_string().contains("SANITY_API_TOKEN"));
    let kinds: Vec<&str> = err.created().iter().map(|r| r.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec!["content_project", "dataset", "access_token", "hosting_project"]
    );
}

#[tokio::test]
async fn token_without_secret_is_listed_for_cleanup() {
    let harness = Harness::withholding_token_secret();
    let provisioner = harness.provisioner();

    let err = match provisioner.provision(&request("acme-site")).await {
        Err(err) => err,
        Ok(result) => panic!("expected failure, got {result:?}"),
    };

    assert_eq!(err.step(), Some(ProvisionStep::CreateToken));
    assert!(err.to_string().contains("key"));
    let ids: Vec<&str> = err.created().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["proj-1", "proj-1/production", "tok-proj-1"]);
    assert_eq!(err.created()[2].kind, "access_token");

    assert_eq!(
        harness.log.calls(),
        vec![CREATE_PROJECT, CREATE_DATASET, CREATE_TOKEN]
    );
    assert_eq!(harness.log.count(CREATE_HOSTING_PROJECT), 0);
}

#[tokio::test]
async fn rerunning_env_upsert_keeps_three_variables() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();

    assert!(provisioner.provision(&request("acme-site")).await.is_ok());
    assert!(provisioner.provision(&request("acme-site")).await.is_ok());

    let env = harness.hosting.env_for("prj_acme-site");
    assert_eq!(env.len(), 3);
    // Second run created a fresh content project; the upsert overwrote the id.
    assert_eq!(env["NEXT_PUBLIC_SANITY_PROJECT_ID"].0, "proj-2");
    assert_eq!(harness.log.count(UPSERT_ENV_VARS), 2);
}

#[tokio::test]
async fn concurrent_runs_are_not_deduplicated_by_default() {
    let harness = Harness::new();
    let provisioner = harness.provisioner();
    let request = request("acme-site");

    let (first, second) = tokio::join!(
        provisioner.provision(&request),
        provisioner.provision(&request)
    );

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(harness.log.count(CREATE_PROJECT), 2);
}

#[tokio::test]
async fn site_locks_reject_run_already_in_flight() {
    let harness = Harness::new();
    let locks = SiteLocks::new();
    let provisioner = harness.provisioner().with_site_locks(locks.clone());

    let permit = locks.try_acquire("acme-site");
    assert!(permit.is_some());

    let err = provisioner.provision(&request("acme-site")).await.err();
    assert!(matches!(err, Some(ProvisionError::InFlight { ref site_name }) if site_name == "acme-site"));
    assert!(harness.log.calls().is_empty());

    drop(permit);
    assert!(provisioner.provision(&request("acme-site")).await.is_ok());
    assert!(!locks.is_held("acme-site"));
}
