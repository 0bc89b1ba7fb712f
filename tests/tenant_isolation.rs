//! Marketing API behaviour across two agencies.
//!
//! Requires `TEST_DATABASE_URL`; each test skips when it is unset.

mod common;

use agency_portal_server::router;
use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{delete, get, post_json, send};

#[tokio::test]
async fn campaign_list_only_shows_own_agency() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let b = common::seed_agency(&pool, "Agency B").await?;
    common::seed_campaign(&pool, a.id, "A spring", "ACTIVE", (100, 50, 10, 2)).await?;
    common::seed_campaign(&pool, b.id, "B spring", "ACTIVE", (0, 0, 0, 0)).await?;

    let (status, body) = send(
        router(pool.clone()),
        get(&format!("/api/{}/marketing/campaigns", a.subdomain)),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    let campaigns = body["campaigns"].as_array().unwrap();
    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0]["name"], "A spring");
    assert_eq!(campaigns[0]["metrics"]["openRate"], 50.0);
    assert_eq!(campaigns[0]["metrics"]["clickRate"], 20.0);
    assert_eq!(campaigns[0]["metrics"]["conversionRate"], 20.0);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["limit"], 10);

    Ok(())
}

#[tokio::test]
async fn other_agency_records_are_not_found() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let b = common::seed_agency(&pool, "Agency B").await?;
    let b_campaign = common::seed_campaign(&pool, b.id, "Private", "DRAFT", (0, 0, 0, 0)).await?;
    let b_lead = common::seed_lead(&pool, b.id, "lead@b.example", "NEW").await?;

    let app = router(pool.clone());

    let (status, body) = send(
        app.clone(),
        get(&format!("/api/{}/marketing/campaigns/{b_campaign}", a.subdomain)),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "campaign_not_found");

    let (status, body) = send(
        app.clone(),
        delete(&format!("/api/{}/marketing/campaigns/{b_campaign}", a.subdomain)),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "campaign_not_found");

    let (status, body) = send(
        app.clone(),
        delete(&format!("/api/{}/marketing/leads/{b_lead}", a.subdomain)),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "lead_not_found");

    // Still present for the owner
    let (status, _) = send(
        app,
        get(&format!("/api/{}/marketing/campaigns/{b_campaign}", b.subdomain)),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn links_to_other_agency_records_are_rejected() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let b = common::seed_agency(&pool, "Agency B").await?;
    let b_workflow = common::seed_workflow(&pool, b.id, "B nurture").await?;
    let b_campaign = common::seed_campaign(&pool, b.id, "B intake", "ACTIVE", (0, 0, 0, 0)).await?;

    let app = router(pool.clone());

    let (status, body) = send(
        app.clone(),
        post_json(
            &format!("/api/{}/marketing/campaigns", a.subdomain),
            json!({ "name": "Borrowed workflow", "workflowId": b_workflow }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "workflow_not_found");

    let (status, body) = send(
        app,
        post_json(
            &format!("/api/{}/marketing/leads", a.subdomain),
            json!({ "email": "x@example.com", "campaignId": b_campaign }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "campaign_not_found");

    Ok(())
}

#[tokio::test]
async fn unknown_subdomain_is_agency_not_found() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };

    let (status, body) = send(router(pool), get("/api/no-such-agency-xyz/workflows")).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "agency_not_found");

    Ok(())
}

#[tokio::test]
async fn campaign_create_rules() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let workflow = common::seed_workflow(&pool, a.id, "Welcome").await?;
    let uri = format!("/api/{}/marketing/campaigns", a.subdomain);
    let app = router(pool.clone());

    let (status, body) = send(app.clone(), post_json(&uri, json!({ "name": "   " }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Campaign name is required");

    let (status, body) = send(
        app.clone(),
        post_json(&uri, json!({ "name": "Open day", "workflowId": workflow })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "DRAFT");
    assert_eq!(body["type"], "EMAIL");
    assert_eq!(body["workflow"]["name"], "Welcome");

    let (status, body) = send(
        app,
        post_json(
            &uri,
            json!({ "name": "Later", "type": "SMS", "scheduledAt": "2030-01-01T09:00:00Z" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "SCHEDULED");
    assert_eq!(body["type"], "SMS");

    Ok(())
}

#[tokio::test]
async fn lead_create_and_delete() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let uri = format!("/api/{}/marketing/leads", a.subdomain);
    let app = router(pool.clone());

    let (status, body) = send(app.clone(), post_json(&uri, json!({ "email": "", "phone": "" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email or phone is required");

    let (status, body) = send(
        app.clone(),
        post_json(&uri, json!({ "firstName": "Ana", "email": "ana@example.com", "status": "CONVERTED" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["source"], "Manual");
    assert_eq!(body["converted"], true);
    assert!(body["convertedAt"].is_string());

    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(app.clone(), delete(&format!("{uri}/{id}"))).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, body) = send(app, delete(&format!("{uri}/{id}"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "lead_not_found");

    Ok(())
}

#[tokio::test]
async fn list_limit_is_clamped_and_filters_apply() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    common::seed_campaign(&pool, a.id, "Live", "ACTIVE", (0, 0, 0, 0)).await?;
    common::seed_campaign(&pool, a.id, "Idea", "DRAFT", (0, 0, 0, 0)).await?;

    let (status, body) = send(
        router(pool.clone()),
        get(&format!(
            "/api/{}/marketing/campaigns?status=ACTIVE&limit=500",
            a.subdomain
        )),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["campaigns"][0]["name"], "Live");

    Ok(())
}

#[tokio::test]
async fn workflows_are_created_and_listed_per_agency() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    let b = common::seed_agency(&pool, "Agency B").await?;
    common::seed_workflow(&pool, b.id, "Not mine").await?;
    let app = router(pool.clone());

    let (status, body) = send(
        app.clone(),
        post_json(
            &format!("/api/{}/workflows", a.subdomain),
            json!({ "name": "Nurture", "category": "LEAD_NURTURING" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "DRAFT");
    assert_eq!(body["nodes"], json!([]));

    let (status, body) = send(app, get(&format!("/api/{}/workflows", a.subdomain))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workflows"].as_array().unwrap().len(), 1);
    assert_eq!(body["workflows"][0]["category"], "LEAD_NURTURING");

    Ok(())
}

#[tokio::test]
async fn marketing_overview_summarises_the_agency() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let a = common::seed_agency(&pool, "Agency A").await?;
    common::seed_campaign(&pool, a.id, "Live", "ACTIVE", (0, 0, 0, 0)).await?;
    common::seed_campaign(&pool, a.id, "Idea", "DRAFT", (0, 0, 0, 0)).await?;
    common::seed_lead(&pool, a.id, "one@example.com", "NEW").await?;
    common::seed_lead(&pool, a.id, "two@example.com", "CONVERTED").await?;

    let app = router(pool.clone());

    let (status, body) = send(app.clone(), get(&format!("/{}", a.subdomain))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Agency A");

    let (status, body) = send(app, get(&format!("/{}/marketing", a.subdomain))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalCampaigns"], 2);
    assert_eq!(body["stats"]["activeCampaigns"], 1);
    assert_eq!(body["stats"]["convertedLeads"], 1);
    assert_eq!(body["funnel"]["contacted"], 1);
    assert_eq!(body["funnel"]["conversionRate"], 50.0);
    assert_eq!(body["recentCampaigns"].as_array().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn malformed_input_gets_the_json_error_body() -> Result<()> {
    let Some(pool) = common::test_pool().await? else {
        return Ok(());
    };
    let agency = common::seed_agency(&pool, "Agency A").await?;
    let app = router(pool.clone());
    let base = format!("/api/{}", agency.subdomain);

    for uri in [
        format!("{base}/marketing/campaigns?status=BOGUS"),
        format!("{base}/marketing/leads?status=BOGUS"),
        format!("{base}/workflows?isActive=maybe"),
        format!("{base}/marketing/campaigns?page=two"),
        format!("{base}/marketing/campaigns/not-a-uuid"),
    ] {
        let (status, body) = send(app.clone(), get(&uri)).await?;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "invalid_request", "{uri}");
        assert!(body["error"]["message"].is_string(), "{uri}");
    }

    let (status, body) = send(
        app,
        post_json(
            &format!("{base}/marketing/campaigns"),
            json!({ "name": "Open day", "budgetCents": "lots" }),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    Ok(())
}
