mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{actor, token_for, TestApp};
use workforce_api::access::Role;

fn report_body(hours: &str) -> serde_json::Value {
    json!({
        "kind": "work_report",
        "title": "Survey transcription",
        "platform": "Upwork",
        "hours": hours,
        "work_date": "2026-03-02"
    })
}

#[tokio::test]
async fn health_and_root_are_public() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = app.request(Method::GET, "/", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_object());
    Ok(())
}

#[tokio::test]
async fn protected_routes_need_a_valid_bearer_token() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/api/items", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/items", "not.a.jwt").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_reports_capabilities_and_routes() -> Result<()> {
    let app = TestApp::new();
    let investor = actor(Role::Worker).investor();

    let (status, body) = app.get("/api/me", &token_for(&investor)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["actor"]["id"], investor.id.to_string());

    let caps = body["data"]["capabilities"].as_array().cloned().unwrap_or_default();
    assert!(caps.contains(&json!("canViewInvestments")));
    assert!(!caps.contains(&json!("canApproveReports")));

    let routes = body["data"]["routes"].as_array().cloned().unwrap_or_default();
    assert!(routes.contains(&json!("investments")));
    Ok(())
}

#[tokio::test]
async fn review_happy_path_over_http() -> Result<()> {
    let app = TestApp::new();
    let worker = token_for(&actor(Role::Worker));
    let lead = token_for(&actor(Role::TeamLead));
    let admin = token_for(&actor(Role::ReportAdmin));

    let (status, body) = app.post("/api/items", &worker, report_body("7.5")).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(body["data"]["final_status"], "pending");

    let (status, body) = app
        .post(&format!("/api/items/{}/review", id), &lead, json!({ "decision": "approve" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["final_status"], "approved");
    assert_eq!(body["data"]["audit"]["action"], "team_lead_approved");

    let (status, body) = app
        .post(
            &format!("/api/items/{}/override", id),
            &admin,
            json!({ "decision": "rejected", "reason": "insufficient evidence" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["item"]["final_status"], "rejected");

    let (status, body) = app.get(&format!("/api/audit?entity_id={}", id), &worker).await?;
    assert_eq!(status, StatusCode::OK, "owners may read the trail of their own items");
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (status, body) = app.get("/api/items?state=admin_rejected", &lead).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn self_approval_over_http_is_forbidden() -> Result<()> {
    let app = TestApp::new();
    let lead = actor(Role::TeamLead);
    let token = token_for(&lead);

    let (_, body) = app.post("/api/items", &token, report_body("4")).await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .post(&format!("/api/items/{}/review", id), &token, json!({ "decision": "approved" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let overseer = token_for(&actor(Role::GeneralOverseer));
    let (status, body) = app.get("/api/attention", &overseer).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["kind"], "self_approval_attempt");

    let (status, _) = app.get("/api/attention", &token).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn invalid_transitions_and_input_map_to_status_codes() -> Result<()> {
    let app = TestApp::new();
    let worker = token_for(&actor(Role::Worker));
    let admin = token_for(&actor(Role::ReportAdmin));

    let (status, body) = app.post("/api/items", &worker, report_body("30")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app.post("/api/items", &worker, json!({ "title": 3 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (_, body) = app.post("/api/items", &worker, report_body("4")).await?;
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .post(&format!("/api/items/{}/override", id), &admin, json!({ "decision": "approved" }))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, _) = app
        .get("/api/items/00000000-0000-0000-0000-000000000000", &admin)
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/api/items/not-a-uuid", &admin).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn payroll_endpoint_checks_capability_and_period() -> Result<()> {
    let app = TestApp::new();
    let finance = token_for(&actor(Role::FinanceAdmin));
    let worker = token_for(&actor(Role::Worker));

    let (status, _) = app.get("/api/payroll?start=2026-03-01&end=2026-03-31", &worker).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/payroll?start=2026-03-31&end=2026-03-01", &finance).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/payroll?start=2026-03-01&end=2026-03-31", &finance).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lines"].as_array().map(Vec::len), Some(0));
    Ok(())
}
