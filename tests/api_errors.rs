//! Error responses that do not depend on database contents.
//!
//! The pool points at a closed port, so any handler that reaches the
//! database fails.

mod common;

use agency_portal_server::router;
use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{get, post_json, send};

#[tokio::test]
async fn database_failure_is_an_opaque_500() -> Result<()> {
    let app = router(common::unreachable_pool());

    for uri in [
        "/api/acme/marketing/campaigns",
        "/api/acme/marketing/leads",
        "/api/acme/workflows",
        "/api/acme/student/portal",
        "/acme/marketing",
        "/health",
    ] {
        let (status, body) = send(app.clone(), get(uri)).await?;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["error"]["code"], "internal_error", "{uri}");
        assert_eq!(body["error"]["message"], "An internal error occurred", "{uri}");

        let text = body.to_string();
        assert!(!text.contains("127.0.0.1"), "{uri} leaked connection details");
        assert!(!text.contains("secret"), "{uri} leaked credentials");
    }

    Ok(())
}

#[tokio::test]
async fn writes_fail_the_same_way() -> Result<()> {
    let app = router(common::unreachable_pool());

    let (status, body) = send(
        app,
        post_json(
            "/api/acme/marketing/campaigns",
            json!({ "name": "Open day" }),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "internal_error");

    Ok(())
}

#[tokio::test]
async fn unknown_routes_are_404() -> Result<()> {
    let (status, _) = send(
        router(common::unreachable_pool()),
        get("/api/acme/marketing/unknown"),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
