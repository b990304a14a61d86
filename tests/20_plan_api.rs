mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{random_id, RecordingRevalidator, TestApp, ROOT_DOMAIN};

#[tokio::test]
async fn foreign_delete_is_not_found_and_owner_delete_invalidates_once() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "hello", true).await;
    let uri = format!("/api/plan?planId={}", plan.id);

    // Bob does not own "blog"
    let bob = app.token_for(&app.bob);
    let res = app.request(Method::DELETE, &uri, Some(&bob), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(app.store.plan(plan.id).await.is_some());
    assert!(app.revalidator.calls().is_empty());

    let alice = app.token_for(&app.alice);
    let res = app.request(Method::DELETE, &uri, Some(&alice), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(app.store.plan(plan.id).await.is_none());

    let calls = app.revalidator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].hostname, format!("blog.{}", ROOT_DOMAIN));
    assert_eq!(calls[0].slug.as_deref(), Some("hello"));
    Ok(())
}

#[tokio::test]
async fn not_found_is_identical_for_missing_and_foreign_plans() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "private", false).await;
    let bob = app.token_for(&app.bob);

    let foreign = app.get(&format!("/api/plan?planId={}", plan.id), Some(&bob)).await?;
    let missing = app.get(&format!("/api/plan?planId={}", random_id()), Some(&bob)).await?;

    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body, missing.body);
    Ok(())
}

#[tokio::test]
async fn not_found_is_identical_for_missing_and_foreign_writes() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "hello", true).await;
    let bob = app.token_for(&app.bob);

    let foreign = app
        .request(Method::PUT, "/api/plan", Some(&bob), Some(json!({ "id": plan.id, "title": "x" })))
        .await?;
    let missing = app
        .request(Method::PUT, "/api/plan", Some(&bob), Some(json!({ "id": random_id(), "title": "x" })))
        .await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body, missing.body);

    let foreign = app
        .request(Method::DELETE, &format!("/api/plan?planId={}", plan.id), Some(&bob), None)
        .await?;
    let missing = app
        .request(Method::DELETE, &format!("/api/plan?planId={}", random_id()), Some(&bob), None)
        .await?;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body, missing.body);

    assert_eq!(app.store.plan(plan.id).await.unwrap().title.as_deref(), Some("Title of hello"));
    assert!(app.revalidator.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn mistyped_update_body_is_a_bad_request() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "hello", true).await;
    let alice = app.token_for(&app.alice);

    for body in [json!({ "id": 123 }), json!({ "id": plan.id, "published": "true" })] {
        let res = app.request(Method::PUT, "/api/plan", Some(&alice), Some(body)).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        let json = res.json();
        assert_eq!(json["error"], true);
        assert_eq!(json["code"], "BAD_REQUEST");
    }

    // No JSON content type at all
    let res = app.request(Method::PUT, "/api/plan", Some(&alice), None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    assert!(app.store.plan(plan.id).await.unwrap().published);
    assert!(app.revalidator.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn owner_reads_plan_with_site() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "hello", false).await;
    let alice = app.token_for(&app.alice);

    let res = app.get(&format!("/api/plan?planId={}", plan.id), Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.json()["data"];
    assert_eq!(data["slug"], "hello");
    assert_eq!(data["site"]["subdomain"], "blog");
    Ok(())
}

#[tokio::test]
async fn malformed_plan_id_is_a_bad_request() -> Result<()> {
    let app = TestApp::new().await;
    let alice = app.token_for(&app.alice);

    let res = app.get("/api/plan?planId=not-a-uuid", Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["error"], true);
    Ok(())
}

#[tokio::test]
async fn listing_a_foreign_site_is_empty() -> Result<()> {
    let app = TestApp::new().await;
    app.seed_plan(&app.blog, "hello", true).await;
    let bob = app.token_for(&app.bob);

    let res = app.get(&format!("/api/plan?siteId={}", app.blog.id), Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::OK);
    let data = &res.json()["data"];
    assert_eq!(data["plans"], json!([]));
    assert!(data["site"].is_null());
    Ok(())
}

#[tokio::test]
async fn listing_filters_on_published_flag() -> Result<()> {
    let app = TestApp::new().await;
    app.seed_plan(&app.blog, "live", true).await;
    app.seed_plan(&app.blog, "draft", false).await;
    let alice = app.token_for(&app.alice);

    let res = app.get(&format!("/api/plan?siteId={}", app.blog.id), Some(&alice)).await?;
    let plans = res.json()["data"]["plans"].clone();
    assert_eq!(plans.as_array().map(Vec::len), Some(1));
    assert_eq!(plans[0]["slug"], "live");

    let res = app
        .get(&format!("/api/plan?siteId={}&published=false", app.blog.id), Some(&alice))
        .await?;
    let data = res.json()["data"].clone();
    assert_eq!(data["plans"][0]["slug"], "draft");
    assert_eq!(data["site"]["id"], app.blog.id.to_string());

    let res = app
        .get(&format!("/api/plan?siteId={}&published=maybe", app.blog.id), Some(&alice))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_returns_plan_id_of_unpublished_plan() -> Result<()> {
    let app = TestApp::new().await;
    let alice = app.token_for(&app.alice);

    let uri = format!("/api/plan?siteId={}", app.blog.id);
    let res = app.request(Method::POST, &uri, Some(&alice), None).await?;
    assert_eq!(res.status, StatusCode::CREATED);

    let plan_id: Uuid = res.json()["data"]["planId"].as_str().unwrap().parse()?;
    let stored = app.store.plan(plan_id).await.unwrap();
    assert!(!stored.published);
    assert_eq!(stored.site_id, app.blog.id);
    assert!(app.revalidator.calls().is_empty());

    // Bob cannot create on alice's site
    let bob = app.token_for(&app.bob);
    let res = app.request(Method::POST, &uri, Some(&bob), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn update_reports_failed_invalidations_as_warnings() -> Result<()> {
    let host = format!("blog.{}", ROOT_DOMAIN);
    let app = TestApp::with_revalidator(RecordingRevalidator::failing_on(&host)).await;
    let plan = app.seed_plan(&app.blog, "hello", true).await;
    let alice = app.token_for(&app.alice);

    let body = json!({ "id": plan.id, "title": "Renamed", "slug": "renamed" });
    let res = app.request(Method::PUT, "/api/plan", Some(&alice), Some(body)).await?;
    assert_eq!(res.status, StatusCode::OK);

    let json = res.json();
    assert_eq!(json["data"]["title"], "Renamed");
    // New and previous slug, both on the failing host
    let warnings = json["warnings"].as_array().cloned().unwrap_or_default();
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|w| w["hostname"] == host.as_str()));

    let stored = app.store.plan(plan.id).await.unwrap();
    assert_eq!(stored.slug, "renamed");
    let mut slugs: Vec<_> = app.revalidator.calls().into_iter().filter_map(|c| c.slug).collect();
    slugs.sort();
    assert_eq!(slugs, vec!["hello", "renamed"]);
    Ok(())
}

#[tokio::test]
async fn foreign_update_leaves_plan_untouched() -> Result<()> {
    let app = TestApp::new().await;
    let plan = app.seed_plan(&app.blog, "hello", true).await;
    let bob = app.token_for(&app.bob);

    // Domain fields in the body are ignored
    let body = json!({ "id": plan.id, "title": "Hijacked", "subdomain": "notes" });
    let res = app.request(Method::PUT, "/api/plan", Some(&bob), Some(body)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let stored = app.store.plan(plan.id).await.unwrap();
    assert_eq!(stored.title.as_deref(), Some("Title of hello"));
    assert!(app.revalidator.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() -> Result<()> {
    let app = TestApp::new().await;
    app.seed_plan(&app.blog, "taken", true).await;
    let plan = app.seed_plan(&app.blog, "other", true).await;
    let alice = app.token_for(&app.alice);

    let body = json!({ "id": plan.id, "slug": "taken" });
    let res = app.request(Method::PUT, "/api/plan", Some(&alice), Some(body)).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(app.revalidator.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn unsupported_method_lists_allowed_methods() -> Result<()> {
    let app = TestApp::new().await;
    let alice = app.token_for(&app.alice);

    let res = app.request(Method::PATCH, "/api/plan", Some(&alice), None).await?;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers[header::ALLOW], "GET, POST, DELETE, PUT");
    assert_eq!(res.json()["message"], "Method PATCH Not Allowed");
    Ok(())
}
