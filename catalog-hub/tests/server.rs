use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use catalog_hub::api;
use catalog_hub_core::storage::{CatalogFixture, CatalogStore};
use catalog_hub_core::ScopedSearch;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::util::ServiceExt;

const FIXTURE: &str = r#"{
  "nodes": [
    {"id": "EFGH", "name": "Portfolio", "kind": "container"},
    {"id": "FGHI", "name": "Frameworks", "kind": "child_container", "parent_id": "EFGH"},
    {"id": "JKLM", "name": "Struts", "kind": "item", "parent_id": "EFGH", "key": "org.struts:struts"},
    {"id": "KLMN", "name": "Stripes", "kind": "item", "parent_id": "FGHI", "key": "net.sf:stripes"},
    {"id": "LMNO", "name": "Strongbox", "kind": "item", "parent_id": "FGHI"}
  ],
  "grants": [
    {"principal": {"user": "john"}, "resource_id": "EFGH", "access": "read"},
    {"principal": {"group": "devs"}, "resource_id": "FGHI", "access": "read"},
    {"principal": "anyone", "resource_id": "LMNO", "access": "read"}
  ],
  "memberships": {"ann": ["devs"]}
}"#;

fn app_from_fixture() -> axum::Router {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("catalog.json");
    std::fs::write(&path, FIXTURE).unwrap();
    let store = Arc::new(RwLock::new(CatalogStore::load(&path, 16).unwrap()));
    api::router(ScopedSearch::new(store.clone(), store))
}

async fn search(app: &axum::Router, query: &str, user: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().uri(format!("/api/components/search_view_components?{query}"));
    if let Some(user) = user {
        req = req.header("X-User-Id", user);
    }
    let resp = app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = resp.status();
    let body = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn uuids(v: &serde_json::Value) -> Vec<&str> {
    v["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["uuid"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn server_health_endpoint() {
    let app = app_from_fixture();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(axum::serve(listener, app.into_make_service()).into_future());

    tokio::time::sleep(Duration::from_millis(100)).await;
    let resp = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "OK");

    server.abort();
}

#[tokio::test]
async fn visibility_depends_on_caller() {
    let app = app_from_fixture();

    let (status, v) = search(&app, "componentId=EFGH&q=st", Some("john")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(uuids(&v), vec!["KLMN", "LMNO", "JKLM"]);
    assert_eq!(v["total"], 3);
    assert_eq!(v["projects"][0]["key"], "net.sf:stripes");

    let (_, v) = search(&app, "componentId=EFGH&q=st", Some("ann")).await;
    assert_eq!(uuids(&v), vec!["KLMN", "LMNO"]);

    let (_, v) = search(&app, "componentId=EFGH&q=st", None).await;
    assert_eq!(uuids(&v), vec!["LMNO"]);
    assert_eq!(v["total"], 1);
}

#[tokio::test]
async fn child_container_scope_and_paging() {
    let app = app_from_fixture();

    let (_, v) = search(&app, "componentId=FGHI&q=ST", Some("john")).await;
    assert_eq!(uuids(&v), vec!["KLMN", "LMNO"]);

    let (_, v) = search(&app, "componentId=EFGH&q=st&p=2&ps=1", Some("john")).await;
    assert_eq!(uuids(&v), vec!["LMNO"]);
    assert_eq!((v["p"].as_u64(), v["ps"].as_u64(), v["total"].as_u64()), (Some(2), Some(1), Some(3)));

    let (status, v) = search(&app, "componentId=EFGH&q=st&p=5&ps=1", Some("john")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(uuids(&v).is_empty());
}

#[tokio::test]
async fn error_precedence_over_http() {
    let app = app_from_fixture();

    let (status, v) = search(&app, "componentId=UNKNOWN&q=s&ps=9999", Some("john")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["errors"][0]["msg"], "Component id 'UNKNOWN' not found");

    let (status, v) = search(&app, "componentId=EFGH&q=s&ps=9999", Some("john")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["errors"][0]["msg"], "Minimum search is 2 characters");

    let (status, v) = search(&app, "componentId=EFGH&q=st&ps=9999", Some("john")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(v["errors"][0]["msg"], "Page size must be lower than or equal to 500");
}

#[test]
fn fixture_constant_is_valid() {
    let fixture: CatalogFixture = serde_json::from_str(FIXTURE).unwrap();
    assert_eq!(fixture.nodes.len(), 5);
}
