use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use juris_core::reporter::SilentReporter;
use juris_core::testutil::MockFetcher;
use juris_core::{Registry, SearchService};
use juris_server::routes;
use juris_server::state::AppState;

/// Test app wired to a scripted fetcher and the built-in registry.
pub struct TestApp {
    pub router: Router,
    pub fetcher: MockFetcher,
}

pub fn setup_test_app(fetcher: MockFetcher) -> TestApp {
    let registry = Registry::builtin().expect("builtin registry");
    let search = SearchService::new(fetcher.clone(), Arc::new(registry))
        .with_reporter(Arc::new(SilentReporter));
    let state = Arc::new(AppState { search });

    TestApp {
        router: routes::router(state),
        fetcher,
    }
}

/// Issue a GET and decode the JSON body.
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}
