use std::collections::HashSet;

use axum::http::StatusCode;

use juris_core::testutil::{MockFetcher, MockReply};

use crate::integration::common::{get_json, setup_test_app};

const STJ_PAGE: &str = r#"
    <table>
      <tr><td>REsp 1.000/SP</td><td><a href="/SCON/doc?id=1">Acórdão</a></td></tr>
      <tr><td>Tema 246</td><td><a href="/SCON/doc?id=2">Jurisprudência em teses</a></td></tr>
    </table>
"#;

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["sources"], 15);
}

#[tokio::test]
async fn one_character_query_returns_400_without_fetching() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/api/search?q=a&type=all").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        serde_json::json!({
            "results": [],
            "errors": [{
                "sourceId": "input",
                "sourceName": "Validação",
                "error": "Consulta muito curta"
            }],
            "tookMs": 0
        })
    );
    assert_eq!(app.fetcher.call_count(), 0);
}

#[tokio::test]
async fn missing_or_blank_query_returns_400() {
    let app = setup_test_app(MockFetcher::new());

    let (status, _) = get_json(app.router.clone(), "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get_json(app.router, "/api/search?q=%20%20x%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["errors"][0]["sourceId"], "input");
    assert_eq!(app.fetcher.call_count(), 0);
}

#[tokio::test]
async fn two_character_query_fans_out() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/api/search?q=ab").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.fetcher.call_count(), 15);
    assert_eq!(json["results"].as_array().unwrap().len(), 15);
    assert_eq!(json["errors"], serde_json::json!([]));
    assert!(json["tookMs"].is_u64());
}

#[tokio::test(start_paused = true)]
async fn all_sources_timing_out_still_returns_200() {
    let app = setup_test_app(MockFetcher::with_default(MockReply::Hang));

    let (status, json) = get_json(app.router, "/api/search?q=tema%20246&type=all").await;

    assert_eq!(status, StatusCode::OK);
    let errors = json["errors"].as_array().unwrap();
    let results = json["results"].as_array().unwrap();
    assert_eq!(errors.len(), 15);
    assert_eq!(results.len(), 15);
    assert!(errors.iter().all(|e| e["error"] == "timeout"));

    for result in results {
        assert_eq!(result["title"], "Abrir resultados no site");
        let url = result["url"].as_str().unwrap();
        assert!(url.starts_with("https://"));
        assert!(url.contains(".jus.br/"));
    }
}

#[tokio::test]
async fn mixed_outcomes_cover_every_source() {
    let fetcher = MockFetcher::new()
        .reply("scon.stj.jus.br", MockReply::Body(STJ_PAGE.into()))
        .reply("www.trf5.jus.br", MockReply::Fail("connection reset by peer".into()));
    let app = setup_test_app(fetcher);

    let (status, json) = get_json(app.router.clone(), "/api/search?q=tema%20246&type=temas").await;
    assert_eq!(status, StatusCode::OK);

    let results = json["results"].as_array().unwrap();
    let errors = json["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["sourceId"], "trf5");
    assert_eq!(errors[0]["error"], "Network error: connection reset by peer");

    let stj: Vec<_> = results.iter().filter(|r| r["sourceId"] == "stj").collect();
    assert_eq!(stj.len(), 2);
    assert_eq!(stj[0]["url"], "https://scon.stj.jus.br/SCON/doc?id=1");
    assert_eq!(stj[0]["snippet"], "REsp 1.000/SP");

    let covered: HashSet<_> = results
        .iter()
        .chain(errors.iter())
        .map(|v| v["sourceId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(covered.len(), 15);

    let (_, sources) = get_json(app.router, "/api/sources").await;
    let registered: HashSet<_> = sources["sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(covered, registered);
}

#[tokio::test]
async fn unknown_scope_falls_back_to_all() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/api/search?q=sumula&type=whatever").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn sources_listed_in_registry_order() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/api/sources").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 15);
    assert_eq!(json["sources"][0]["id"], "stf");
    assert_eq!(json["sources"][0]["maxResults"], 6);
    assert_eq!(json["sources"][0]["timeoutMs"], 8000);
    assert_eq!(json["sources"][14]["id"], "tjmg");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app(MockFetcher::new());

    let (status, json) = get_json(app.router, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/search"].is_object());
    assert_eq!(json["info"]["title"], "Juris API");
}
