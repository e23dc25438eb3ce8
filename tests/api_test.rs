mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::*;
use course_finder::api::router;
use course_finder::catalog::CatalogStore;
use course_finder::llm::{LlmClient, NoopLlmClient};
use course_finder::state::AppState;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(llm: Arc<dyn LlmClient>) -> Router {
    let config = test_config();
    let catalog = CatalogStore::load(&config.catalog_path).unwrap();
    router(AppState::new(catalog, llm, &config))
}

fn app() -> Router {
    app_with(Arc::new(NoopLlmClient))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_chat(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let (status, _) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn course_list_merges_sections() {
    let (status, body) = send(app(), get("/courses")).await;
    assert_eq!(status, StatusCode::OK);

    let cards = body.as_array().unwrap();
    assert_eq!(cards.len(), 6);
    let econ = cards.iter().find(|c| c["code"] == "ECON 10A").unwrap();
    assert_eq!(econ["instructor"], "Jason Furman, David Laibson");
    assert_eq!(econ["q_rating"], 4.3);
}

#[tokio::test]
async fn course_detail_accepts_loose_codes() {
    let (status, body) = send(app(), get("/courses/compsci50")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "COMPSCI 50");
    assert_eq!(body["difficulty"], 3);
    assert!(!body["q_guide_summary"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn course_card_carries_comment_analysis() {
    let (status, body) = send(app(), get("/courses/COMPSCI%2050")).await;
    assert_eq!(status, StatusCode::OK);

    let analysis = &body["comment_analysis"];
    assert_eq!(analysis["sentiment"], "very positive");
    assert_eq!(analysis["themes"][0], "amazing");
    assert_eq!(analysis["positive_examples"], json!(["Amazing course, would recommend"]));
    assert_eq!(analysis["negative_count"], 1);
    assert!(
        body["q_guide_summary"]
            .as_str()
            .unwrap()
            .ends_with("2 student comments available (very positive overall).")
    );

    let (_, uncommented) = send(app(), get("/courses/COMPSCI%20124")).await;
    assert!(uncommented.get("comment_analysis").is_none());
}

#[tokio::test]
async fn unknown_course_is_not_found() {
    let (status, body) = send(app(), get("/courses/NOPE%20999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn compare_reports_missing_codes() {
    let (status, body) = send(app(), get("/courses/compare?codes=COMPSCI%2050,NOPE%201,GENED%201040")).await;
    assert_eq!(status, StatusCode::OK);

    let found: Vec<&str> = body["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec!["COMPSCI 50", "GENED 1040"]);
    assert_eq!(body["missing"], json!(["NOPE 1"]));
}

#[tokio::test]
async fn compare_without_codes_is_rejected() {
    let (status, _) = send(app(), get("/courses/compare")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let (status, body) = send(app(), post_chat(json!({ "message": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "message must not be empty");
}

#[tokio::test]
async fn chat_without_a_model_still_filters_by_semester() {
    let (status, body) = send(app(), post_chat(json!({ "message": "fall" }))).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["appliedFilters"], json!({ "semester": "fall" }));
    assert_eq!(body["summary"], "Applied filters: semester");
    let found: Vec<&str> = body["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec!["COMPSCI 50", "ECON 10A", "GENED 1145"]);
}

#[tokio::test]
async fn chat_carries_filters_across_turns() {
    let llm = Arc::new(ScriptedLlm::new(&["{\"noFriday\": true}", ""]));
    let request = post_chat(json!({
        "message": "no friday please",
        "filters": { "concentration": "Computer Science" },
        "history": [
            { "role": "user", "content": "cs classes" },
            { "role": "assistant", "content": "" }
        ]
    }));

    let (status, body) = send(app_with(llm), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["appliedFilters"],
        json!({ "concentration": "Computer Science", "noFriday": true })
    );
    let found: Vec<&str> = body["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(found, vec!["COMPSCI 124"]);
}
