use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::*;
use crate::search::deduplicate;
use crate::state::AppState;

#[derive(Deserialize)]
struct CompareQueryParams {
    #[serde(default)]
    codes: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub filters: FilterSet,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub summary: String,
    pub courses: Vec<CourseCard>,
    pub applied_filters: FilterSet,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub courses: Vec<CourseCard>,
    pub missing: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/courses/compare", get(compare_courses))
        .route("/courses/{code}", get(get_course))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseCard>> {
    let courses = deduplicate(state.catalog.all_courses().to_vec());
    Json(courses.iter().map(CourseCard::from).collect())
}

async fn get_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CourseCard>, AppError> {
    let course = state.catalog.course_by_code(&code).ok_or(AppError::NotFound)?;
    Ok(Json(CourseCard::from(&course)))
}

async fn compare_courses(
    State(state): State<AppState>,
    Query(params): Query<CompareQueryParams>,
) -> Result<Json<CompareResponse>, AppError> {
    let codes: Vec<&str> = params
        .codes
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if codes.is_empty() {
        return Err(AppError::BadRequest("codes must list at least one course code".to_string()));
    }

    let mut courses = Vec::new();
    let mut missing = Vec::new();
    for code in codes {
        match state.catalog.course_by_code(code) {
            Some(course) => courses.push(CourseCard::from(&course)),
            None => missing.push(code.to_string()),
        }
    }

    Ok(Json(CompareResponse { courses, missing }))
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let outcome = state
        .query
        .process_query(&req.message, req.filters, &req.history)
        .await;

    Ok(Json(ChatResponse {
        summary: outcome.summary,
        courses: outcome.courses.iter().map(CourseCard::from).collect(),
        applied_filters: outcome.applied_filters,
    }))
}
