use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::llm::{CompletionRequest, LlmClient, complete_bounded};
use crate::models::{ChatMessage, Course, FilterSet};

pub const NO_MATCHES_MESSAGE: &str =
    "No courses match your criteria. Try removing a filter or broadening your search.";

const NO_MATCHES_MARKER: &str = "no courses match your criteria";

/// Courses described to the model; cards carry the rest.
const PROMPT_COURSE_LIMIT: usize = 10;

const SUMMARY_PROMPT: &str = r#"You are the voice of a Harvard course-search chat.
Course cards are rendered below your reply and already show every course's details.

Rules:
- If courses were found, reply with an empty string unless the student asked something the cards cannot answer;
  in that case answer in at most two short sentences. Never list course codes, titles, ratings, workloads or
  schedules in prose.
- If zero courses were found, reply with exactly: "No courses match your criteria." and optionally one short
  suggestion for which filter to relax.
- Never invent courses."#;

/// Writes the short conversational preamble above the course cards.
pub struct ResponseComposer {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
    retries: u32,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration, retries: u32) -> Self {
        Self { llm, timeout, retries }
    }

    pub async fn compose(&self, text: &str, courses: &[Course], filters: &FilterSet) -> String {
        let request = build_request(text, courses, filters);

        match complete_bounded(self.llm.as_ref(), request, self.timeout, self.retries).await {
            Ok(reply) => accept_reply(reply, courses.is_empty(), filters),
            Err(e) => {
                warn!("Summary generation unavailable, using fallback: {}", e);
                fallback_summary(courses.is_empty(), filters)
            }
        }
    }
}

fn build_request(text: &str, courses: &[Course], filters: &FilterSet) -> CompletionRequest {
    let listing = courses
        .iter()
        .take(PROMPT_COURSE_LIMIT)
        .map(|c| format!("- {} {}", c.code, c.title))
        .collect::<Vec<_>>()
        .join("\n");
    let applied = serde_json::to_string(filters).unwrap_or_else(|_| "{}".to_string());

    CompletionRequest {
        system: SUMMARY_PROMPT.to_string(),
        messages: vec![ChatMessage::user(format!(
            "Student message: {}\nApplied filters: {}\nCourses found: {}\n{}",
            text,
            applied,
            courses.len(),
            listing
        ))],
        json_mode: false,
        temperature: Some(0.3),
        max_tokens: Some(120),
    }
}

/// Keeps the model's reply only when it agrees with the result set.
fn accept_reply(reply: String, no_matches: bool, filters: &FilterSet) -> String {
    let reply = reply.trim().trim_matches('"').trim().to_string();
    let says_no_matches = reply.to_lowercase().contains(NO_MATCHES_MARKER);

    match (no_matches, says_no_matches) {
        (true, true) => reply,
        (false, false) => reply,
        _ => fallback_summary(no_matches, filters),
    }
}

/// Deterministic preamble when the model cannot be used.
pub fn fallback_summary(no_matches: bool, filters: &FilterSet) -> String {
    if no_matches {
        return NO_MATCHES_MESSAGE.to_string();
    }
    let keys = filters.applied_keys();
    if keys.is_empty() {
        String::new()
    } else {
        format!("Applied filters: {}", keys.join(", "))
    }
}
