use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::config::LlmConfig;
use crate::llm::LlmClient;
use crate::models::{ChatMessage, Course, FilterSet};
use crate::search::{
    FilterExtractor, ResponseComposer, apply_filters, apply_semester_fallback, deduplicate,
    normalize_query,
};

/// Per-request bundle, dropped once the response is composed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub request_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub text: String,
    pub tokens: Vec<String>,
    pub filters: FilterSet,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub summary: String,
    pub courses: Vec<Course>,
    pub applied_filters: FilterSet,
}

/// normalize -> extract -> match -> dedupe -> compose, one request at a time.
pub struct QueryService {
    catalog: Arc<CatalogStore>,
    extractor: FilterExtractor,
    composer: ResponseComposer,
}

impl QueryService {
    pub fn new(catalog: Arc<CatalogStore>, llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self {
            catalog,
            extractor: FilterExtractor::new(llm.clone(), config.timeout, config.max_retries),
            composer: ResponseComposer::new(llm, config.timeout, config.max_retries),
        }
    }

    /// Never fails: every external-service failure degrades to a fallback value.
    pub async fn process_query(
        &self,
        text: &str,
        existing: FilterSet,
        history: &[ChatMessage],
    ) -> QueryOutcome {
        let mut ctx = QueryContext {
            request_id: Uuid::new_v4(),
            received_at: Utc::now(),
            text: text.trim().to_string(),
            tokens: normalize_query(text),
            filters: existing,
            history: history.to_vec(),
        };
        info!("[{}] Processing query: {:?}", ctx.request_id, ctx.text);
        debug!("[{}] Query tokens: {:?}", ctx.request_id, ctx.tokens);

        ctx.filters = self
            .extractor
            .extract(&ctx.text, &ctx.filters, &ctx.history)
            .await;
        if apply_semester_fallback(&ctx.text, &mut ctx.filters) {
            info!("[{}] Semester inferred from text: {:?}", ctx.request_id, ctx.filters.semester);
        }

        let matched = apply_filters(self.catalog.all_courses(), &ctx.filters, &ctx.tokens);
        let courses = deduplicate(matched);
        info!("[{}] {} courses matched", ctx.request_id, courses.len());

        let summary = self.composer.compose(&ctx.text, &courses, &ctx.filters).await;

        let elapsed = Utc::now() - ctx.received_at;
        info!("[{}] Query finished in {} ms", ctx.request_id, elapsed.num_milliseconds());

        QueryOutcome {
            summary,
            courses,
            applied_filters: ctx.filters,
        }
    }
}
