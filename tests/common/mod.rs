#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use course_finder::config::{AppConfig, LlmConfig};
use course_finder::llm::{CompletionRequest, LlmClient, LlmError};
use course_finder::models::{ClassSize, Course, Workload};

pub fn course(code: &str, title: &str) -> Course {
    Course {
        code: code.to_string(),
        title: title.to_string(),
        description: String::new(),
        instructor: None,
        concentration: None,
        gen_eds: Vec::new(),
        q_rating: None,
        workload: None,
        schedule: None,
        class_size: None,
        term: None,
        comments: Vec::new(),
        q_guide_summary: None,
    }
}

pub fn cs_course(code: &str, schedule: &str) -> Course {
    Course {
        concentration: Some("Computer Science".to_string()),
        schedule: Some(schedule.to_string()),
        ..course(code, "Computing")
    }
}

pub fn with_workload(mut course: Course, workload: &str) -> Course {
    course.workload = Some(Workload::Text(workload.to_string()));
    course
}

pub fn with_size(mut course: Course, size: ClassSize) -> Course {
    course.class_size = Some(size);
    course
}

pub fn section(code: &str, instructor: &str, rating: f64) -> Course {
    Course {
        instructor: Some(instructor.to_string()),
        q_rating: Some(rating),
        ..course(code, "Sectioned Course")
    }
}

pub fn codes(courses: &[Course]) -> Vec<&str> {
    courses.iter().map(|c| c.code.as_str()).collect()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        catalog_path: "data/courses.json".into(),
        llm: LlmConfig {
            api_key: "test".to_string(),
            timeout: Duration::from_millis(100),
            max_retries: 0,
            ..LlmConfig::default()
        },
    }
}

/// Replays canned replies in order; errors once they run out.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    pub calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Never answers within any reasonable timeout.
pub struct HangingLlm;

#[async_trait]
impl LlmClient for HangingLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("{\"semester\": \"spring\"}".to_string())
    }
}
