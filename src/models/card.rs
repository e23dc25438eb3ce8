use serde::Serialize;

use crate::models::{ClassSize, Course, Workload};
use crate::services::qguide::{self, CommentAnalysis};

/// What a course card in the chat UI shows.
#[derive(Debug, Clone, Serialize)]
pub struct CourseCard {
    pub code: String,
    pub title: String,
    pub description: String,
    pub instructor: Option<String>,
    pub concentration: Option<String>,
    pub gen_eds: Vec<String>,
    pub q_rating: Option<f64>,
    pub workload: Option<Workload>,
    pub difficulty: Option<u8>,
    pub schedule: Option<String>,
    pub class_size: Option<ClassSize>,
    pub term: Option<String>,
    pub q_guide_summary: String,
    /// Sentiment, themes and examples drawn from student comments, when there are any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_analysis: Option<CommentAnalysis>,
}

impl From<&Course> for CourseCard {
    fn from(course: &Course) -> Self {
        let comment_analysis = if course.comments.is_empty() {
            None
        } else {
            Some(qguide::analyze_comments(&course.comments))
        };
        let q_guide_summary = match course.q_guide_summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => summary.to_string(),
            _ => qguide::mini_summary(course, comment_analysis.as_ref()),
        };

        Self {
            code: course.code.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            instructor: course.instructor.clone(),
            concentration: course.concentration.clone(),
            gen_eds: course.gen_eds.clone(),
            q_rating: course.q_rating,
            workload: course.workload.clone(),
            difficulty: course.derived_difficulty(),
            schedule: course.schedule.clone(),
            class_size: course.class_size.clone(),
            term: course.term.clone(),
            q_guide_summary,
            comment_analysis,
        }
    }
}
