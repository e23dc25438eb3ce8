use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::models::Course;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

const POSITIVE_WORDS: &[&str] = &[
    "great", "excellent", "good", "best", "amazing", "helpful", "enjoyed", "love",
    "interesting", "engaging", "clear", "recommend", "fantastic", "awesome", "gem",
    "loved", "goated",
];

const NEGATIVE_WORDS: &[&str] = &[
    "difficult", "hard", "boring", "confusing", "unclear", "challenging", "tough",
    "disappointed", "waste", "terrible", "awful", "useless", "frustrating", "bad",
    "poor", "worse",
];

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "but", "by", "can", "class", "course", "did", "do", "does",
    "don", "for", "from", "get", "had", "has", "have", "he", "her", "his", "how", "i",
    "if", "in", "into", "is", "it", "its", "just", "lot", "me", "more", "most", "my",
    "not", "of", "on", "one", "or", "other", "out", "really", "s", "she", "so", "some",
    "t", "take", "than", "that", "the", "their", "them", "there", "they", "this", "to",
    "very", "was", "we", "were", "what", "when", "which", "who", "will", "with",
    "would", "you", "your",
];

const THEME_LIMIT: usize = 10;
const EXAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentAnalysis {
    pub themes: Vec<String>,
    pub sentiment: &'static str,
    pub positive_examples: Vec<String>,
    pub negative_examples: Vec<String>,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
}

/// Keyword sentiment and frequency themes over a course's student comments.
pub fn analyze_comments(comments: &[String]) -> CommentAnalysis {
    let mut positive_hits = 0usize;
    let mut negative_hits = 0usize;
    let mut positive = Vec::new();
    let mut negative = Vec::new();
    let mut neutral_count = 0usize;

    for comment in comments {
        let lower = comment.to_lowercase();
        let pos: usize = POSITIVE_WORDS.iter().map(|w| lower.matches(w).count()).sum();
        let neg: usize = NEGATIVE_WORDS.iter().map(|w| lower.matches(w).count()).sum();
        positive_hits += pos;
        negative_hits += neg;

        if pos > neg {
            positive.push(comment.clone());
        } else if neg > pos {
            negative.push(comment.clone());
        } else {
            neutral_count += 1;
        }
    }

    let sentiment = if comments.is_empty() {
        "neutral"
    } else if positive_hits as f64 > negative_hits as f64 * 1.5 {
        "very positive"
    } else if positive_hits > negative_hits {
        "positive"
    } else if negative_hits as f64 > positive_hits as f64 * 1.5 {
        "very negative"
    } else if negative_hits > positive_hits {
        "negative"
    } else {
        "mixed"
    };

    CommentAnalysis {
        themes: themes(comments),
        sentiment,
        positive_count: positive.len(),
        negative_count: negative.len(),
        neutral_count,
        positive_examples: positive.into_iter().take(EXAMPLE_LIMIT).collect(),
        negative_examples: negative.into_iter().take(EXAMPLE_LIMIT).collect(),
    }
}

fn themes(comments: &[String]) -> Vec<String> {
    let text = comments.join(" ").to_lowercase();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for m in WORD_RE.find_iter(&text) {
        let word = m.as_str();
        if ENGLISH_STOP_WORDS.contains(&word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            first_seen.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts.
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
        .into_iter()
        .take(THEME_LIMIT)
        .map(str::to_string)
        .collect()
}

/// Card blurb for courses without a precomputed Q Guide summary.
pub fn mini_summary(course: &Course, analysis: Option<&CommentAnalysis>) -> String {
    let title = if course.title.is_empty() { "Unknown Course" } else { course.title.as_str() };
    let instructor = course.instructor.as_deref().unwrap_or("Unknown Professor");
    let workload = course
        .workload
        .as_ref()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "Not specified".to_string());
    let rating = course
        .q_rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "Not rated".to_string());

    let mut summary = format!(
        "{} taught by {}. Workload: {}, Q Rating: {}.",
        title, instructor, workload, rating
    );

    match analysis {
        Some(analysis) if !course.comments.is_empty() => summary.push_str(&format!(
            " {} student comments available ({} overall).",
            course.comments.len(),
            analysis.sentiment
        )),
        _ => summary.push_str(" No student comments available."),
    }

    summary
}
