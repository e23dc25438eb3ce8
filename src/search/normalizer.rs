//! Query text preparation: tokens for text relevance, plus a regex semester
//! fallback that holds even when the language model omits the field.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{FilterSet, Semester};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").unwrap());
static FALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(fall|autumn)\b").unwrap());
static SPRING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bspring\b").unwrap());

/// Subjective words kept for matching against course descriptions.
const QUALITY_TERMS: &[&str] = &[
    "easy", "hard", "good", "great", "best", "heavy", "light", "fun", "interesting",
    "challenging", "difficult", "chill", "boring", "engaging", "rigorous", "relaxed",
];

/// Conversational filler and words already covered by structured filters.
const STOP_WORDS: &[&str] = &[
    "a", "about", "afternoon", "all", "an", "and", "any", "are", "autumn", "be", "can",
    "class", "classes", "could", "course", "courses", "do", "evening", "fall", "find",
    "for", "friday", "fridays", "from", "get", "give", "have", "hour", "hours", "i",
    "in", "is", "it", "less", "like", "list", "looking", "me", "morning", "my", "need",
    "no", "not", "of", "offer", "offered", "on", "or", "per", "please", "rating",
    "recommend", "semester", "show", "some", "spring", "take", "taking", "term", "than",
    "that", "the", "there", "these", "this", "to", "under", "want", "week", "what",
    "which", "with", "without", "workload", "would", "you",
];

/// Abbreviations and variants rewritten before stop-word removal.
const SYNONYMS: &[(&str, &str)] = &[
    ("cs", "computer"),
    ("compsci", "computer"),
    ("econ", "economics"),
    ("stats", "statistics"),
    ("stat", "statistics"),
    ("psych", "psychology"),
    ("bio", "biology"),
    ("chem", "chemistry"),
    ("gov", "government"),
    ("hist", "history"),
    ("phil", "philosophy"),
    ("lit", "literature"),
    ("anthro", "anthropology"),
    ("math", "mathematics"),
    ("intro", "introduction"),
    ("prof", "professor"),
    ("classes", "course"),
    ("class", "course"),
    ("courses", "course"),
    ("easier", "easy"),
    ("harder", "hard"),
];

/// Lowercased, synonym-expanded, filler-free tokens, deduplicated in order of appearance.
pub fn normalize_query(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens: Vec<String> = Vec::new();

    for m in TOKEN_RE.find_iter(&lower) {
        let raw = m.as_str();
        let word = SYNONYMS
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
            .unwrap_or(raw);

        let keep = QUALITY_TERMS.contains(&word) || !STOP_WORDS.contains(&word);
        if keep && !tokens.iter().any(|t| t == word) {
            tokens.push(word.to_string());
        }
    }

    tokens
}

/// Semester named in the text, when exactly one of fall/spring is mentioned.
pub fn detect_semester(text: &str) -> Option<Semester> {
    let fall = FALL_RE.is_match(text);
    let spring = SPRING_RE.is_match(text);
    match (fall, spring) {
        (true, false) => Some(Semester::Fall),
        (false, true) => Some(Semester::Spring),
        _ => None,
    }
}

/// Sets `semester` from the text if nothing else has set it. Returns whether it did.
pub fn apply_semester_fallback(text: &str, filters: &mut FilterSet) -> bool {
    if filters.semester.is_some() {
        return false;
    }
    match detect_semester(text) {
        Some(semester) => {
            filters.semester = Some(semester);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purely_conversational_text_has_no_tokens() {
        assert!(normalize_query("show me classes").is_empty());
        assert!(normalize_query("Find me some courses please").is_empty());
    }

    #[test]
    fn quality_terms_survive() {
        assert_eq!(normalize_query("easy GenEd courses with no Friday classes"), vec!["easy", "gened"]);
    }

    #[test]
    fn abbreviations_expand() {
        assert_eq!(normalize_query("intro CS"), vec!["introduction", "computer"]);
    }

    #[test]
    fn semester_detection_needs_a_single_season() {
        assert_eq!(detect_semester("anything in the fall?"), Some(Semester::Fall));
        assert_eq!(detect_semester("Autumn seminars"), Some(Semester::Fall));
        assert_eq!(detect_semester("spring only"), Some(Semester::Spring));
        assert_eq!(detect_semester("fall or spring"), None);
        assert_eq!(detect_semester("waterfall models"), None);
    }

    #[test]
    fn fallback_respects_existing_semester() {
        let mut filters = FilterSet {
            semester: Some(Semester::Spring),
            ..Default::default()
        };
        assert!(!apply_semester_fallback("fall", &mut filters));
        assert_eq!(filters.semester, Some(Semester::Spring));

        let mut empty = FilterSet::default();
        assert!(apply_semester_fallback("fall", &mut empty));
        assert_eq!(empty.semester, Some(Semester::Fall));
    }
}
