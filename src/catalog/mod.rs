use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Course, normalize_code};
use crate::search::dedup::deduplicate;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog contains no courses")]
    Empty,
}

/// The catalog file is either a list of courses or an object keyed by course code.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<Course>),
    Keyed(BTreeMap<String, Course>),
}

/// Immutable, in-memory course catalog shared read-only across requests.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    courses: Vec<Course>,
    by_code: HashMap<String, Vec<usize>>,
}

impl CatalogStore {
    pub fn new(courses: Vec<Course>) -> Self {
        let mut by_code: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, course) in courses.iter().enumerate() {
            by_code.entry(normalize_code(&course.code)).or_default().push(idx);
        }
        Self { courses, by_code }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let courses = match serde_json::from_str::<CatalogFile>(raw)? {
            CatalogFile::List(courses) => courses,
            CatalogFile::Keyed(map) => map
                .into_iter()
                .map(|(key, mut course)| {
                    if course.code.trim().is_empty() {
                        course.code = key;
                    }
                    course
                })
                .collect(),
        };

        let (courses, skipped): (Vec<Course>, Vec<Course>) = courses
            .into_iter()
            .partition(|c| !c.code.trim().is_empty());
        if !skipped.is_empty() {
            warn!("Skipped {} catalog rows without a course code", skipped.len());
        }

        if courses.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(courses))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let store = Self::from_json_str(&raw)?;
        info!(
            "Loaded {} catalog rows ({} distinct courses) from {}",
            store.len(),
            store.by_code.len(),
            path.display()
        );
        Ok(store)
    }

    /// Every row, sections included, in file order.
    pub fn all_courses(&self) -> &[Course] {
        &self.courses
    }

    /// One record per course code; multiple sections are merged.
    pub fn course_by_code(&self, code: &str) -> Option<Course> {
        let rows: Vec<Course> = self
            .by_code
            .get(&normalize_code(code))?
            .iter()
            .map(|&idx| self.courses[idx].clone())
            .collect();
        deduplicate(rows).into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassSize;

    #[test]
    fn loads_keyed_catalog_and_fills_codes() {
        let raw = r#"{
            "COMPSCI 50": { "title": "Intro to CS", "professor": "Malan", "q_rating": 4.2 },
            "ECON 10A": { "code": "ECON 10A", "title": "Principles of Economics" }
        }"#;
        let store = CatalogStore::from_json_str(raw).unwrap();
        assert_eq!(store.len(), 2);

        let cs = store.course_by_code("compsci50").unwrap();
        assert_eq!(cs.code, "COMPSCI 50");
        assert_eq!(cs.instructor.as_deref(), Some("Malan"));
    }

    #[test]
    fn float_class_size_does_not_break_the_load() {
        let raw = r#"[
            { "code": "STAT 110", "title": "Probability", "class_size": 45.0 },
            { "code": "EXPOS 20", "title": "Writing", "class_size": "small" }
        ]"#;
        let store = CatalogStore::from_json_str(raw).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.course_by_code("STAT 110").unwrap().class_size,
            Some(ClassSize::Count(45))
        );
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(CatalogStore::from_json_str("[]"), Err(CatalogError::Empty)));
    }

    #[test]
    fn unknown_code_is_absent() {
        let store = CatalogStore::from_json_str(r#"[{ "code": "STAT 110", "title": "Probability" }]"#)
            .unwrap();
        assert!(store.course_by_code("STAT 111").is_none());
    }
}
