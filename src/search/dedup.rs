use std::collections::HashMap;

use tracing::debug;

use crate::models::{Course, normalize_code};

const MAX_LISTED_INSTRUCTORS: usize = 2;

struct Group {
    best: Course,
    instructors: Vec<String>,
}

/// Collapses sections sharing a course code into one record.
///
/// The highest-rated section represents the course (first seen wins ties) and,
/// when sections have different instructors, its instructor field lists up to
/// two of them followed by "& others" if there were more. A lone record is
/// returned untouched, so running this on its own output changes nothing.
pub fn deduplicate(courses: Vec<Course>) -> Vec<Course> {
    let total = courses.len();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Group> = HashMap::new();

    for course in courses {
        let key = normalize_code(&course.code);
        let instructor = course
            .instructor
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        match groups.get_mut(&key) {
            Some(group) => {
                if let Some(name) = instructor {
                    if !group.instructors.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                        group.instructors.push(name);
                    }
                }
                if course.rating_or_zero() > group.best.rating_or_zero() {
                    group.best = course;
                }
            }
            None => {
                order.push(key.clone());
                groups.insert(
                    key,
                    Group {
                        best: course,
                        instructors: instructor.into_iter().collect(),
                    },
                );
            }
        }
    }

    let deduped: Vec<Course> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|group| {
            let mut best = group.best;
            if group.instructors.len() > 1 {
                best.instructor = Some(format_instructors(&group.instructors));
            }
            best
        })
        .collect();

    if deduped.len() < total {
        debug!("Collapsed {} rows into {} courses", total, deduped.len());
    }
    deduped
}

fn format_instructors(instructors: &[String]) -> String {
    let listed = instructors[..instructors.len().min(MAX_LISTED_INSTRUCTORS)].join(", ");
    if instructors.len() > MAX_LISTED_INSTRUCTORS {
        format!("{} & others", listed)
    } else {
        listed
    }
}
