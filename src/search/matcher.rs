//! Structured filtering over the catalog.
//!
//! Every set filter narrows the working set in turn. All passes are plain
//! intersections except time of day, where the requested flags are ORed
//! before the pass is applied. Missing course data generally passes
//! (workload, difficulty, class size, Friday check) so that gaps in the
//! Q Guide export do not hide courses.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::{ClassSize, ClassSizeBucket, Course, FilterSet, Semester, TimeOfDay, normalize_code};

static HOUR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^:\d])(\d{1,2})(?::\d{2})?").unwrap());
static AM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\d\s*a\.?m\b").unwrap());
static PM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\d\s*p\.?m\b").unwrap());
static FRIDAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfri").unwrap());
static DAY_CODES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[MTWRS]*F[MTWRS]*\b").unwrap());

/// Department shorthands: (alias, display name, course-code prefix).
const DEPARTMENT_ALIASES: &[(&str, &str, &str)] = &[
    ("cs", "computer science", "COMPSCI"),
    ("compsci", "computer science", "COMPSCI"),
    ("computer science", "computer science", "COMPSCI"),
    ("anthro", "anthropology", "ANTHRO"),
    ("anthropology", "anthropology", "ANTHRO"),
    ("econ", "economics", "ECON"),
    ("economics", "economics", "ECON"),
    ("stats", "statistics", "STAT"),
    ("stat", "statistics", "STAT"),
    ("statistics", "statistics", "STAT"),
    ("gov", "government", "GOV"),
    ("government", "government", "GOV"),
    ("psych", "psychology", "PSY"),
    ("psychology", "psychology", "PSY"),
    ("math", "mathematics", "MATH"),
    ("mathematics", "mathematics", "MATH"),
    ("hist", "history", "HIST"),
    ("history", "history", "HIST"),
    ("phil", "philosophy", "PHIL"),
    ("philosophy", "philosophy", "PHIL"),
    ("physics", "physics", "PHYSICS"),
    ("chem", "chemistry", "CHEM"),
    ("chemistry", "chemistry", "CHEM"),
    ("ls", "life sciences", "LIFESCI"),
    ("lifesci", "life sciences", "LIFESCI"),
    ("mcb", "molecular and cellular biology", "MCB"),
    ("es", "engineering sciences", "ENG-SCI"),
    ("engsci", "engineering sciences", "ENG-SCI"),
];

/// Courses satisfying every set filter, in catalog order.
///
/// `tokens` are the normalized query words; when empty, no text-relevance pass runs.
pub fn apply_filters(courses: &[Course], filters: &FilterSet, tokens: &[String]) -> Vec<Course> {
    let mut working: Vec<&Course> = courses.iter().collect();
    debug!("Matching against {} courses", working.len());

    if let Some(semester) = filters.semester.filter(|s| *s != Semester::All) {
        working.retain(|c| matches_semester(c, semester));
        debug!("semester={} -> {}", semester.as_str(), working.len());
    }

    if let Some(department) = filters.concentration.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        working = filter_department(working, department);
        debug!("concentration={} -> {}", department, working.len());
    }

    if let Some(gen_ed) = filters.gen_ed.as_ref().filter(|g| g.is_active()) {
        let category = gen_ed.category().map(str::to_lowercase);
        working.retain(|c| matches_gen_ed(c, category.as_deref()));
        debug!("genEd={:?} -> {}", gen_ed, working.len());
    }

    if let Some(floor) = filters.min_rating {
        working.retain(|c| c.rating_or_zero() >= floor);
        debug!("minRating={} -> {}", floor, working.len());
    }

    if let Some(ceiling) = filters.effective_workload_ceiling() {
        working.retain(|c| passes_workload(c, ceiling));
        debug!("workloadHours<{} -> {}", ceiling, working.len());
    }

    if let Some(floor) = filters.difficulty {
        working.retain(|c| c.derived_difficulty().is_none_or(|d| d >= floor));
        debug!("difficulty>={} -> {}", floor, working.len());
    }

    if filters.no_friday == Some(true) {
        working.retain(|c| !c.schedule.as_deref().is_some_and(meets_on_friday));
        debug!("noFriday -> {}", working.len());
    }

    if let Some(bucket) = filters.class_size {
        working.retain(|c| matches_class_size(c, bucket));
        debug!("classSize={:?} -> {}", bucket, working.len());
    }

    if let Some(instructor) = filters.instructor.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        let needle = instructor.to_lowercase();
        working.retain(|c| {
            c.instructor
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        });
        debug!("instructor={} -> {}", instructor, working.len());
    }

    let times = filters.requested_times();
    if !times.is_empty() {
        working.retain(|c| {
            c.schedule
                .as_deref()
                .is_some_and(|s| times.iter().any(|t| matches_time_of_day(s, *t)))
        });
        debug!("timeOfDay={:?} -> {}", times, working.len());
    }

    if !tokens.is_empty() {
        working.retain(|c| {
            let text = c.search_text();
            tokens.iter().any(|t| text.contains(t.as_str()))
        });
        debug!("text tokens={:?} -> {}", tokens, working.len());
    }

    working.into_iter().cloned().collect()
}

fn matches_semester(course: &Course, semester: Semester) -> bool {
    course
        .term
        .as_deref()
        .is_some_and(|term| term.to_lowercase().contains(semester.as_str()))
}

fn filter_department<'a>(courses: Vec<&'a Course>, department: &str) -> Vec<&'a Course> {
    let requested = department.to_lowercase();
    let alias = DEPARTMENT_ALIASES
        .iter()
        .find(|(name, _, _)| *name == requested);
    let display = alias.map(|(_, display, _)| *display).unwrap_or(requested.as_str());

    let matched: Vec<&Course> = courses
        .iter()
        .copied()
        .filter(|c| matches_department(c, display))
        .collect();

    match alias {
        Some((_, _, prefix)) if matched.is_empty() => {
            debug!("No concentration match for {}, retrying by code prefix {}", department, prefix);
            courses
                .into_iter()
                .filter(|c| normalize_code(&c.code).starts_with(prefix))
                .collect()
        }
        _ => matched,
    }
}

fn matches_department(course: &Course, department: &str) -> bool {
    course
        .concentration
        .as_deref()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .is_some_and(|c| c.contains(department) || department.contains(c.as_str()))
}

fn matches_gen_ed(course: &Course, category: Option<&str>) -> bool {
    if !course.is_gen_ed() {
        return false;
    }
    match category {
        None => true,
        Some(category) => course
            .gen_eds
            .iter()
            .any(|label| label.to_lowercase().contains(category)),
    }
}

/// Strict less-than; unreadable workloads pass.
fn passes_workload(course: &Course, ceiling: f64) -> bool {
    course.workload_hours().is_none_or(|hours| hours < ceiling)
}

fn matches_class_size(course: &Course, bucket: ClassSizeBucket) -> bool {
    match &course.class_size {
        None => true,
        Some(ClassSize::Count(count)) => ClassSizeBucket::for_count(*count) == bucket,
        Some(ClassSize::Label(label)) => {
            ClassSizeBucket::from_label(label).is_none_or(|b| b == bucket)
        }
    }
}

pub fn meets_on_friday(schedule: &str) -> bool {
    FRIDAY_RE.is_match(schedule) || DAY_CODES_RE.is_match(schedule)
}

fn hour_tokens(schedule: &str) -> Vec<u32> {
    HOUR_RE
        .captures_iter(schedule)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect()
}

pub fn matches_time_of_day(schedule: &str, time: TimeOfDay) -> bool {
    let hours = hour_tokens(schedule);
    let am = AM_RE.is_match(schedule);
    let pm = PM_RE.is_match(schedule);

    match time {
        TimeOfDay::Morning => am || hours.iter().any(|h| (7..=11).contains(h)),
        TimeOfDay::Afternoon => pm && hours.iter().any(|h| *h == 12 || (1..=4).contains(h)),
        TimeOfDay::Evening => pm && hours.iter().any(|h| (5..=11).contains(h)),
    }
}
