use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// One catalog row. Sections of the same course share a `code` and differ by instructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default, alias = "id", alias = "course_id")]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "professor")]
    pub instructor: Option<String>,
    #[serde(default, alias = "department")]
    pub concentration: Option<String>,
    #[serde(default)]
    pub gen_eds: Vec<String>,
    #[serde(default, alias = "rating")]
    pub q_rating: Option<f64>,
    #[serde(default)]
    pub workload: Option<Workload>,
    #[serde(default, alias = "class_times")]
    pub schedule: Option<String>,
    #[serde(default)]
    pub class_size: Option<ClassSize>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_guide_summary: Option<String>,
}

/// Workload as the Q Guide reports it: a number of hours or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Workload {
    Hours(f64),
    Text(String),
}

impl Workload {
    /// First number found in the value, if any.
    pub fn hours(&self) -> Option<f64> {
        match self {
            Workload::Hours(h) => Some(*h),
            Workload::Text(text) => HOURS_RE
                .find(text)
                .and_then(|m| m.as_str().parse::<f64>().ok()),
        }
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Workload::Hours(h) => write!(f, "{} hours per week", h),
            Workload::Text(text) => f.write_str(text),
        }
    }
}

/// Enrollment as a head count or a bucket label ("small", "medium", "large").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassSize {
    Count(#[serde(deserialize_with = "rounded_count")] u32),
    Label(String),
}

/// Some exports write head counts as floats ("45.0").
fn rounded_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() || raw < 0.0 || raw > u32::MAX as f64 {
        return Err(de::Error::custom(format!("invalid class size {}", raw)));
    }
    Ok(raw.round() as u32)
}

impl Course {
    /// Rating with missing values treated as zero.
    pub fn rating_or_zero(&self) -> f64 {
        self.q_rating.unwrap_or(0.0)
    }

    pub fn workload_hours(&self) -> Option<f64> {
        self.workload.as_ref().and_then(Workload::hours)
    }

    /// Difficulty on a 1-5 scale, banded from workload hours and nudged by rating.
    /// A missing rating counts as zero and so bumps the band.
    ///
    /// `None` when the workload cannot be read as a number.
    pub fn derived_difficulty(&self) -> Option<u8> {
        let hours = self.workload_hours()?;
        let mut difficulty: u8 = if hours >= 20.0 {
            5
        } else if hours >= 15.0 {
            4
        } else if hours >= 10.0 {
            3
        } else if hours >= 5.0 {
            2
        } else {
            1
        };

        let rating = self.rating_or_zero();
        if rating < 3.0 {
            difficulty = (difficulty + 1).min(5);
        } else if rating > 4.5 {
            difficulty = difficulty.saturating_sub(1).max(1);
        }

        Some(difficulty)
    }

    /// Harvard lists General Education offerings under the GENED subject code.
    pub fn is_gen_ed(&self) -> bool {
        normalize_code(&self.code).starts_with("GENED")
    }

    /// Lowercased concatenation of every searchable text field.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(self.description.len() + 128);
        for part in [
            self.code.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.instructor.as_deref().unwrap_or(""),
            self.concentration.as_deref().unwrap_or(""),
        ] {
            text.push_str(part);
            text.push(' ');
        }
        text.push_str(&self.gen_eds.join(" "));
        text.to_lowercase()
    }
}

/// Uppercased course code with whitespace removed, so "cs 50" and "CS50" compare equal.
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
