use serde::{Deserialize, Serialize};

/// Workload slider's upper bound; a request at or above it means "no limit".
pub const WORKLOAD_SENTINEL_MAX: f64 = 25.0;

/// Structured search constraints. Unset keys stay `None` and are omitted on the wire,
/// so merging two sets only ever touches keys that were explicitly given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default, alias = "department", skip_serializing_if = "Option::is_none")]
    pub concentration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_ed: Option<GenEdFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afternoon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evening: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_friday: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_size: Option<ClassSizeBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<Semester>,
}

/// GenEd constraint: `true` means any GenEd course, a string names a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenEdFilter {
    Any(bool),
    Category(String),
}

impl GenEdFilter {
    /// Whether this value constrains results at all.
    pub fn is_active(&self) -> bool {
        match self {
            GenEdFilter::Any(flag) => *flag,
            GenEdFilter::Category(category) => !category.trim().is_empty(),
        }
    }

    /// The category to look for, or `None` when any GenEd course qualifies.
    pub fn category(&self) -> Option<&str> {
        match self {
            GenEdFilter::Any(_) => None,
            GenEdFilter::Category(category) => {
                let trimmed = category.trim();
                if trimmed.eq_ignore_ascii_case("any") || trimmed.eq_ignore_ascii_case("all") {
                    None
                } else {
                    Some(trimmed)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semester {
    #[serde(alias = "Fall", alias = "autumn", alias = "Autumn")]
    Fall,
    #[serde(alias = "Spring")]
    Spring,
    #[serde(alias = "All", alias = "any")]
    All,
}

impl Semester {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::Fall => "fall",
            Semester::Spring => "spring",
            Semester::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassSizeBucket {
    #[serde(alias = "Small")]
    Small,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Large")]
    Large,
}

impl ClassSizeBucket {
    /// Bucket for a head count: small < 30, medium 30-99, large >= 100.
    pub fn for_count(count: u32) -> Self {
        match count {
            0..=29 => ClassSizeBucket::Small,
            30..=99 => ClassSizeBucket::Medium,
            _ => ClassSizeBucket::Large,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "small" => Some(ClassSizeBucket::Small),
            "medium" => Some(ClassSizeBucket::Medium),
            "large" => Some(ClassSizeBucket::Large),
            _ => None,
        }
    }
}

impl FilterSet {
    /// Shallow override: every key set in `other` replaces the same key here.
    pub fn merge(&mut self, other: FilterSet) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            concentration,
            gen_ed,
            min_rating,
            workload_hours,
            difficulty,
            morning,
            afternoon,
            evening,
            no_friday,
            class_size,
            instructor,
            semester,
        );
    }

    pub fn merged(mut self, other: FilterSet) -> FilterSet {
        self.merge(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.applied_keys().is_empty()
    }

    /// Wire names of the keys currently set, in declaration order.
    pub fn applied_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let flags: [(&'static str, bool); 12] = [
            ("concentration", self.concentration.is_some()),
            ("genEd", self.gen_ed.is_some()),
            ("minRating", self.min_rating.is_some()),
            ("workloadHours", self.workload_hours.is_some()),
            ("difficulty", self.difficulty.is_some()),
            ("morning", self.morning.is_some()),
            ("afternoon", self.afternoon.is_some()),
            ("evening", self.evening.is_some()),
            ("noFriday", self.no_friday.is_some()),
            ("classSize", self.class_size.is_some()),
            ("instructor", self.instructor.is_some()),
            ("semester", self.semester.is_some()),
        ];
        for (key, set) in flags {
            if set {
                keys.push(key);
            }
        }
        keys
    }

    /// Time-of-day flags that are switched on.
    pub fn requested_times(&self) -> Vec<TimeOfDay> {
        let mut times = Vec::new();
        if self.morning == Some(true) {
            times.push(TimeOfDay::Morning);
        }
        if self.afternoon == Some(true) {
            times.push(TimeOfDay::Afternoon);
        }
        if self.evening == Some(true) {
            times.push(TimeOfDay::Evening);
        }
        times
    }

    /// Workload ceiling, unless it sits at the slider's "unlimited" end.
    pub fn effective_workload_ceiling(&self) -> Option<f64> {
        self.workload_hours
            .filter(|hours| *hours < WORKLOAD_SENTINEL_MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}
