pub mod card;
pub mod course;
pub mod filter;
pub mod message;

pub use card::CourseCard;
pub use course::{ClassSize, Course, Workload, normalize_code};
pub use filter::{ClassSizeBucket, FilterSet, GenEdFilter, Semester, TimeOfDay, WORKLOAD_SENTINEL_MAX};
pub use message::{ChatMessage, Role};
