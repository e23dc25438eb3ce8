pub mod composer;
pub mod dedup;
pub mod extractor;
pub mod matcher;
pub mod normalizer;

pub use composer::ResponseComposer;
pub use dedup::deduplicate;
pub use extractor::FilterExtractor;
pub use matcher::apply_filters;
pub use normalizer::{apply_semester_fallback, normalize_query};
