pub mod qguide;
pub mod query_service;

pub use query_service::{QueryContext, QueryOutcome, QueryService};
