mod extract;
mod pipeline;

pub use extract::{is_ignorable, sanitize_lines};
pub use pipeline::{low_funds_alerts, process_lines, IngestSummary, LineOutcome};
