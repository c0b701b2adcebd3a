pub mod coerce;
pub mod infer;
pub mod ingestion;
pub mod sanitize;
