pub mod data_source;
pub mod error;
pub mod ingest;
