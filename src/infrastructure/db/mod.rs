pub mod connection;
pub mod data_sources;
pub mod dynamic_tables;
