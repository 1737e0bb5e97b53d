//! Loading vocabularies and documents for the pipeline

pub mod corpus;
pub mod dictionary;
pub mod parquet;
pub mod preprocessing;
