//! Data types for the RAG pipeline.

pub mod config;
pub mod context;
pub mod message;
pub mod query;
pub mod result;
pub mod search;
