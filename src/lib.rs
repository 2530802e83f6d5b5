//! md-assist: markdown workspace and AI editing backend.

pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod workspace;
