//! chainwatch-engine: block polling and transaction indexing.

pub mod builder;
pub mod engine;
pub mod filter;

pub use builder::EngineBuilder;
pub use engine::IndexingEngine;
