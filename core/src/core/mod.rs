pub mod engine;
pub mod mutator;
pub mod result_aggregator;
pub mod targets;
pub mod variants;
