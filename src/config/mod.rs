// src/config/mod.rs
pub mod ai;
pub mod pipeline;
pub mod tables;

pub use ai::OracleConfig;
pub use pipeline::PipelineSettings;
pub use tables::ScoringTables;
