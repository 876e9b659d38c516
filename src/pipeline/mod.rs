// src/pipeline/mod.rs
//! Request-level orchestration over the analyze building blocks.

pub mod deep;
pub mod location;
pub mod verify_text;

pub use deep::{DeepAnalysisPipeline, Outcome, VerificationResult};
pub use location::{LocationNews, LocationNewsPipeline, LocationQuery};
pub use verify_text::{CitedSource, TextVerdict, TextVerifier};
