//! Domain models for the oracle service.

pub mod analysis;

pub use analysis::{AnalysisError, AnalysisRequest, AnalysisResult, ImagePayload};
