pub mod gateway;
pub mod providers;

pub use gateway::{ImageAnalysisGateway, ANALYSIS_PROMPT};
