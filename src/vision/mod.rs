pub mod openai;
pub mod parse;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Structured result of analyzing one food photo.
#[derive(Debug, Clone, PartialEq)]
pub struct MealAnalysis {
    /// Raw analysis text from the model, kept verbatim on the meal event.
    pub analysis_text: String,
    pub food_items: Vec<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Error)]
pub enum VisionError {
    /// Human-readable reason, surfaced to the user as-is.
    #[error("{0}")]
    Analysis(String),
    #[error("vision request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn analyze(&self, image: Bytes, content_type: &str) -> Result<MealAnalysis, VisionError>;
}
