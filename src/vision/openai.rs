use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{parse, MealAnalysis, VisionClient, VisionError};
use crate::config::OpenAiConfig;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "\
You are a nutrition expert analyzing food images. For each image:
1. List all visible food items with quantities, one per line starting with \"-\", under a heading \"Items:\"
2. Provide nutrition facts in exactly this format:

Items:
- [food item with quantity]

Nutrition facts:
- Calories: X
- Protein: X g
- Carbs: X g
- Fat: X g";

pub struct OpenAiVision {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiVision {
    /// Reuses the app-wide `reqwest::Client` so the process holds a single
    /// connection pool.
    pub fn new(config: &OpenAiConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionClient for OpenAiVision {
    #[instrument(skip(self, image))]
    async fn analyze(&self, image: Bytes, content_type: &str) -> Result<MealAnalysis, VisionError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image);
        let data_url = format!("data:{content_type};base64,{encoded}");

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "image_url", "image_url": { "url": data_url } }
                    ]
                }
            ],
            "max_tokens": 500
        });

        let response = self
            .http
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VisionError::Analysis("the model returned no analysis".into()))?;

        debug!(chars = content.len(), "analysis text received");
        Ok(parse::extract(&content))
    }
}
