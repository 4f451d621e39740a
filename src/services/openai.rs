use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ai_service::{AnalysisError, ApiKey, GroceryAnalysis, RemoteAnalyzer};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SYSTEM_PROMPT: &str = "You are a nutrition expert and grocery analyst. \
    Analyze the provided grocery text and return a JSON response with detected items, \
    nutritional analysis, and recipe suggestions.";

const USER_PROMPT_TEMPLATE: &str = r#"Analyze this grocery-related text and reply with JSON only, using exactly this structure:

{
    "detectedItems": [
        {
            "name": "Item name",
            "confidence": 0.95,
            "estimatedCost": 2.49,
            "category": "fruit/vegetable/dairy/meat/grain/other",
            "nutritionalInfo": {
                "calories": 100,
                "protein": 5.0,
                "carbs": 20.0,
                "fat": 2.0,
                "fiber": 3.0,
                "sugar": 15.0
            }
        }
    ],
    "nutritionalAnalysis": "Overall nutritional summary",
    "recipeSuggestions": ["Recipe 1", "Recipe 2", "Recipe 3"],
    "totalEstimatedCost": 15.47,
    "healthInsights": ["Health insight 1", "Health insight 2"]
}

Text to analyze: {text}

Use realistic cost estimates based on average US grocery prices, accurate nutritional information, and creative recipe suggestions that use the detected items."#;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Chat-completion client for OpenAI compatible endpoints.
pub struct OpenAiService {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiService {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: USER_PROMPT_TEMPLATE.replace("{text}", text),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl RemoteAnalyzer for OpenAiService {
    async fn analyze_grocery_text(
        &self,
        credential: &ApiKey,
        text: &str,
    ) -> Result<GroceryAnalysis, AnalysisError> {
        let url = reqwest::Url::parse(&self.config.endpoint)
            .map_err(|e| AnalysisError::InvalidUrl(format!("{} ({})", self.config.endpoint, e)))?;

        let request = self.build_request(text);

        log::info!("🤖 Sending grocery analysis request with model: {}", self.config.model);
        log::debug!("📤 Recognized text size: {} bytes", text.len());

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Chat completion response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let preview: String = error_text.chars().take(500).collect();
            log::error!("❌ Chat completion API error ({}): {}", status, preview);
            return Err(AnalysisError::InvalidResponse(format!("HTTP {}: {}", status, preview)));
        }

        let body = response.text().await?;
        log::debug!("📄 Raw response size: {} bytes", body.len());

        let content = extract_message_content(&body)?;
        log::debug!("💬 Model content size: {} bytes", content.len());

        let analysis = parse_grocery_analysis(&content)?;
        log::info!("✅ Parsed {} items from model response", analysis.detected_items.len());
        Ok(analysis)
    }
}

/// First parse: the chat-completion envelope. Returns the first choice's message content.
fn extract_message_content(body: &str) -> Result<String, AnalysisError> {
    let chat_response: ChatResponse = serde_json::from_str(body)?;

    chat_response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AnalysisError::InvalidResponse("missing message content".to_string()))
}

/// Second parse: the model's message content as a `GroceryAnalysis`.
///
/// Surrounding whitespace and a single markdown code fence are tolerated.
/// Any other non-JSON wrapping (commentary before or after) fails with `Decoding`.
pub fn parse_grocery_analysis(content: &str) -> Result<GroceryAnalysis, AnalysisError> {
    let json = strip_code_fence(content);
    Ok(serde_json::from_str(json)?)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Opening fence may carry a language tag ("```json")
    match inner.find('\n') {
        Some(idx) => inner[idx + 1..].trim(),
        None => inner.trim(),
    }
}
