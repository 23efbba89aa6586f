use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::OpenAiConfig;
use crate::error::ProviderError;
use crate::model::{AnalysisOptions, FoodItem, NutritionAnalysis, NutritionData, UserProfile};
use crate::prompt::{build_analysis_prompt, RECOVERY_PROMPT};
use crate::providers::response::{generate_analysis_id, parse_analysis};
use crate::providers::VisionProvider;

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &OpenAiConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::MissingCredential("OpenAI".to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        Ok(OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String, model: String) -> Self {
        OpenAIProvider {
            client: Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.1,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }

    async fn send_chat_request(&self, body: &Value) -> Result<reqwest::Response, ProviderError> {
        self.client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e)
                }
            })
    }

    /// One simplified retry after the model answered with unparseable text.
    ///
    /// A reachable API yields the fixed low-confidence placeholder; a failed
    /// call yields the empty emergency analysis. Neither raises.
    async fn recovery_analysis(&self, image_data_url: &str, started: Instant) -> NutritionAnalysis {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": RECOVERY_PROMPT},
                        {"type": "image_url", "image_url": {"url": image_data_url, "detail": "low"}}
                    ]
                }
            ],
            "max_tokens": 500,
            "temperature": 0.1
        });

        match self.send_chat_request(&body).await {
            Ok(response) if response.status().is_success() => {
                degraded_analysis(started.elapsed().as_secs_f64())
            }
            Ok(response) => {
                error!("Recovery attempt returned HTTP {}", response.status());
                emergency_analysis(started.elapsed().as_secs_f64())
            }
            Err(e) => {
                error!("Recovery attempt failed: {}", e);
                emergency_analysis(started.elapsed().as_secs_f64())
            }
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn analyze_food(
        &self,
        image_data_url: &str,
        options: &AnalysisOptions,
        _profile: Option<&UserProfile>,
    ) -> Result<NutritionAnalysis, ProviderError> {
        let started = Instant::now();
        let prompt = build_analysis_prompt(options);

        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": prompt},
                        {"type": "image_url", "image_url": {"url": image_data_url, "detail": "high"}}
                    ]
                }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature
        });

        let response = self.send_chat_request(&body).await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        debug!("{:?}", payload);
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ProviderError::EmptyResponse)?;

        match parse_analysis(content, started.elapsed().as_secs_f64()) {
            Err(ProviderError::MalformedResponse) => {
                warn!("OpenAI returned unparseable analysis text, retrying with simplified prompt");
                Ok(self.recovery_analysis(image_data_url, started).await)
            }
            other => other,
        }
    }
}

fn degraded_analysis(processing_time: f64) -> NutritionAnalysis {
    NutritionAnalysis {
        id: generate_analysis_id("analysis"),
        timestamp: Utc::now(),
        foods: vec![FoodItem {
            name: "Mixed Food Items".to_string(),
            quantity: "Estimated serving".to_string(),
            calories: 300.0,
            confidence: 0.3,
        }],
        nutrition: NutritionData {
            calories: 300.0,
            protein: 15.0,
            carbohydrates: 30.0,
            fat: 12.0,
            fiber: Some(5.0),
            sugar: Some(8.0),
            sodium: Some(400.0),
            ..Default::default()
        },
        overall_confidence: 0.3,
        processing_time,
        notes: Some("Fallback analysis due to processing error".to_string()),
        warnings: vec![
            "Unable to provide detailed analysis".to_string(),
            "Results are rough estimates only".to_string(),
            "Please try uploading a clearer image".to_string(),
        ],
    }
}

fn emergency_analysis(processing_time: f64) -> NutritionAnalysis {
    NutritionAnalysis {
        id: generate_analysis_id("analysis"),
        timestamp: Utc::now(),
        foods: Vec::new(),
        nutrition: NutritionData::default(),
        overall_confidence: 0.0,
        processing_time,
        notes: Some("Analysis failed".to_string()),
        warnings: vec![
            "Could not analyze the image".to_string(),
            "Please try again with a different image".to_string(),
        ],
    }
}
