use async_trait::async_trait;
use log::debug;

use crate::config::DeepSeekConfig;
use crate::error::ProviderError;
use crate::model::{AnalysisOptions, NutritionAnalysis, UserProfile};
use crate::providers::VisionProvider;

/// Text-only DeepSeek client.
///
/// DeepSeek's chat models cannot consume images, so every analysis call
/// fails deterministically and the chain moves on. The client stays in the
/// chain so vision support can be switched on once the API grows it.
pub struct DeepSeekProvider {
    api_key: Option<String>,
}

impl DeepSeekProvider {
    /// Create a new DeepSeek provider from configuration
    ///
    /// Never fails; a missing credential is reported at call time.
    pub fn new(config: &DeepSeekConfig) -> Self {
        DeepSeekProvider {
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl VisionProvider for DeepSeekProvider {
    fn provider_name(&self) -> &str {
        "deepseek"
    }

    async fn analyze_food(
        &self,
        _image_data_url: &str,
        _options: &AnalysisOptions,
        _profile: Option<&UserProfile>,
    ) -> Result<NutritionAnalysis, ProviderError> {
        if self.api_key.is_none() {
            return Err(ProviderError::MissingCredential("DeepSeek".to_string()));
        }

        debug!("DeepSeek called for image analysis, reporting missing vision support");
        Err(ProviderError::Unsupported(
            "DeepSeek does not currently support vision/image analysis. \
             Available models: deepseek-chat, deepseek-reasoner. \
             Please use OpenAI GPT-4V instead."
                .to_string(),
        ))
    }
}
