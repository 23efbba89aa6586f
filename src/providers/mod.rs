mod deepseek;
mod fallback;
mod mock;
mod open_ai;
mod response;

pub use deepseek::DeepSeekProvider;
pub use fallback::FallbackProvider;
pub use mock::MockProvider;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{AnalysisOptions, NutritionAnalysis, UserProfile};

/// Unified trait for all vision analysis providers
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "deepseek")
    fn provider_name(&self) -> &str;

    /// Analyze a food photo, supplied as a base64 data URL
    ///
    /// The profile is only used to tailor output locally; it is never
    /// forwarded to a remote API.
    async fn analyze_food(
        &self,
        image_data_url: &str,
        options: &AnalysisOptions,
        profile: Option<&UserProfile>,
    ) -> Result<NutritionAnalysis, ProviderError>;
}
