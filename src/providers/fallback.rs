use std::time::Duration;

use log::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::model::{AnalysisOptions, NutritionAnalysis, UserProfile};
use crate::providers::{DeepSeekProvider, MockProvider, OpenAIProvider, VisionProvider};

/// Ordered provider chain tried until one produces an analysis.
///
/// Strictly sequential; a provider is only consulted after every earlier
/// one failed. Individual failures are logged and absorbed.
pub struct FallbackProvider {
    providers: Vec<Box<dyn VisionProvider>>,
}

impl FallbackProvider {
    pub fn new(providers: Vec<Box<dyn VisionProvider>>) -> Self {
        FallbackProvider { providers }
    }

    /// Build the standard chain from configuration
    ///
    /// DeepSeek always heads the chain and the offline mock always ends it,
    /// so an unconfigured install still answers. OpenAI sits between the two
    /// when its credential is configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers: Vec<Box<dyn VisionProvider>> = Vec::new();

        providers.push(Box::new(DeepSeekProvider::new(&config.providers.deepseek)));
        info!("Added 'deepseek' to fallback chain");

        let timeout = Duration::from_secs(config.timeout);
        match OpenAIProvider::new(&config.providers.openai, timeout) {
            Ok(provider) => {
                providers.push(Box::new(provider));
                info!("Added 'openai' to fallback chain");
            }
            Err(e) => {
                info!("Skipping 'openai' in fallback chain: {}", e);
            }
        }

        providers.push(Box::new(MockProvider::new()));
        info!("Added 'mock' to fallback chain");

        FallbackProvider::new(providers)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try each provider in order and return the first successful analysis.
    pub async fn analyze_food(
        &self,
        image_data_url: &str,
        options: &AnalysisOptions,
        profile: Option<&UserProfile>,
    ) -> Result<NutritionAnalysis, AnalysisError> {
        let mut all_errors: Vec<String> = Vec::new();

        for provider in &self.providers {
            debug!("Attempting analysis with {}", provider.provider_name());
            match provider.analyze_food(image_data_url, options, profile).await {
                Ok(analysis) => {
                    info!(
                        "Analysis completed with {} in {:.2}s",
                        provider.provider_name(),
                        analysis.processing_time
                    );
                    return Ok(analysis);
                }
                Err(e) => {
                    warn!("Provider {} failed: {}", provider.provider_name(), e);
                    all_errors.push(format!("{}: {}", provider.provider_name(), e));
                }
            }
        }

        Err(AnalysisError::AnalysisFailed(format!(
            "All providers failed:\n{}",
            all_errors.join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeepSeekConfig, OpenAiConfig, ProvidersConfig};

    const IMAGE_URL: &str = "data:image/jpeg;base64,AAAA";

    fn config_with_keys(openai_key: Option<&str>, deepseek_key: Option<&str>) -> AppConfig {
        AppConfig {
            providers: ProvidersConfig {
                openai: OpenAiConfig {
                    api_key: openai_key.map(String::from),
                    ..Default::default()
                },
                deepseek: DeepSeekConfig {
                    api_key: deepseek_key.map(String::from),
                    ..Default::default()
                },
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_chain_without_openai_credential() {
        let chain = FallbackProvider::from_config(&config_with_keys(None, None));
        // deepseek and mock
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_with_openai_credential() {
        let chain = FallbackProvider::from_config(&config_with_keys(Some("sk-test"), None));
        assert_eq!(chain.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chain_falls_through_to_mock() {
        // Neither key configured: deepseek reports its missing credential and
        // the mock answers.
        let chain = FallbackProvider::from_config(&config_with_keys(None, None));
        let analysis = chain
            .analyze_food(IMAGE_URL, &AnalysisOptions::default(), None)
            .await
            .unwrap();
        assert!(analysis.id.starts_with("mock_analysis_"));
        assert_eq!(analysis.nutrition.calories, 430.0);
    }

    #[tokio::test]
    async fn test_empty_chain_reports_aggregate_failure() {
        let chain = FallbackProvider::new(Vec::new());
        let err = chain
            .analyze_food(IMAGE_URL, &AnalysisOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisFailed(_)));
        assert!(err.to_string().contains("All providers failed"));
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        // A failing head; the mock behind it answers and the chain stops.
        struct FailingProvider;

        #[async_trait::async_trait]
        impl VisionProvider for FailingProvider {
            fn provider_name(&self) -> &str {
                "failing"
            }

            async fn analyze_food(
                &self,
                _image_data_url: &str,
                _options: &AnalysisOptions,
                _profile: Option<&UserProfile>,
            ) -> Result<NutritionAnalysis, crate::error::ProviderError> {
                Err(crate::error::ProviderError::Unsupported(
                    "always fails".to_string(),
                ))
            }
        }

        let chain = FallbackProvider::new(vec![
            Box::new(FailingProvider),
            Box::new(MockProvider::with_latency(Duration::ZERO)),
        ]);
        let analysis = chain
            .analyze_food(IMAGE_URL, &AnalysisOptions::default(), None)
            .await
            .unwrap();
        assert!(analysis.id.starts_with("mock_analysis_"));
    }

    #[tokio::test]
    async fn test_all_failing_providers_joins_errors() {
        struct NamedFailure(&'static str);

        #[async_trait::async_trait]
        impl VisionProvider for NamedFailure {
            fn provider_name(&self) -> &str {
                self.0
            }

            async fn analyze_food(
                &self,
                _image_data_url: &str,
                _options: &AnalysisOptions,
                _profile: Option<&UserProfile>,
            ) -> Result<NutritionAnalysis, crate::error::ProviderError> {
                Err(crate::error::ProviderError::Unsupported(format!(
                    "{} is broken",
                    self.0
                )))
            }
        }

        let chain = FallbackProvider::new(vec![
            Box::new(NamedFailure("first")),
            Box::new(NamedFailure("second")),
        ]);
        let err = chain
            .analyze_food(IMAGE_URL, &AnalysisOptions::default(), None)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("first: first is broken"));
        assert!(message.contains("second: second is broken"));
    }
}
