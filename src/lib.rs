pub mod config;
pub mod daily_values;
pub mod error;
pub mod image_prep;
pub mod model;
pub mod profile;
pub mod prompt;
pub mod providers;
pub mod report;
pub mod server;

pub use config::AppConfig;
pub use error::{AnalysisError, ProviderError};
pub use model::{AnalysisOptions, NutritionAnalysis, UserProfile};

/// Validate and prepare an image, then run it through the standard
/// provider chain built from the configuration.
pub async fn analyze_image(
    bytes: &[u8],
    mime_type: &str,
    options: &AnalysisOptions,
    profile: Option<&UserProfile>,
    config: &AppConfig,
) -> Result<NutritionAnalysis, AnalysisError> {
    image_prep::validate_upload(bytes, mime_type, &config.image)?;
    let prepared = image_prep::prepare_image(bytes, &config.image)?;

    let chain = providers::FallbackProvider::from_config(config);
    chain
        .analyze_food(&prepared.to_data_url(), options, profile)
        .await
}
