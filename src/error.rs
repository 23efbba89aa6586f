use thiserror::Error;

/// Errors that can occur during food photo analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Upload rejected before any processing (size, format)
    #[error("{0}")]
    InvalidImage(String),

    /// Image decoded or re-encoded unsuccessfully
    #[error("Image processing failed: {0}")]
    ImageProcessingFailed(String),

    /// A provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No provider in the chain produced an analysis
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// User profile field outside the accepted range
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Filesystem or socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single vision provider call
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Provider is configured without an API key
    #[error("{0} API key is required")]
    MissingCredential(String),

    /// Request could not be sent or the response body could not be read
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider did not answer within the configured timeout
    #[error("Analysis timed out")]
    Timeout,

    /// Provider returned HTTP 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Provider returned a non-2xx status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Completion carried no assistant content
    #[error("No response content from provider")]
    EmptyResponse,

    /// Assistant content held no parseable JSON analysis
    #[error("Failed to parse response as JSON")]
    MalformedResponse,

    /// Parsed analysis failed semantic validation
    #[error("{0}")]
    ImplausibleNutrition(String),

    /// Provider cannot handle this kind of input
    #[error("{0}")]
    Unsupported(String),
}
