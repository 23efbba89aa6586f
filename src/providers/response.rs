//! Response normalization shared by the remote providers.
//!
//! Vision models are prompted for strict JSON but routinely wrap it in
//! prose or fences, so the payload is cut out of the surrounding text
//! before deserialization. Confidence values are clamped into [0, 1];
//! nutrition totals outside plausible bounds fail the call.

use chrono::Utc;
use log::debug;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::model::{clamp_confidence, FoodItem, NutritionAnalysis, NutritionData};

/// Envelope the vision model is asked to return. Foods and warnings may be
/// absent; a missing overall confidence reads as 0.5.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    foods: Vec<FoodItem>,
    nutrition: NutritionData,
    #[serde(default = "default_overall_confidence")]
    overall_confidence: f64,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

fn default_overall_confidence() -> f64 {
    0.5
}

/// Slice out the first `{` through the last `}` of the model output.
pub(crate) fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Parse model output into a finished analysis.
///
/// Returns `MalformedResponse` when no parseable JSON object is present
/// and `ImplausibleNutrition` when the totals fail the sanity bounds.
pub(crate) fn parse_analysis(
    content: &str,
    processing_time: f64,
) -> Result<NutritionAnalysis, ProviderError> {
    let json = extract_json_object(content).ok_or(ProviderError::MalformedResponse)?;
    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| {
        debug!("JSON parsing error: {e}");
        ProviderError::MalformedResponse
    })?;

    validate_nutrition(&raw.nutrition)?;

    let mut foods = raw.foods;
    for food in &mut foods {
        food.confidence = clamp_confidence(food.confidence);
    }

    Ok(NutritionAnalysis {
        id: generate_analysis_id("analysis"),
        timestamp: Utc::now(),
        foods,
        nutrition: raw.nutrition,
        overall_confidence: clamp_confidence(raw.overall_confidence),
        processing_time,
        notes: raw.notes,
        warnings: raw.warnings,
    })
}

fn validate_nutrition(nutrition: &NutritionData) -> Result<(), ProviderError> {
    if !(0.0..=10000.0).contains(&nutrition.calories) {
        return Err(ProviderError::ImplausibleNutrition(format!(
            "Invalid calorie count: {}",
            nutrition.calories
        )));
    }
    if !(0.0..=500.0).contains(&nutrition.protein) {
        return Err(ProviderError::ImplausibleNutrition(format!(
            "Invalid protein amount: {}",
            nutrition.protein
        )));
    }
    if !(0.0..=1000.0).contains(&nutrition.carbohydrates) {
        return Err(ProviderError::ImplausibleNutrition(format!(
            "Invalid carbohydrate amount: {}",
            nutrition.carbohydrates
        )));
    }
    if !(0.0..=500.0).contains(&nutrition.fat) {
        return Err(ProviderError::ImplausibleNutrition(format!(
            "Invalid fat amount: {}",
            nutrition.fat
        )));
    }
    Ok(())
}

/// Analysis id of the form `<prefix>_<unix millis>_<short random suffix>`.
pub(crate) fn generate_analysis_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), &suffix[..9])
}
