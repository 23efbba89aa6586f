use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Knobs controlling what an analysis request asks the model for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    #[serde(default = "default_true")]
    pub include_vitamins: bool,
    #[serde(default = "default_true")]
    pub include_minerals: bool,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default)]
    pub detailed_breakdown: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            include_vitamins: true,
            include_minerals: true,
            confidence_threshold: default_confidence_threshold(),
            detailed_breakdown: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_confidence_threshold() -> f64 {
    0.7
}

/// A single food item the model identified in the photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    /// Estimated portion with units, e.g. "~150g serving"
    pub quantity: String,
    pub calories: f64,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
}

/// Aggregate nutrition for the whole plate
///
/// All nutrients are grams except sodium and cholesterol (mg) and the
/// vitamin/mineral maps (% Daily Value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionData {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub fat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minerals: Option<BTreeMap<String, f64>>,
}

/// Result of one analysis run, immutable once constructed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionAnalysis {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub foods: Vec<FoodItem>,
    pub nutrition: NutritionData,
    /// Always within [0, 1]; construction sites clamp
    pub overall_confidence: f64,
    /// Wall-clock seconds from request start to result
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Clamp a confidence score into [0, 1]
pub fn clamp_confidence(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        };
        f.write_str(label)
    }
}

/// Optional user data used to personalize daily-value percentages
///
/// Never sent to any remote provider; the offline provider reads the
/// weight for its demonstration warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Body weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Age in years
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
    }

    /// Range-check the fields that feed the BMR math
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if let Some(weight) = self.weight {
            if !(30.0..=300.0).contains(&weight) {
                return Err(AnalysisError::InvalidProfile(format!(
                    "weight must be between 30 and 300 kg, got {weight}"
                )));
            }
        }
        if let Some(age) = self.age {
            if !(13..=120).contains(&age) {
                return Err(AnalysisError::InvalidProfile(format!(
                    "age must be between 13 and 120 years, got {age}"
                )));
            }
        }
        Ok(())
    }
}

/// Daily intake targets, either general or derived from a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRecommendations {
    pub calories: u32,
    /// grams
    pub protein: u32,
    /// grams
    pub carbohydrates: u32,
    /// grams
    pub fat: u32,
    /// grams
    pub fiber: u32,
    /// mg
    pub sodium: u32,
}

/// Rounded percent of the daily target each nutrient covers; may exceed 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutrientPercentages {
    pub calories: u32,
    pub protein: u32,
    pub carbohydrates: u32,
    pub fat: u32,
    pub fiber: u32,
    pub sodium: u32,
}

/// JSON envelope every HTTP response uses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Underlying error detail, present only in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeFoodResponse {
    pub analysis: NutritionAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = AnalysisOptions::default();
        assert!(options.include_vitamins);
        assert!(options.include_minerals);
        assert_eq!(options.confidence_threshold, 0.7);
        assert!(!options.detailed_breakdown);
    }

    #[test]
    fn test_options_partial_json_fills_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"includeVitamins": false}"#).unwrap();
        assert!(!options.include_vitamins);
        assert!(options.include_minerals);
        assert_eq!(options.confidence_threshold, 0.7);
    }

    #[test]
    fn test_options_empty_object_is_default() {
        let options: AnalysisOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, AnalysisOptions::default());
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(1.5), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(0.5), 0.5);
    }

    #[test]
    fn test_profile_validation_ranges() {
        let profile = UserProfile {
            weight: Some(20.0),
            ..UserProfile::default()
        };
        assert!(profile.validate().is_err());

        let profile = UserProfile {
            age: Some(12),
            ..UserProfile::default()
        };
        assert!(profile.validate().is_err());

        let profile = UserProfile {
            weight: Some(70.0),
            age: Some(30),
            gender: Some(Gender::Male),
            activity_level: Some(ActivityLevel::Moderate),
        };
        assert!(profile.validate().is_ok());
        assert!(!profile.is_empty());
        assert!(UserProfile::default().is_empty());
    }

    #[test]
    fn test_profile_wire_names() {
        let profile = UserProfile {
            weight: Some(70.0),
            age: Some(30),
            gender: Some(Gender::Female),
            activity_level: Some(ActivityLevel::VeryActive),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["activityLevel"], "very_active");
        assert_eq!(json["gender"], "female");
    }

    #[test]
    fn test_nutrition_data_skips_absent_fields() {
        let nutrition = NutritionData {
            calories: 430.0,
            protein: 32.1,
            carbohydrates: 28.5,
            fat: 14.3,
            ..NutritionData::default()
        };
        let json = serde_json::to_value(&nutrition).unwrap();
        assert!(json.get("saturatedFat").is_none());
        assert!(json.get("vitamins").is_none());
        assert_eq!(json["calories"], 430.0);
    }

    #[test]
    fn test_analysis_json_round_trip() {
        let analysis = NutritionAnalysis {
            id: "analysis_1724421912000_a1b2c3d4e".to_string(),
            timestamp: chrono::Utc::now(),
            foods: vec![FoodItem {
                name: "Caesar Salad".to_string(),
                quantity: "1 bowl".to_string(),
                calories: 310.0,
                confidence: 0.85,
            }],
            nutrition: NutritionData {
                calories: 310.0,
                protein: 12.0,
                carbohydrates: 18.0,
                fat: 22.0,
                fiber: Some(4.0),
                vitamins: Some(BTreeMap::from([("vitaminA".to_string(), 35.0)])),
                ..NutritionData::default()
            },
            overall_confidence: 0.85,
            processing_time: 3.4,
            notes: Some("Dressing estimated".to_string()),
            warnings: vec!["first".to_string(), "second".to_string()],
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["overallConfidence"], 0.85);
        assert_eq!(json["processingTime"], 3.4);
        assert_eq!(json["nutrition"]["vitamins"]["vitaminA"], 35.0);

        let back: NutritionAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
        assert_eq!(back.warnings, vec!["first", "second"]);
    }
}
