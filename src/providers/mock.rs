use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use tokio::time::{sleep, Instant};

use crate::error::ProviderError;
use crate::model::{AnalysisOptions, FoodItem, NutritionAnalysis, NutritionData, UserProfile};
use crate::providers::response::generate_analysis_id;
use crate::providers::VisionProvider;

/// Offline provider returning a fixed realistic meal.
///
/// Terminal entry of the fallback chain, so unconfigured installs still get
/// a demonstration response instead of an error. Simulates model latency so
/// the end-to-end flow feels like a real call.
pub struct MockProvider {
    latency: Duration,
}

impl MockProvider {
    pub fn new() -> Self {
        MockProvider {
            latency: Duration::from_secs(2),
        }
    }

    /// Override the simulated latency, mainly for tests.
    pub fn with_latency(latency: Duration) -> Self {
        MockProvider { latency }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        MockProvider::new()
    }
}

#[async_trait]
impl VisionProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn analyze_food(
        &self,
        _image_data_url: &str,
        options: &AnalysisOptions,
        profile: Option<&UserProfile>,
    ) -> Result<NutritionAnalysis, ProviderError> {
        let started = Instant::now();
        debug!("Simulating analysis latency of {:?}", self.latency);
        sleep(self.latency).await;

        let vitamins = options.include_vitamins.then(|| {
            BTreeMap::from([
                ("vitaminA".to_string(), 45.0),
                ("vitaminC".to_string(), 90.0),
                ("vitaminK".to_string(), 120.0),
                ("folate".to_string(), 15.0),
                ("niacin".to_string(), 65.0),
            ])
        });
        let minerals = options.include_minerals.then(|| {
            BTreeMap::from([
                ("iron".to_string(), 12.0),
                ("calcium".to_string(), 8.0),
                ("potassium".to_string(), 25.0),
                ("magnesium".to_string(), 18.0),
                ("phosphorus".to_string(), 30.0),
            ])
        });

        let mut warnings = vec![
            "This is a demonstration with mock data".to_string(),
            "For real analysis, please configure OpenAI GPT-4V".to_string(),
        ];
        match profile.and_then(|p| p.weight) {
            Some(weight) => warnings.push(format!("Mock data adjusted for {weight}kg user")),
            None => warnings.push("Using general nutrition recommendations".to_string()),
        }

        Ok(NutritionAnalysis {
            id: generate_analysis_id("mock_analysis"),
            timestamp: Utc::now(),
            foods: vec![
                FoodItem {
                    name: "Grilled Chicken Breast".to_string(),
                    quantity: "~150g serving".to_string(),
                    calories: 165.0,
                    confidence: 0.85,
                },
                FoodItem {
                    name: "Steamed Broccoli".to_string(),
                    quantity: "~100g serving".to_string(),
                    calories: 34.0,
                    confidence: 0.90,
                },
                FoodItem {
                    name: "Brown Rice".to_string(),
                    quantity: "~75g serving".to_string(),
                    calories: 112.0,
                    confidence: 0.75,
                },
                FoodItem {
                    name: "Olive Oil".to_string(),
                    quantity: "~1 tbsp".to_string(),
                    calories: 119.0,
                    confidence: 0.70,
                },
            ],
            nutrition: NutritionData {
                calories: 430.0,
                protein: 32.1,
                carbohydrates: 28.5,
                fat: 14.3,
                saturated_fat: Some(3.1),
                fiber: Some(5.2),
                sugar: Some(4.8),
                sodium: Some(245.0),
                vitamins,
                minerals,
                ..Default::default()
            },
            overall_confidence: 0.8,
            processing_time: started.elapsed().as_secs_f64(),
            notes: Some(
                "Mock analysis for demonstration purposes. This appears to be a healthy, \
                 balanced meal with lean protein, vegetables, and complex carbohydrates."
                    .to_string(),
            ),
            warnings,
        })
    }
}
