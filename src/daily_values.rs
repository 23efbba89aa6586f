//! Daily intake targets and percent-of-goal math.
//!
//! With no profile the FDA-style general targets apply. With a body weight
//! the targets come from the Mifflin-St Jeor basal metabolic rate scaled by
//! an activity multiplier, with the remaining fields derived from the
//! calorie goal.

use crate::model::{
    ActivityLevel, DailyRecommendations, Gender, NutrientPercentages, NutritionData, UserProfile,
};

/// Height is not collected; assume an average adult.
const DEFAULT_HEIGHT_CM: f64 = 170.0;
const DEFAULT_AGE: u32 = 30;

/// Daily targets for the given profile, or the general targets when no
/// weight is known.
pub fn daily_recommendations(profile: Option<&UserProfile>) -> DailyRecommendations {
    match profile.and_then(|p| p.weight.map(|weight| (weight, p))) {
        Some((weight, profile)) => personalized(weight, profile),
        None => general(),
    }
}

/// General adult targets used when nothing is known about the user.
pub fn general() -> DailyRecommendations {
    DailyRecommendations {
        calories: 2000,
        protein: 50,
        carbohydrates: 300,
        fat: 65,
        fiber: 25,
        sodium: 2300,
    }
}

fn personalized(weight: f64, profile: &UserProfile) -> DailyRecommendations {
    let age = profile.age.unwrap_or(DEFAULT_AGE) as f64;
    let bmr = mifflin_st_jeor(weight, DEFAULT_HEIGHT_CM, age, profile.gender);
    let multiplier = activity_multiplier(profile.activity_level.unwrap_or(ActivityLevel::Moderate));

    // Calories are rounded first; the other targets derive from the rounded
    // goal.
    let calories = (bmr * multiplier).round();
    DailyRecommendations {
        calories: calories as u32,
        protein: (weight * 0.8).round() as u32,
        carbohydrates: (calories * 0.5 / 4.0).round() as u32,
        fat: (calories * 0.3 / 9.0).round() as u32,
        fiber: (14.0 * calories / 1000.0).round() as u32,
        sodium: (2300.0 * calories / 2000.0).round() as u32,
    }
}

fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age_years: f64, gender: Option<Gender>) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years;
    match gender {
        Some(Gender::Male) => base + 5.0,
        _ => base - 161.0,
    }
}

fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
    }
}

/// Percent of each daily target covered by the analyzed meal, rounded to
/// whole percents. Nutrients the analysis did not report count as zero.
pub fn nutrient_percentages(
    nutrition: &NutritionData,
    recommendations: &DailyRecommendations,
) -> NutrientPercentages {
    NutrientPercentages {
        calories: percentage(nutrition.calories, recommendations.calories),
        protein: percentage(nutrition.protein, recommendations.protein),
        carbohydrates: percentage(nutrition.carbohydrates, recommendations.carbohydrates),
        fat: percentage(nutrition.fat, recommendations.fat),
        fiber: percentage(nutrition.fiber.unwrap_or(0.0), recommendations.fiber),
        sodium: percentage(nutrition.sodium.unwrap_or(0.0), recommendations.sodium),
    }
}

fn percentage(actual: f64, recommended: u32) -> u32 {
    if recommended == 0 {
        return 0;
    }
    (actual / recommended as f64 * 100.0).round() as u32
}
