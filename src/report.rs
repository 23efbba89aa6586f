//! Plain-text report rendering for saved analyses.
//!
//! Mirrors the web-style summary: identified foods, calorie goal coverage,
//! a macronutrient table with progress bars, micronutrients, and the
//! mandatory disclaimer.

use chrono::{DateTime, Utc};

use crate::daily_values::{daily_recommendations, nutrient_percentages};
use crate::model::{NutritionAnalysis, UserProfile};

const DISCLAIMER: &str = "Nutrition analysis is AI-generated and provided for informational \
purposes only. Results are estimates and may not be completely accurate. Always consult with \
healthcare professionals for dietary advice.";

const BAR_WIDTH: usize = 20;

/// Render a full analysis report as plain text.
pub fn render_report(analysis: &NutritionAnalysis, profile: Option<&UserProfile>) -> String {
    let recommendations = daily_recommendations(profile);
    let percentages = nutrient_percentages(&analysis.nutrition, &recommendations);
    let personalized = profile.and_then(|p| p.weight).is_some();

    let mut out = String::new();
    out.push_str("Platelens Nutrition Report\n");
    out.push_str("AI-powered food nutrition analysis\n");
    out.push_str("==================================\n\n");

    out.push_str(&format!(
        "Generated: {}\n",
        analysis.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "{} confidence ({:.0}%), {:.1}s processing time\n\n",
        confidence_label(analysis.overall_confidence),
        analysis.overall_confidence * 100.0,
        analysis.processing_time
    ));

    match profile {
        Some(p) if p.weight.is_some() => out.push_str(&format!("{}\n\n", profile_line(p))),
        _ => out.push_str(
            "Using general nutrition values. Add weight for personalized percentages.\n\n",
        ),
    }

    if !analysis.foods.is_empty() {
        section(&mut out, "Identified Foods");
        for food in &analysis.foods {
            out.push_str(&format!(
                "- {} ({}): {:.0} cal, {:.0}% confidence\n",
                food.name,
                food.quantity,
                food.calories,
                food.confidence * 100.0
            ));
        }
        out.push('\n');
    }

    section(&mut out, "Nutrition Overview");
    let general_marker = if personalized { "" } else { " *general" };
    out.push_str(&format!("Total Calories: {:.0}\n", analysis.nutrition.calories));
    out.push_str(&format!(
        "{}% of daily goal ({} cal){}\n\n",
        percentages.calories, recommendations.calories, general_marker
    ));

    section(&mut out, "Macronutrients");
    out.push_str(&macro_row(
        "Protein",
        analysis.nutrition.protein,
        "g",
        recommendations.protein,
        percentages.protein,
    ));
    out.push_str(&macro_row(
        "Carbohydrates",
        analysis.nutrition.carbohydrates,
        "g",
        recommendations.carbohydrates,
        percentages.carbohydrates,
    ));
    out.push_str(&macro_row(
        "Fat",
        analysis.nutrition.fat,
        "g",
        recommendations.fat,
        percentages.fat,
    ));
    if let Some(fiber) = analysis.nutrition.fiber {
        out.push_str(&macro_row(
            "Fiber",
            fiber,
            "g",
            recommendations.fiber,
            percentages.fiber,
        ));
    }
    if let Some(sodium) = analysis.nutrition.sodium {
        out.push_str(&macro_row(
            "Sodium",
            sodium,
            "mg",
            recommendations.sodium,
            percentages.sodium,
        ));
    }
    out.push('\n');

    let vitamins = analysis.nutrition.vitamins.as_ref();
    let minerals = analysis.nutrition.minerals.as_ref();
    if vitamins.is_some() || minerals.is_some() {
        section(&mut out, "Vitamins & Minerals (% Daily Value)");
        for map in [vitamins, minerals].into_iter().flatten() {
            for (name, value) in map {
                out.push_str(&format!("{}: {:.0}%\n", format_nutrient_name(name), value));
            }
        }
        out.push('\n');
    }

    if let Some(notes) = &analysis.notes {
        section(&mut out, "Analysis Notes");
        out.push_str(&format!("{}\n\n", notes));
    }

    if !analysis.warnings.is_empty() {
        section(&mut out, "Important Notes");
        for warning in &analysis.warnings {
            out.push_str(&format!("- {}\n", warning));
        }
        out.push('\n');
    }

    section(&mut out, "Disclaimer");
    out.push_str(DISCLAIMER);
    out.push_str("\n\nGenerated by Platelens - AI-powered food nutrition analysis\n");

    out
}

/// Report filename of the form `Platelens_Nutrition_Report_<date>_<time>.txt`.
pub fn report_filename(now: DateTime<Utc>) -> String {
    format!(
        "Platelens_Nutrition_Report_{}.txt",
        now.format("%Y-%m-%d_%H-%M-%S")
    )
}

fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
}

fn profile_line(profile: &UserProfile) -> String {
    let mut line = String::from("Personalized for ");
    if let Some(weight) = profile.weight {
        line.push_str(&format!("{weight}kg"));
    }
    if let Some(gender) = profile.gender {
        line.push_str(&format!(" {gender}"));
    }
    if let Some(age) = profile.age {
        line.push_str(&format!(", {age}y"));
    }
    if let Some(level) = profile.activity_level {
        line.push_str(&format!(", {level} activity"));
    }
    line
}

fn confidence_label(value: f64) -> &'static str {
    if value >= 0.8 {
        "High"
    } else if value >= 0.6 {
        "Medium"
    } else {
        "Low"
    }
}

fn macro_row(name: &str, amount: f64, unit: &str, goal: u32, percentage: u32) -> String {
    let over = if percentage > 100 { " (over)" } else { "" };
    format!(
        "{:<14} {:>7.1} {:<2} / {:>4} {:<2} [{}] {}%{}\n",
        name,
        amount,
        unit,
        goal,
        unit,
        progress_bar(percentage),
        percentage,
        over
    )
}

fn progress_bar(percentage: u32) -> String {
    let filled = (percentage.min(100) as usize * BAR_WIDTH) / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Turn a camelCase nutrient key into a display name, e.g. "vitaminB12"
/// into "Vitamin B12".
fn format_nutrient_name(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && !spaced.is_empty() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FoodItem, NutritionData};
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn sample_analysis() -> NutritionAnalysis {
        NutritionAnalysis {
            id: "analysis_1_abcdefghi".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 8, 23, 14, 5, 12).unwrap(),
            foods: vec![FoodItem {
                name: "Grilled Chicken Breast".to_string(),
                quantity: "~150g serving".to_string(),
                calories: 165.0,
                confidence: 0.85,
            }],
            nutrition: NutritionData {
                calories: 430.0,
                protein: 32.1,
                carbohydrates: 28.5,
                fat: 14.3,
                fiber: Some(5.2),
                sodium: Some(245.0),
                vitamins: Some(BTreeMap::from([("vitaminA".to_string(), 45.0)])),
                ..Default::default()
            },
            overall_confidence: 0.8,
            processing_time: 1.4,
            notes: Some("Healthy balanced meal".to_string()),
            warnings: vec!["This is a demonstration with mock data".to_string()],
        }
    }

    #[test]
    fn test_report_without_profile_uses_general_values() {
        let report = render_report(&sample_analysis(), None);
        assert!(report.contains("Platelens Nutrition Report"));
        assert!(report.contains("High confidence (80%)"));
        assert!(report.contains("Using general nutrition values"));
        assert!(report.contains("Grilled Chicken Breast (~150g serving): 165 cal, 85% confidence"));
        assert!(report.contains("Total Calories: 430"));
        // 430 of the general 2000 kcal goal
        assert!(report.contains("22% of daily goal (2000 cal) *general"));
        assert!(report.contains("Vitamin A: 45%"));
        assert!(report.contains("Healthy balanced meal"));
        assert!(report.contains("This is a demonstration with mock data"));
        assert!(report.contains(DISCLAIMER));
    }

    #[test]
    fn test_report_with_profile_is_personalized() {
        let profile = UserProfile {
            weight: Some(70.0),
            age: Some(30),
            gender: Some(crate::model::Gender::Male),
            activity_level: Some(crate::model::ActivityLevel::Moderate),
        };
        let report = render_report(&sample_analysis(), Some(&profile));
        assert!(report.contains("Personalized for 70kg male, 30y, moderate activity"));
        assert!(report.contains("(2507 cal)"));
        assert!(!report.contains("Using general nutrition values"));
        assert!(!report.contains("*general"));
    }

    #[test]
    fn test_report_skips_absent_sections() {
        let mut analysis = sample_analysis();
        analysis.foods.clear();
        analysis.nutrition.fiber = None;
        analysis.nutrition.vitamins = None;
        analysis.notes = None;
        analysis.warnings.clear();

        let report = render_report(&analysis, None);
        assert!(!report.contains("Identified Foods"));
        assert!(!report.contains("Fiber"));
        assert!(!report.contains("Vitamins & Minerals"));
        assert!(!report.contains("Analysis Notes"));
        assert!(!report.contains("Important Notes"));
        // the disclaimer always stays
        assert!(report.contains(DISCLAIMER));
    }

    #[test]
    fn test_confidence_labels() {
        assert_eq!(confidence_label(0.9), "High");
        assert_eq!(confidence_label(0.8), "High");
        assert_eq!(confidence_label(0.6), "Medium");
        assert_eq!(confidence_label(0.59), "Low");
        assert_eq!(confidence_label(0.0), "Low");
    }

    #[test]
    fn test_progress_bar_is_capped() {
        assert_eq!(progress_bar(0), "....................");
        assert_eq!(progress_bar(50), "##########..........");
        assert_eq!(progress_bar(100), "####################");
        assert_eq!(progress_bar(250), "####################");
    }

    #[test]
    fn test_over_goal_marker() {
        let row = macro_row("Sodium", 4000.0, "mg", 2300, 174);
        assert!(row.contains("174%"));
        assert!(row.contains("(over)"));
    }

    #[test]
    fn test_format_nutrient_name() {
        assert_eq!(format_nutrient_name("vitaminA"), "Vitamin A");
        assert_eq!(format_nutrient_name("vitaminB12"), "Vitamin B12");
        assert_eq!(format_nutrient_name("saturatedFat"), "Saturated Fat");
        assert_eq!(format_nutrient_name("iron"), "Iron");
    }

    #[test]
    fn test_report_filename() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 14, 5, 12).unwrap();
        assert_eq!(
            report_filename(now),
            "Platelens_Nutrition_Report_2026-08-23_14-05-12.txt"
        );
    }
}
