use crate::model::AnalysisOptions;

/// Prompt for the degraded second attempt after an unparseable response.
///
/// Deliberately schema-free; the reply is discarded beyond checking that
/// the provider answered at all.
///
/// Loaded from `recovery_prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECOVERY_PROMPT: &str = include_str!("recovery_prompt.txt");

const VITAMINS_SCHEMA: &str = r#",
    "vitamins": {
      "vitaminA": number,
      "vitaminC": number,
      "vitaminD": number,
      "vitaminE": number,
      "vitaminK": number,
      "thiamine": number,
      "riboflavin": number,
      "niacin": number,
      "vitaminB6": number,
      "folate": number,
      "vitaminB12": number
    }"#;

const MINERALS_SCHEMA: &str = r#",
    "minerals": {
      "calcium": number,
      "iron": number,
      "magnesium": number,
      "phosphorus": number,
      "potassium": number,
      "zinc": number,
      "copper": number,
      "manganese": number,
      "selenium": number
    }"#;

/// Build the analysis prompt for the given options.
///
/// Deterministic: equal options always produce byte-identical prompts, so
/// provider behavior stays reproducible across retries and tests.
pub fn build_analysis_prompt(options: &AnalysisOptions) -> String {
    let mut prompt = format!(
        "Analyze this food image and provide detailed nutritional information.\n\
         \n\
         REQUIREMENTS:\n\
         1. Identify all visible food items with confidence levels\n\
         2. Estimate portion sizes based on visual cues\n\
         3. Calculate comprehensive nutritional values per serving\n\
         4. Only include foods with confidence >= {}\n\
         5. Provide realistic estimates based on typical serving sizes\n",
        options.confidence_threshold
    );

    if options.detailed_breakdown {
        prompt.push_str(
            "\nDETAILED BREAKDOWN:\n\
             - Break down each food item separately\n\
             - Explain portion size estimation method\n\
             - Note any assumptions made\n",
        );
    }

    prompt.push_str(
        r#"
RETURN STRICT JSON FORMAT:
{
  "foods": [
    {
      "name": "string (food name)",
      "quantity": "string (estimated portion with units)",
      "calories": number,
      "confidence": number (0-1)
    }
  ],
  "nutrition": {
    "calories": number,
    "protein": number,
    "carbohydrates": number,
    "fat": number,
    "saturatedFat": number,
    "transFat": number,
    "cholesterol": number,
    "fiber": number,
    "sugar": number,
    "sodium": number"#,
    );

    if options.include_vitamins {
        prompt.push_str(VITAMINS_SCHEMA);
    }
    if options.include_minerals {
        prompt.push_str(MINERALS_SCHEMA);
    }

    prompt.push_str(
        r#"
  },
  "overallConfidence": number (0-1),
  "notes": "string (brief analysis notes)",
  "warnings": ["string"] (any concerns about accuracy)
}

NOTES:
- All nutrients in grams except sodium (mg) and vitamins/minerals (% Daily Value)
- Be conservative with estimates - it's better to underestimate than overestimate
- If you can't identify a food clearly, don't include it
- Consider cooking methods that might affect nutrition (fried, baked, etc.)
- Account for visible oils, sauces, and seasonings
- Provide realistic portion sizes based on what's visible"#,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let options = AnalysisOptions::default();
        assert_eq!(build_analysis_prompt(&options), build_analysis_prompt(&options));
    }

    #[test]
    fn test_threshold_is_embedded() {
        let options = AnalysisOptions {
            confidence_threshold: 0.35,
            ..AnalysisOptions::default()
        };
        let prompt = build_analysis_prompt(&options);
        assert!(prompt.contains("confidence >= 0.35"));
    }

    #[test]
    fn test_vitamin_and_mineral_sections_follow_options() {
        let all = build_analysis_prompt(&AnalysisOptions::default());
        assert!(all.contains("\"vitamins\""));
        assert!(all.contains("\"minerals\""));

        let none = build_analysis_prompt(&AnalysisOptions {
            include_vitamins: false,
            include_minerals: false,
            ..AnalysisOptions::default()
        });
        assert!(!none.contains("\"vitamins\""));
        assert!(!none.contains("\"minerals\""));
        // The fixed schema stays regardless
        assert!(none.contains("\"saturatedFat\""));
        assert!(none.contains("overallConfidence"));
    }

    #[test]
    fn test_detailed_breakdown_section() {
        let plain = build_analysis_prompt(&AnalysisOptions::default());
        assert!(!plain.contains("DETAILED BREAKDOWN"));

        let detailed = build_analysis_prompt(&AnalysisOptions {
            detailed_breakdown: true,
            ..AnalysisOptions::default()
        });
        assert!(detailed.contains("DETAILED BREAKDOWN"));
    }

    #[test]
    fn test_recovery_prompt_carries_no_schema() {
        assert!(!RECOVERY_PROMPT.is_empty());
        assert!(!RECOVERY_PROMPT.contains('{'));
        assert!(RECOVERY_PROMPT.contains("simpler approach"));
    }
}
