use std::fs;
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use log::error;

use platelens::config::AppConfig;
use platelens::error::AnalysisError;
use platelens::model::{ActivityLevel, AnalysisOptions, Gender};
use platelens::profile::{JsonFileStore, ProfileManager};
use platelens::{report, server};

const PROFILE_STORE_FILE: &str = "platelens_profile.json";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("serve") => run_server().await,
        Some("analyze") => match args.get(1) {
            Some(path) => analyze_file(path).await,
            None => {
                eprintln!("Usage: platelens analyze <image-path>");
                return ExitCode::FAILURE;
            }
        },
        Some("profile") => run_profile_command(&args[1..]),
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command '{}'", other);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_server() -> Result<(), AnalysisError> {
    let config = AppConfig::load()?;
    server::serve(config).await
}

async fn analyze_file(path: &str) -> Result<(), AnalysisError> {
    let path = Path::new(path);
    let bytes = fs::read(path)?;
    let mime_type = mime_for_extension(path);

    let config = AppConfig::load()?;
    let manager = ProfileManager::new(JsonFileStore::new(PROFILE_STORE_FILE));
    let profile = manager.load();
    let profile_ref = (!profile.is_empty()).then_some(&profile);

    let analysis = platelens::analyze_image(
        &bytes,
        mime_type,
        &AnalysisOptions::default(),
        profile_ref,
        &config,
    )
    .await?;

    let rendered = report::render_report(&analysis, profile_ref);
    println!("{}", rendered);

    let report_path = path.with_file_name(report::report_filename(Utc::now()));
    fs::write(&report_path, &rendered)?;
    println!("Report saved to {}", report_path.display());
    Ok(())
}

fn mime_for_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") | Some("heif") => "image/heic",
        _ => "application/octet-stream",
    }
}

fn run_profile_command(args: &[String]) -> Result<(), AnalysisError> {
    let manager = ProfileManager::new(JsonFileStore::new(PROFILE_STORE_FILE));

    match args.first().map(String::as_str) {
        None | Some("show") => {
            let profile = manager.load();
            if profile.is_empty() {
                println!("No profile stored.");
                return Ok(());
            }
            if let Some(weight) = profile.weight {
                println!("weight:   {} kg", weight);
            }
            if let Some(age) = profile.age {
                println!("age:      {} years", age);
            }
            if let Some(gender) = profile.gender {
                println!("gender:   {}", gender);
            }
            if let Some(level) = profile.activity_level {
                println!("activity: {}", level);
            }
            Ok(())
        }
        Some("set") => {
            let (Some(field), Some(value)) = (args.get(1), args.get(2)) else {
                eprintln!("Usage: platelens profile set <field> <value>");
                eprintln!("Fields: weight, age, gender, activity");
                return Ok(());
            };

            let mut profile = manager.load();
            match field.as_str() {
                "weight" => {
                    let weight = value.parse().map_err(|_| {
                        AnalysisError::InvalidProfile(format!("'{value}' is not a valid weight"))
                    })?;
                    profile.weight = Some(weight);
                }
                "age" => {
                    let age = value.parse().map_err(|_| {
                        AnalysisError::InvalidProfile(format!("'{value}' is not a valid age"))
                    })?;
                    profile.age = Some(age);
                }
                "gender" => profile.gender = Some(parse_gender(value)?),
                "activity" => profile.activity_level = Some(parse_activity_level(value)?),
                other => {
                    return Err(AnalysisError::InvalidProfile(format!(
                        "unknown field '{other}', expected weight, age, gender, or activity"
                    )));
                }
            }
            manager.save(&profile)?;
            println!("Profile updated.");
            Ok(())
        }
        Some("clear") => {
            manager.clear();
            println!("Profile cleared.");
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown profile command '{}'", other);
            eprintln!("Usage: platelens profile [show|set <field> <value>|clear]");
            Ok(())
        }
    }
}

fn parse_gender(value: &str) -> Result<Gender, AnalysisError> {
    match value {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "other" => Ok(Gender::Other),
        _ => Err(AnalysisError::InvalidProfile(format!(
            "unknown gender '{value}', expected male, female, or other"
        ))),
    }
}

fn parse_activity_level(value: &str) -> Result<ActivityLevel, AnalysisError> {
    match value {
        "sedentary" => Ok(ActivityLevel::Sedentary),
        "light" => Ok(ActivityLevel::Light),
        "moderate" => Ok(ActivityLevel::Moderate),
        "active" => Ok(ActivityLevel::Active),
        "very_active" => Ok(ActivityLevel::VeryActive),
        _ => Err(AnalysisError::InvalidProfile(format!(
            "unknown activity level '{value}', expected sedentary, light, moderate, active, or very_active"
        ))),
    }
}

fn print_usage() {
    println!("Platelens: AI food photo nutrition analysis");
    println!();
    println!("Usage:");
    println!("  platelens [serve]                      Start the HTTP API server");
    println!("  platelens analyze <image-path>         Analyze a photo and save a report");
    println!("  platelens profile show                 Print the stored profile");
    println!("  platelens profile set <field> <value>  Set weight, age, gender, or activity");
    println!("  platelens profile clear                Delete the stored profile");
}
