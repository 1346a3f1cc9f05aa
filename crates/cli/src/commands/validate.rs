//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{EngineConfig, MetricKind, SimilarityConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    metric: MetricKind,
    mirror_matching: bool,
    match_threshold: f32,
    min_length: usize,
    smoother_window: usize,
    pooling_window: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    metric: config.similarity.metric,
                    mirror_matching: config.similarity.mirror_matching,
                    match_threshold: config.alignment.match_threshold,
                    min_length: config.alignment.min_length,
                    smoother_window: config.smoother.window,
                    pooling_window: config.score.pooling_window,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &EngineConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.alignment.match_threshold == 0.0 {
        warnings.push(
            "alignment.match_threshold is 0 - every overlap is feasible and the longest diagonal wins"
                .to_string(),
        );
    }

    if config.alignment.min_overlap_fraction == 0.0 {
        warnings.push(
            "alignment.min_overlap_fraction is 0 - corner diagonals of a single frame are scanned".to_string(),
        );
    }

    if config.smoother.window % 2 == 0 {
        warnings.push(format!(
            "smoother.window = {} is even - the window reaches one frame further ahead than behind",
            config.smoother.window
        ));
    }

    if config.smoother.window == 1 {
        warnings.push("smoother.window = 1 disables temporal smoothing".to_string());
    }

    if config.similarity.metric == MetricKind::Cosine
        && config.similarity.sharpness != SimilarityConfig::default().sharpness
    {
        warnings.push("similarity.sharpness has no effect with the cosine metric".to_string());
    }

    if config.score.points_per_frame == 0.0 {
        warnings.push("score.points_per_frame is 0 - the score track stays at zero".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Metric: {:?}", summary.metric);
            println!("  Mirror matching: {}", summary.mirror_matching);
            println!("  Match threshold: {}", summary.match_threshold);
            println!("  Min length: {} frames", summary.min_length);
            println!("  Smoother window: {} frames", summary.smoother_window);
            println!("  Pooling window: {} frames", summary.pooling_window);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(collect_warnings(&EngineConfig::default()).is_empty());
    }

    #[test]
    fn test_even_window_warns() {
        let mut config = EngineConfig::default();
        config.smoother.window = 4;
        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("even"));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: PathBuf::from("/nonexistent/engine.toml"),
            json: true,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_file_has_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[alignment]\nmin_length = 12\n").unwrap();

        let result = validate_config(&ValidateArgs { config: path, json: false });
        assert!(result.valid);
        assert_eq!(result.summary.unwrap().min_length, 12);
    }

    #[test]
    fn test_invalid_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[smoother]\nwindow = 0\n").unwrap();

        let result = validate_config(&ValidateArgs { config: path, json: false });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("smoother.window"));
    }
}
