//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (derive `Validate`)：阈值在 [0, 1]，窗口 >= 1，sharpness 为有限正数
//! - min_visible_joints >= 2 (单个关节没有尺度)
//! - display_step > 0 时 points_per_frame 不能为 0
//!
//! 错误信息包含字段路径，例如 `alignment.min_length`。

use std::collections::BTreeMap;

use ::validator::{Validate, ValidationErrors, ValidationErrorsKind};
use contracts::{ContractError, EngineConfig};

/// 校验 EngineConfig 配置
///
/// 返回第一个遇到的错误（按字段路径排序），或 Ok(())。
pub fn validate(config: &EngineConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_normalizer(config)?;
    validate_score(config)?;
    Ok(())
}

/// 字段范围校验
fn validate_ranges(config: &EngineConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut flat = BTreeMap::new();
    flatten_errors(&errors, "", &mut flat);
    match flat.into_iter().next() {
        Some((field, message)) => Err(ContractError::config_validation(field, message)),
        None => Err(ContractError::config_validation("<root>", errors.to_string())),
    }
}

/// 展开嵌套错误为 `path -> message`
fn flatten_errors(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    let mut params: Vec<String> = error
                        .params
                        .iter()
                        .map(|(k, v)| format!("{k} = {v}"))
                        .collect();
                    params.sort();
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None if params.is_empty() => error.code.to_string(),
                        None => format!("{} ({})", error.code, params.join(", ")),
                    };
                    out.insert(path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    flatten_errors(nested, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

/// 校验 normalizer 配置
fn validate_normalizer(config: &EngineConfig) -> Result<(), ContractError> {
    let normalizer = &config.normalizer;
    if normalizer.min_visible_joints < 2 {
        return Err(ContractError::config_validation(
            "normalizer.min_visible_joints",
            format!(
                "min_visible_joints must be >= 2, got {} (a single joint has no extent)",
                normalizer.min_visible_joints
            ),
        ));
    }
    Ok(())
}

/// 校验 score 配置
fn validate_score(config: &EngineConfig) -> Result<(), ContractError> {
    let score = &config.score;
    if score.display_step > 0.0 && score.points_per_frame == 0.0 {
        return Err(ContractError::config_validation(
            "score.points_per_frame / score.display_step",
            format!(
                "points_per_frame is 0 so the displayed score can never pass display_step ({})",
                score.display_step
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = EngineConfig::default();
        config.normalizer.confidence_threshold = 1.5;
        let err = validate(&config).unwrap_err();
        match err {
            ContractError::ConfigValidation { field, message } => {
                assert_eq!(field, "normalizer.confidence_threshold");
                assert!(message.contains("range"), "got: {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_window() {
        let mut config = EngineConfig::default();
        config.smoother.window = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("smoother.window"), "got: {err}");
    }

    #[test]
    fn test_zero_min_length() {
        let mut config = EngineConfig::default();
        config.alignment.min_length = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("alignment.min_length"), "got: {err}");
    }

    #[test]
    fn test_non_positive_sharpness() {
        let mut config = EngineConfig::default();
        config.similarity.sharpness = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("similarity.sharpness"), "got: {err}");

        config.similarity.sharpness = f32::INFINITY;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("similarity.sharpness"), "got: {err}");
    }

    #[test]
    fn test_first_error_is_deterministic() {
        let mut config = EngineConfig::default();
        config.smoother.window = 0;
        config.alignment.min_length = 0;
        for _ in 0..5 {
            let err = validate(&config).unwrap_err().to_string();
            assert!(err.contains("alignment.min_length"), "got: {err}");
        }
    }

    #[test]
    fn test_single_visible_joint_rejected() {
        let mut config = EngineConfig::default();
        config.normalizer.min_visible_joints = 1;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("single joint"), "got: {err}");
    }

    #[test]
    fn test_score_that_never_displays() {
        let mut config = EngineConfig::default();
        config.score.points_per_frame = 0.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("points_per_frame"), "got: {err}");
    }
}
