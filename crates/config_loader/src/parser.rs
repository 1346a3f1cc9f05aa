//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。缺失的段落和字段使用默认值。

use contracts::{ContractError, EngineConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<EngineConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<EngineConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<EngineConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MetricKind;

    #[test]
    fn test_parse_toml_sections() {
        let content = r#"
[normalizer]
confidence_threshold = 0.4

[similarity]
metric = "cosine"
mirror_matching = false

[alignment]
min_length = 15
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.normalizer.confidence_threshold, 0.4);
        assert_eq!(config.normalizer.min_visible_joints, 2);
        assert_eq!(config.similarity.metric, MetricKind::Cosine);
        assert!(!config.similarity.mirror_matching);
        assert_eq!(config.alignment.min_length, 15);
        assert_eq!(config.smoother.window, 5);
    }

    #[test]
    fn test_parse_empty_toml_is_default() {
        assert_eq!(parse_toml("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "smoother": { "window": 9 },
            "score": { "pooling_window": 5, "display_step": 0.0 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.smoother.window, 9);
        assert_eq!(config.score.pooling_window, 5);
        assert_eq!(config.score.points_per_frame, 1000.0);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let err = parse_toml("[similarity]\nmetric = \"euclid\"\n").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
