// src/settings_parser.rs
use std::path::Path;
use anyhow::{Context, Result};
use crate::config_line::decode_at;
use crate::error::{SettingsError, SettingsResult};
use crate::models::{Configuration, TrainingMode};

/// 单次运行设置文件的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSettings {
    pub configuration: Configuration,
    // ————————————————————————————————————————————————————————————————————————
    // 提取出的 `type` 键（仅在调用方要求提取时填充，且已从 configuration 中移除）
    // ————————————————————————————————————————————————————————————————————————
    pub training_type: Option<String>,
}

impl ParsedSettings {
    /// 将提取出的 `type` 解析为训练模式
    pub fn training_mode(&self) -> SettingsResult<TrainingMode> {
        self.training_type
            .as_deref()
            .ok_or(SettingsError::MissingTypeKey { position: 1 })?
            .parse()
    }
}

/// 严格解析平铺的设置文件内容（无分隔行），得到一个配置
///
/// 只去掉末尾换行产生的一个空行；其余每一行都必须是 `name: value`。
/// 重复的键以最后一次出现为准。
pub fn parse_settings(content: &str, extract_type: bool) -> SettingsResult<ParsedSettings> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.is_empty() {
        return Err(SettingsError::EmptyFile);
    }

    let mut configuration = Configuration::new();
    for (idx, line) in lines.iter().enumerate() {
        let (name, value) = decode_at(line, idx + 1)?;
        configuration.insert(name, value);
    }

    let training_type = if extract_type {
        let value = configuration
            .remove("type")
            .ok_or(SettingsError::MissingTypeKey { position: 1 })?;
        Some(value)
    } else {
        None
    };

    Ok(ParsedSettings { configuration, training_type })
}

/// 读取并解析单次运行的设置文件
pub fn read_settings_file(file_path: &Path, extract_type: bool) -> Result<ParsedSettings> {
    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read settings file: {}", file_path.display()))?;

    parse_settings(&contents, extract_type)
        .with_context(|| format!("Failed to parse settings file: {}", file_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_settings() {
        let content = "type: unsupervised\nmodel_type: skipgram\ninput: dataset/train_1000.txt\nminCount: 5\ndim: 128\n";
        let parsed = parse_settings(content, true).unwrap();

        assert_eq!(parsed.training_type.as_deref(), Some("unsupervised"));
        assert_eq!(parsed.training_mode().unwrap(), TrainingMode::Unsupervised);
        assert_eq!(parsed.configuration.get("type"), None);
        assert_eq!(
            parsed.configuration.keys().collect::<Vec<_>>(),
            vec!["model_type", "input", "minCount", "dim"]
        );
        assert_eq!(parsed.configuration.get("dim"), Some("128"));
    }

    #[test]
    fn test_parse_settings_without_extraction_keeps_type() {
        let parsed = parse_settings("type: supervised\nlr: 0.1", false).unwrap();
        assert_eq!(parsed.training_type, None);
        assert_eq!(parsed.configuration.get("type"), Some("supervised"));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let parsed = parse_settings("dim: 50\ndim: 64\n", false).unwrap();
        assert_eq!(parsed.configuration.len(), 1);
        assert_eq!(parsed.configuration.get("dim"), Some("64"));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_settings("", false), Err(SettingsError::EmptyFile)));
        assert!(matches!(parse_settings("\n", false), Err(SettingsError::EmptyFile)));
    }

    #[test]
    fn test_interior_blank_line_is_malformed() {
        let result = parse_settings("dim: 50\n\nlr: 0.1\n", false);
        assert!(matches!(result, Err(SettingsError::MalformedLine { line: 2, .. })));
    }

    #[test]
    fn test_only_one_trailing_blank_line_is_dropped() {
        let result = parse_settings("dim: 50\n\n", false);
        assert!(matches!(result, Err(SettingsError::MalformedLine { line: 2, .. })));
    }

    #[test]
    fn test_missing_type_key() {
        let result = parse_settings("dim: 50\n", true);
        assert!(matches!(result, Err(SettingsError::MissingTypeKey { .. })));
    }

    #[test]
    fn test_read_settings_file() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("settings.txt");
        std::fs::write(&file, "type: supervised\ninput: train.txt\noutput: model\n").unwrap();

        let parsed = read_settings_file(&file, true).unwrap();
        assert_eq!(parsed.training_mode().unwrap(), TrainingMode::Supervised);
        assert_eq!(parsed.configuration.get("output"), Some("model"));

        assert!(read_settings_file(&temp_dir.path().join("missing.txt"), true).is_err());
    }
}
