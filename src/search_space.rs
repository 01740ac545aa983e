// src/search_space.rs
use std::path::Path;
use anyhow::{Context, Result};
use crate::error::{SettingsError, SettingsResult};
use crate::models::{Dimension, GroupMember, HyperparameterOption};
use tracing::info;

/// 默认搜索空间：无监督词向量模型的网格（2 × 2 × 5 × 3 × 4 = 240 个组合）
pub const DEFAULT_SEARCH_SPACE: &str = r#"# 每个维度是一个候选项列表，每个组合从每个维度中恰好选一个。
# 候选项为 "name: value" 字符串，或必须一起取值的字符串列表（绑定参数）。
dimensions:
  - ["model_type: cbow", "model_type: skipgram"]
  - ["minCount: 1", "minCount: 5"]
  - ["dim: 50", "dim: 64", "dim: 128", "dim: 175", "dim: 200"]
  - - ["minn: 1", "maxn: 5"]
    - ["minn: 1", "maxn: 8"]
    - ["minn: 1", "maxn: 10"]
  - - ["epoch: 5", "lr: 0.1"]
    - ["epoch: 10", "lr: 0.05"]
    - ["epoch: 25", "lr: 0.01"]
    - ["epoch: 50", "lr: 0.01"]
"#;

/// 读取搜索空间定义文件；文件不存在时先写入默认定义
pub fn load_search_space(file_path: &Path) -> Result<Vec<Dimension>> {
    if !file_path.exists() {
        std::fs::write(file_path, DEFAULT_SEARCH_SPACE)
            .with_context(|| format!("Failed to create default search space: {}", file_path.display()))?;
        info!(path = %file_path.display(), "created default search space");
    }

    let contents = std::fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read search space: {}", file_path.display()))?;

    parse_search_space(&contents)
        .with_context(|| format!("Failed to parse search space: {}", file_path.display()))
}

// ————————————————————————————————————————————————————————————————————————
// 核心解析函数
// ————————————————————————————————————————————————————————————————————————
pub fn parse_search_space(contents: &str) -> SettingsResult<Vec<Dimension>> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(contents)
        .map_err(|e| SettingsError::SearchSpace(e.to_string()))?;

    let dimensions = yaml_value
        .get("dimensions")
        .and_then(|v| v.as_sequence())
        .ok_or_else(|| SettingsError::SearchSpace("expected a `dimensions` list".to_string()))?;

    dimensions
        .iter()
        .enumerate()
        .map(|(i, value)| yaml_to_dimension(value, i + 1))
        .collect()
}

// ————————————————————————————————————————————————————————————————————————
// 将一个维度的 YAML 列表转换为 Dimension
// ————————————————————————————————————————————————————————————————————————
fn yaml_to_dimension(value: &serde_yaml::Value, index: usize) -> SettingsResult<Dimension> {
    let items = value.as_sequence().ok_or_else(|| {
        SettingsError::SearchSpace(format!("dimension #{} must be a list of alternatives", index))
    })?;

    let mut alternatives = Vec::with_capacity(items.len());
    for item in items {
        let member = match item {
            serde_yaml::Value::Sequence(group) => {
                let options = group
                    .iter()
                    .map(|v| yaml_to_option(v, index))
                    .collect::<SettingsResult<Vec<_>>>()?;
                GroupMember::Tied(options)
            }
            // Ignore YAML tags, just look at the value
            serde_yaml::Value::Tagged(tagged) => GroupMember::Single(yaml_to_option(&tagged.value, index)?),
            _ => GroupMember::Single(yaml_to_option(item, index)?),
        };
        alternatives.push(member);
    }

    Ok(Dimension::new(alternatives))
}

fn yaml_to_option(value: &serde_yaml::Value, index: usize) -> SettingsResult<HyperparameterOption> {
    match value {
        serde_yaml::Value::String(s) => HyperparameterOption::parse(s),
        other => Err(SettingsError::SearchSpace(format!(
            "dimension #{}: expected a \"name: value\" string, found {:?}",
            index, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hyperparameter::tests::option_of;
    use tempfile::tempdir;

    #[test]
    fn test_parse_default_search_space() {
        let dims = parse_search_space(DEFAULT_SEARCH_SPACE).unwrap();

        let sizes: Vec<usize> = dims.iter().map(Dimension::len).collect();
        assert_eq!(sizes, vec![2, 2, 5, 3, 4]);

        assert_eq!(
            dims[0].alternatives[1],
            GroupMember::Single(option_of("model_type", "skipgram"))
        );
        assert_eq!(
            dims[4].alternatives[0],
            GroupMember::Tied(vec![
                option_of("epoch", "5"),
                option_of("lr", "0.1"),
            ])
        );
    }

    #[test]
    fn test_mixed_dimension_is_parsed_as_is() {
        // 形状校验由网格展开负责，这里只做结构转换
        let yaml = "dimensions:\n  - [\"dim: 50\", [\"minn: 1\", \"maxn: 5\"]]\n";
        let dims = parse_search_space(yaml).unwrap();
        assert!(!dims[0].is_homogeneous());
    }

    #[test]
    fn test_invalid_search_space() {
        assert!(matches!(parse_search_space("foo: 1"), Err(SettingsError::SearchSpace(_))));
        assert!(matches!(
            parse_search_space("dimensions:\n  - \"dim: 50\"\n"),
            Err(SettingsError::SearchSpace(_))
        ));
        assert!(matches!(
            parse_search_space("dimensions:\n  - [50, 64]\n"),
            Err(SettingsError::SearchSpace(_))
        ));
        assert!(matches!(
            parse_search_space("dimensions:\n  - [\"cbow\"]\n"),
            Err(SettingsError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_load_search_space_creates_default() {
        let temp_dir = tempdir().unwrap();
        let file = temp_dir.path().join("search_space.yaml");

        let dims = load_search_space(&file).unwrap();
        assert!(file.exists());
        assert_eq!(dims.len(), 5);

        // 已存在的文件不会被覆盖
        std::fs::write(&file, "dimensions:\n  - [\"dim: 8\"]\n").unwrap();
        let dims = load_search_space(&file).unwrap();
        assert_eq!(dims.len(), 1);
    }
}
