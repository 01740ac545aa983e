use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// 反序列化可选路径，将空字符串转换为None
///
/// # 参数
/// - `deserializer`: 用于反序列化的serde反序列化器
///
/// # 返回值
/// 反序列化后的可选路径，如果原字符串为空则返回None
pub fn deserialize_optional_path<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    // 测试结构体，用于测试deserialize_optional_path函数
    #[derive(Debug, Deserialize)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_path")]
        field: Option<PathBuf>,
    }

    #[test]
    fn test_deserialize_optional_path_with_content() {
        let test: TestStruct = toml::from_str("field = \"locks\"").unwrap();
        assert_eq!(test.field, Some(PathBuf::from("locks")));
    }

    #[test]
    fn test_deserialize_optional_path_with_empty() {
        let test: TestStruct = toml::from_str("field = ''").unwrap();
        assert_eq!(test.field, None);

        let test: TestStruct = toml::from_str("field = '   '").unwrap();
        assert_eq!(test.field, None);
    }

    #[test]
    fn test_deserialize_optional_path_with_missing() {
        let test: TestStruct = toml::from_str("").unwrap();
        assert_eq!(test.field, None);
    }
}
