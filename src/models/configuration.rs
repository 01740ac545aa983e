use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 一组完整的超参数取值：参数名 → 字符串值，保持插入顺序
///
/// 相等性按映射比较（与键的顺序无关），写出时按插入顺序输出。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(IndexMap<String, String>);

impl Configuration {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// 插入参数；同名参数覆盖旧值并保留原位置
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// 注入编排层拥有的参数：总是覆盖，并移动到末尾
    pub fn inject(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.shift_remove(&name);
        self.0.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// 移除参数，其余参数的相对顺序不变
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut configuration = Configuration::new();
        for (name, value) in iter {
            configuration.insert(name, value);
        }
        configuration
    }
}

impl From<&Configuration> for JsonValue {
    fn from(val: &Configuration) -> Self {
        val.iter()
            .map(|(k, v)| (k.to_string(), JsonValue::String(v.to_string())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

/// 将一组配置格式化为美观的JSON字符串并打印到控制台
///
/// 每个组合输出为一个JSON对象，键的顺序与设置文件中的顺序一致，
/// 便于检查生成或手工编辑过的设置文件
///
/// # 参数
/// * `configurations` - 按文件顺序排列的配置列表
///
/// # 返回值
/// * `Result<(), serde_json::Error>` - 成功时返回Ok(())，序列化失败时返回错误
pub fn print_configurations_pretty(configurations: &[Configuration]) -> Result<(), serde_json::Error> {
    for (i, configuration) in configurations.iter().enumerate() {
        let json_value: JsonValue = configuration.into();
        println!("#{}", i + 1);
        println!("{}", serde_json::to_string_pretty(&json_value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position_on_overwrite() {
        let mut config = Configuration::new();
        config.insert("model_type", "cbow");
        config.insert("dim", "50");
        let previous = config.insert("model_type", "skipgram");

        assert_eq!(previous, Some("cbow".to_string()));
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["model_type", "dim"]);
        assert_eq!(config.get("model_type"), Some("skipgram"));
    }

    #[test]
    fn test_inject_moves_key_to_end() {
        let mut config = Configuration::new();
        config.insert("output", "grid_value");
        config.insert("dim", "50");
        config.inject("output", "word_vectors/cbow_combination_1");

        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["dim", "output"]);
        assert_eq!(config.get("output"), Some("word_vectors/cbow_combination_1"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut config: Configuration =
            [("a", "1"), ("type", "unsupervised"), ("b", "2")].into_iter().collect();
        assert_eq!(config.remove("type"), Some("unsupervised".to_string()));
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(config.remove("type"), None);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: Configuration = [("dim", "50"), ("lr", "0.1")].into_iter().collect();
        let b: Configuration = [("lr", "0.1"), ("dim", "50")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_json_conversion() {
        let config: Configuration = [("model_type", "cbow"), ("dim", "50")].into_iter().collect();
        let json: JsonValue = (&config).into();
        assert_eq!(json["model_type"], "cbow");
        assert_eq!(json["dim"], "50");
    }
}
