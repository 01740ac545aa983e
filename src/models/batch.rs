use crate::models::configuration::Configuration;

/// 带编号的配置：序号在所属批次内从1开始，用于生成不冲突的输出名
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedConfiguration {
    pub sequence: usize,     // 批次内序号（1-based）
    pub source_index: usize, // 在网格展开结果中的全局位置（0-based）
    pub configuration: Configuration,
}

/// 共享同一区分字段取值（如 model_type）的组合批次，对应一个主设置文件
#[derive(Debug, Clone, PartialEq)]
pub struct CombinationBatch {
    pub variant: String,
    pub entries: Vec<NumberedConfiguration>,
}

impl CombinationBatch {
    pub fn new(variant: impl Into<String>) -> Self {
        Self { variant: variant.into(), entries: Vec::new() }
    }

    /// 追加一个配置，序号为当前批次长度 + 1
    pub fn push(&mut self, source_index: usize, configuration: Configuration) -> usize {
        let sequence = self.entries.len() + 1;
        self.entries.push(NumberedConfiguration { sequence, source_index, configuration });
        sequence
    }

    /// 产物名：`<variant>_combination_<n>`
    pub fn artifact_name(variant: &str, sequence: usize) -> String {
        format!("{}_combination_{}", variant, sequence)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 批次中的配置，按序号排列
    pub(crate) fn configurations_of(batch: &CombinationBatch) -> Vec<Configuration> {
        batch.entries.iter().map(|e| e.configuration.clone()).collect()
    }

    #[test]
    fn test_push_assigns_sequence_numbers() {
        let mut batch = CombinationBatch::new("cbow");
        assert_eq!(batch.push(0, Configuration::new()), 1);
        assert_eq!(batch.push(4, Configuration::new()), 2);
        assert_eq!(batch.entries[1].source_index, 4);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(CombinationBatch::artifact_name("skipgram", 12), "skipgram_combination_12");
    }
}
