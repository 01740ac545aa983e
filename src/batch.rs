// src/batch.rs
use std::path::Path;
use tracing::debug;
use crate::models::{CombinationBatch, Configuration, GridConfig, TrainingMode};

/// 编排层注入的键，总是覆盖网格中的同名键
pub const TYPE_KEY: &str = "type";
pub const INPUT_KEY: &str = "input";
pub const OUTPUT_KEY: &str = "output";

/// 组合分批与编排键注入的参数
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub discriminator: String,
    pub training_mode: TrainingMode,
    pub input: String,
    pub output_dir: String,
}

impl BatchOptions {
    pub fn from_config(grid: &GridConfig) -> Self {
        Self {
            discriminator: grid.discriminator.clone(),
            training_mode: grid.training_mode,
            input: grid.input.clone(),
            output_dir: grid.output_dir.clone(),
        }
    }

    /// 输出产物路径：`<output_dir>/<variant>_combination_<n>`
    pub fn output_path(&self, variant: &str, sequence: usize) -> String {
        let name = CombinationBatch::artifact_name(variant, sequence);
        Path::new(&self.output_dir).join(name).to_string_lossy().into_owned()
    }
}

/// 按区分字段将网格展开结果分批
///
/// - 批次顺序为区分字段取值首次出现的顺序，批次内保持展开顺序
/// - 序号为批次内位置（1-based），而非全局位置
/// - 缺少区分字段的配置归入以训练模式命名的批次
pub fn assemble_batches(configurations: Vec<Configuration>, options: &BatchOptions) -> Vec<CombinationBatch> {
    let mut batches: Vec<CombinationBatch> = Vec::new();

    for (source_index, mut configuration) in configurations.into_iter().enumerate() {
        let variant = configuration
            .get(&options.discriminator)
            .unwrap_or(options.training_mode.as_str())
            .to_string();

        let position = match batches.iter().position(|b| b.variant == variant) {
            Some(position) => position,
            None => {
                batches.push(CombinationBatch::new(variant.clone()));
                batches.len() - 1
            }
        };
        let batch = &mut batches[position];
        let sequence = batch.len() + 1;

        configuration.inject(TYPE_KEY, options.training_mode.as_str());
        configuration.inject(INPUT_KEY, options.input.as_str());
        configuration.inject(OUTPUT_KEY, options.output_path(&variant, sequence));
        batch.push(source_index, configuration);
    }

    for batch in &batches {
        debug!(variant = %batch.variant, combinations = batch.len(), "assembled batch");
    }
    batches
}
