// src/grid.rs
use std::collections::HashSet;
use tracing::debug;
use crate::error::{SettingsError, SettingsResult};
use crate::models::{Configuration, Dimension, GroupMember};

/// 网格展开器：求各维度候选项的笛卡尔积
///
/// 输出顺序与 `itertools.product` 一致：最后一个维度变化最快。
#[derive(Debug, Clone, Default)]
pub struct GridExpander {
    known_names: Option<HashSet<String>>,
}

impl GridExpander {
    pub fn new() -> Self {
        Self { known_names: None }
    }

    /// 限定可识别的超参数名；为空列表时不做校验
    pub fn with_known_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: HashSet<String> = names.into_iter().map(Into::into).collect();
        self.known_names = if names.is_empty() { None } else { Some(names) };
        self
    }

    /// 展开前校验全部维度，任何错误都在写出文件之前返回
    pub fn validate(&self, dimensions: &[Dimension]) -> SettingsResult<()> {
        if dimensions.is_empty() {
            return Err(SettingsError::EmptySearchSpace);
        }
        for (i, dimension) in dimensions.iter().enumerate() {
            let index = i + 1;
            if dimension.is_empty() {
                return Err(SettingsError::EmptyDimension { dimension: index });
            }
            if !dimension.is_homogeneous() {
                return Err(SettingsError::InconsistentDimensionShape { dimension: index });
            }
            if let Some(known) = &self.known_names {
                let unknown = dimension
                    .alternatives
                    .iter()
                    .flat_map(GroupMember::options)
                    .find(|option| !known.contains(&option.name));
                if let Some(option) = unknown {
                    return Err(SettingsError::UnknownHyperparameter {
                        name: option.name.clone(),
                        dimension: index,
                    });
                }
            }
        }
        Ok(())
    }

    /// 组合总数 = 各维度大小之积
    pub fn combination_count(dimensions: &[Dimension]) -> usize {
        dimensions.iter().map(Dimension::len).product()
    }

    pub fn expand(&self, dimensions: &[Dimension]) -> SettingsResult<Vec<Configuration>> {
        self.validate(dimensions)?;

        let mut outputs = Vec::with_capacity(Self::combination_count(dimensions));
        expand_grid(dimensions, 0, &mut Vec::with_capacity(dimensions.len()), &mut outputs);
        debug!(combinations = outputs.len(), dimensions = dimensions.len(), "expanded search space");
        Ok(outputs)
    }
}

fn expand_grid<'a>(
    dimensions: &'a [Dimension],
    idx: usize,
    chosen: &mut Vec<&'a GroupMember>,
    outputs: &mut Vec<Configuration>,
) {
    if idx == dimensions.len() {
        outputs.push(assemble(chosen));
        return;
    }
    for member in &dimensions[idx].alternatives {
        chosen.push(member);
        expand_grid(dimensions, idx + 1, chosen, outputs);
        chosen.pop();
    }
}

// 后面维度的同名键覆盖前面的（调用方错误，但结果确定）
fn assemble(chosen: &[&GroupMember]) -> Configuration {
    let mut configuration = Configuration::new();
    for member in chosen {
        for option in member.options() {
            configuration.insert(option.name.clone(), option.value.clone());
        }
    }
    configuration
}
