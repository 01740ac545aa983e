use crate::config_line;
use crate::error::SettingsResult;
use std::fmt;

/// 单个超参数取值，如 `dim: 50`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperparameterOption {
    pub name: String,  // 参数名，不含冒号
    pub value: String, // 参数值，已去除首尾空白
}

impl HyperparameterOption {
    /// 从 `name: value` 形式的字符串解析
    pub fn parse(text: &str) -> SettingsResult<Self> {
        let (name, value) = config_line::decode(text)?;
        Ok(Self { name, value })
    }
}

impl fmt::Display for HyperparameterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// 搜索维度中的一个候选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupMember {
    // ————————————————————————————————————————————————————————————————————————
    // 独立取值的单个超参数
    // ————————————————————————————————————————————————————————————————————————
    Single(HyperparameterOption),
    // ————————————————————————————————————————————————————————————————————————
    // 必须一起选择的一组超参数（如 minn/maxn、epoch/lr），顺序固定
    // ————————————————————————————————————————————————————————————————————————
    Tied(Vec<HyperparameterOption>),
}

impl GroupMember {
    /// 该候选项贡献的全部参数，按固定的内部顺序
    pub fn options(&self) -> &[HyperparameterOption] {
        match self {
            GroupMember::Single(option) => std::slice::from_ref(option),
            GroupMember::Tied(options) => options,
        }
    }

    /// 候选项的形状：单个参数为 None，绑定组为 Some(成员数)
    pub fn shape(&self) -> Option<usize> {
        match self {
            GroupMember::Single(_) => None,
            GroupMember::Tied(options) => Some(options.len()),
        }
    }
}

/// 搜索空间的一个维度：互斥候选项的有序列表，每个组合恰好选择其中一个
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dimension {
    pub alternatives: Vec<GroupMember>,
}

impl Dimension {
    pub fn new(alternatives: Vec<GroupMember>) -> Self {
        Self { alternatives }
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// 维度是否同构：全部为单个参数，或全部为同样大小的绑定组
    pub fn is_homogeneous(&self) -> bool {
        match self.alternatives.first() {
            Some(first) => {
                let shape = first.shape();
                self.alternatives.iter().all(|alt| alt.shape() == shape)
            }
            None => true,
        }
    }
}
