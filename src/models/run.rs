use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 训练模式，对应设置文件中的 `type` 键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    #[default]
    Unsupervised,
    Supervised,
}

impl TrainingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMode::Unsupervised => "unsupervised",
            TrainingMode::Supervised => "supervised",
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsupervised" => Ok(TrainingMode::Unsupervised),
            "supervised" => Ok(TrainingMode::Supervised),
            other => Err(SettingsError::UnknownTrainingMode(other.to_string())),
        }
    }
}

/// 单次训练的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed {
        exit_code: Option<i32>,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub position: usize,        // 在设置文件中的位置（1-based）
    pub output: Option<String>, // 输出产物路径（output 键）
    #[serde(flatten)]
    pub status: RunStatus,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, RunStatus::Succeeded)
    }
}

/// 一次批量运行的汇总报告，按配置顺序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverReport {
    pub outcomes: Vec<RunOutcome>,
}

impl DriverReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn extend(&mut self, other: DriverReport) {
        self.outcomes.extend(other.outcomes);
    }
}
