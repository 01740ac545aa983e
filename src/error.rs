// src/error.rs
use thiserror::Error;

pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// 设置文件协议与实验编排过程中的错误类型
#[derive(Debug, Error)]
pub enum SettingsError {
    // ————————————————————————————————————————————————————————————————————————
    // 单行编解码错误
    // ————————————————————————————————————————————————————————————————————————
    #[error("malformed line {line}: {content:?} has no ':' separator")]
    MalformedLine { line: usize, content: String },

    #[error("invalid hyperparameter name {0:?}")]
    InvalidKey(String),

    #[error("invalid value for {key:?}: {reason}")]
    InvalidValue { key: String, reason: &'static str },

    // ————————————————————————————————————————————————————————————————————————
    // 设置文件结构错误（致命，不会启动任何训练）
    // ————————————————————————————————————————————————————————————————————————
    #[error("settings file contains no settings")]
    EmptyFile,

    #[error("configuration #{position} has no `type` key")]
    MissingTypeKey { position: usize },

    #[error("unknown training mode {0:?} (expected `unsupervised` or `supervised`)")]
    UnknownTrainingMode(String),

    #[error("combination marker at line {line} is not followed by any settings")]
    EmptyCombination { line: usize },

    // ————————————————————————————————————————————————————————————————————————
    // 搜索空间定义错误
    // ————————————————————————————————————————————————————————————————————————
    #[error("dimension #{dimension} mixes single and tied alternatives or tied groups of different sizes")]
    InconsistentDimensionShape { dimension: usize },

    #[error("dimension #{dimension} has no alternatives")]
    EmptyDimension { dimension: usize },

    #[error("search space defines no dimensions")]
    EmptySearchSpace,

    #[error("unknown hyperparameter {name:?} in dimension #{dimension}")]
    UnknownHyperparameter { name: String, dimension: usize },

    #[error("invalid search space: {0}")]
    SearchSpace(String),

    // ————————————————————————————————————————————————————————————————————————
    // 外部训练进程错误（只影响当前组合）
    // ————————————————————————————————————————————————————————————————————————
    #[error("trainer process `{command}` failed: {reason}")]
    TrainerProcessError {
        command: String,
        exit_code: Option<i32>,
        reason: String,
    },

    #[error("artifact {0:?} is already being trained")]
    ArtifactBusy(String),

    #[error(
        "artifact {artifact:?} is locked by {}; if no other run is active it was left by an interrupted run, delete it to retry",
        .path.display()
    )]
    LockFileExists { artifact: String, path: std::path::PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SettingsError {
    /// 是否为单次训练失败（可局部恢复），而非实验计划本身的结构错误
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            SettingsError::TrainerProcessError { .. }
                | SettingsError::ArtifactBusy(_)
                | SettingsError::LockFileExists { .. }
        )
    }
}
