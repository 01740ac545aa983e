use crate::models::run::TrainingMode;
use serde::Deserialize;
use std::path::PathBuf;

/// 应用程序配置结构
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub trainer: TrainerConfig,
    pub grid: GridConfig,
    pub reader: ReaderConfig,
    pub driver: DriverConfig,
}

/// 通用配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub settings_dir: PathBuf,
    pub master_suffix: String,
    #[serde(deserialize_with = "crate::models::utils::deserialize_optional_path")]
    pub report_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            settings_dir: PathBuf::from("settings"),
            master_suffix: "_master_settings.txt".to_string(),
            report_file: None,
        }
    }
}

/// 外部训练程序配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    pub path: PathBuf,
    #[serde(deserialize_with = "crate::models::utils::deserialize_optional_path")]
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: u64, // 0 表示不设超时
    pub positional_key: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("../fastText-0.9.1/fasttext"),
            working_dir: None,
            timeout_secs: 0,
            positional_key: "model_type".to_string(),
        }
    }
}

/// 网格搜索配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GridConfig {
    pub search_space: PathBuf,
    pub discriminator: String,
    pub training_mode: TrainingMode,
    pub input: String,
    pub output_dir: String,
    pub known_hyperparameters: Vec<String>, // 为空时不做参数名校验
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            search_space: PathBuf::from("search_space.yaml"),
            discriminator: "model_type".to_string(),
            training_mode: TrainingMode::Unsupervised,
            input: "../scratch-vectorize/dataset/train_500000.txt".to_string(),
            output_dir: "../scratch-vectorize/word_vectors".to_string(),
            known_hyperparameters: Vec::new(),
        }
    }
}

/// 主设置文件读取配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReaderConfig {
    pub lenient: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { lenient: true }
    }
}

/// 批量运行配置
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriverConfig {
    pub continue_on_failure: bool,
    #[serde(deserialize_with = "crate::models::utils::deserialize_optional_path")]
    pub lock_dir: Option<PathBuf>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { continue_on_failure: true, lock_dir: None }
    }
}
