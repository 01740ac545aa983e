// models.rs - 作为模块目录入口文件（Rust 2018+ 风格）
// 导出所有子模块
pub mod batch;
pub mod config;
pub mod configuration;
pub mod hyperparameter;
pub mod run;
pub mod utils;

// 重新导出常用类型，保持API一致性
pub use batch::{CombinationBatch, NumberedConfiguration};
pub use config::{Config, DriverConfig, GeneralConfig, GridConfig, ReaderConfig, TrainerConfig};
pub use configuration::{Configuration, print_configurations_pretty};
pub use hyperparameter::{Dimension, GroupMember, HyperparameterOption};
pub use run::{DriverReport, RunOutcome, RunStatus, TrainingMode};
