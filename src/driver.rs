// src/driver.rs
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{error, info, warn};
use crate::batch::{OUTPUT_KEY, TYPE_KEY};
use crate::error::{SettingsError, SettingsResult};
use crate::models::{Configuration, DriverConfig, DriverReport, RunOutcome, RunStatus, TrainingMode};
use crate::trainer::{ProcessLauncher, TrainerAdapter};

// ————————————————————————————————————————————————————————————————————————
// 按产物名加锁：同一产物同一时间只允许一次训练
// ————————————————————————————————————————————————————————————————————————

/// 产物锁注册表；进程内共享，配置了 lock_dir 时还会创建锁文件以覆盖同一主机上的其他进程
#[derive(Debug, Clone, Default)]
pub struct RunLocks {
    held: Arc<Mutex<HashSet<String>>>,
    lock_dir: Option<PathBuf>,
}

impl RunLocks {
    pub fn new(lock_dir: Option<PathBuf>) -> Self {
        Self { held: Arc::default(), lock_dir }
    }

    pub fn acquire(&self, artifact: &str) -> SettingsResult<ArtifactLock> {
        if !self.held.lock().insert(artifact.to_string()) {
            return Err(SettingsError::ArtifactBusy(artifact.to_string()));
        }

        let lock_file = match &self.lock_dir {
            Some(dir) => {
                let path = dir.join(lock_file_name(artifact));
                match OpenOptions::new().write(true).create_new(true).open(&path) {
                    Ok(_) => Some(path),
                    Err(e) => {
                        self.held.lock().remove(artifact);
                        return Err(if e.kind() == std::io::ErrorKind::AlreadyExists {
                            SettingsError::LockFileExists { artifact: artifact.to_string(), path }
                        } else {
                            SettingsError::Io(e)
                        });
                    }
                }
            }
            None => None,
        };

        Ok(ArtifactLock {
            artifact: artifact.to_string(),
            held: Arc::clone(&self.held),
            lock_file,
        })
    }
}

// 百分号转义路径分隔符，不同产物名总是得到不同的锁文件名
fn lock_file_name(artifact: &str) -> String {
    let mut name = String::with_capacity(artifact.len() + 5);
    for c in artifact.chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            ':' => name.push_str("%3A"),
            c => name.push(c),
        }
    }
    name.push_str(".lock");
    name
}

/// 持有期间产物被锁定，释放时自动解锁
#[derive(Debug)]
pub struct ArtifactLock {
    artifact: String,
    held: Arc<Mutex<HashSet<String>>>,
    lock_file: Option<PathBuf>,
}

impl Drop for ArtifactLock {
    fn drop(&mut self) {
        if let Some(path) = &self.lock_file {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "failed to remove lock file");
            }
        }
        self.held.lock().remove(&self.artifact);
    }
}

// ————————————————————————————————————————————————————————————————————————
// 实验驱动：按文件顺序逐个、同步地运行配置
// ————————————————————————————————————————————————————————————————————————

/// 读取每个配置的训练模式；任何一个缺少或无法识别 `type` 都返回错误
pub fn training_modes(configurations: &[Configuration]) -> SettingsResult<Vec<TrainingMode>> {
    configurations
        .iter()
        .enumerate()
        .map(|(i, configuration)| {
            configuration
                .get(TYPE_KEY)
                .ok_or(SettingsError::MissingTypeKey { position: i + 1 })?
                .parse::<TrainingMode>()
        })
        .collect()
}

pub struct ExperimentDriver<L> {
    adapter: TrainerAdapter<L>,
    continue_on_failure: bool,
    locks: RunLocks,
}

impl<L: ProcessLauncher> ExperimentDriver<L> {
    pub fn new(adapter: TrainerAdapter<L>) -> Self {
        Self { adapter, continue_on_failure: true, locks: RunLocks::default() }
    }

    pub fn from_config(adapter: TrainerAdapter<L>, config: &DriverConfig) -> Self {
        Self::new(adapter)
            .continue_on_failure(config.continue_on_failure)
            .with_locks(RunLocks::new(config.lock_dir.clone()))
    }

    /// 失败后是否继续：网格搜索继续，单次调参运行立即停止
    pub fn continue_on_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_failure = continue_on_failure;
        self
    }

    pub fn with_locks(mut self, locks: RunLocks) -> Self {
        self.locks = locks;
        self
    }

    /// 运行全部配置
    ///
    /// 启动任何训练之前先检查每个配置的 `type` 键，结构错误直接返回；
    /// 单个训练失败只记录在报告中。
    pub fn run(&self, configurations: Vec<Configuration>) -> SettingsResult<DriverReport> {
        let modes = training_modes(&configurations)?;

        let total = configurations.len();
        let mut report = DriverReport::default();

        for (i, (mut configuration, mode)) in configurations.into_iter().zip(modes).enumerate() {
            let position = i + 1;
            configuration.remove(TYPE_KEY);
            let output = configuration.get(OUTPUT_KEY).map(str::to_string);
            info!(position, total, %mode, output = output.as_deref().unwrap_or("-"), "running configuration");

            let status = match self.run_one(&configuration, mode, output.as_deref()) {
                Ok(()) => RunStatus::Succeeded,
                // 锁目录不可用等环境错误会影响所有后续组合，直接返回
                Err(e) if !e.is_run_failure() => return Err(e),
                Err(e) => {
                    let exit_code = match &e {
                        SettingsError::TrainerProcessError { exit_code, .. } => *exit_code,
                        _ => None,
                    };
                    error!(position, output = output.as_deref().unwrap_or("-"), ?exit_code, error = %e, "configuration failed");
                    RunStatus::Failed { exit_code, reason: e.to_string() }
                }
            };

            let failed = matches!(status, RunStatus::Failed { .. });
            report.outcomes.push(RunOutcome { position, output, status });

            if failed && !self.continue_on_failure {
                warn!(position, remaining = total - position, "stopping after failure");
                break;
            }
        }

        info!(succeeded = report.succeeded(), failed = report.failed(), total, "run finished");
        Ok(report)
    }

    fn run_one(&self, configuration: &Configuration, mode: TrainingMode, output: Option<&str>) -> SettingsResult<()> {
        let _lock = output.map(|artifact| self.locks.acquire(artifact)).transpose()?;
        self.adapter.invoke(configuration, mode)?;
        Ok(())
    }
}
