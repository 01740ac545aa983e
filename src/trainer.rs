// src/trainer.rs
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use crate::error::{SettingsError, SettingsResult};
use crate::models::{Configuration, TrainerConfig, TrainingMode};

/// 对外部训练程序的一次调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl InvocationRequest {
    /// 完整命令行，仅用于日志和错误信息
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 外部进程的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    Code(i32),
    Terminated, // 被信号终止，没有退出码
    TimedOut,
}

/// 进程启动接口；测试中用假实现替换
pub trait ProcessLauncher {
    fn launch(&self, request: &InvocationRequest) -> std::io::Result<ProcessExit>;
}

impl<L: ProcessLauncher + ?Sized> ProcessLauncher for &L {
    fn launch(&self, request: &InvocationRequest) -> std::io::Result<ProcessExit> {
        (**self).launch(request)
    }
}

impl<L: ProcessLauncher + ?Sized> ProcessLauncher for Box<L> {
    fn launch(&self, request: &InvocationRequest) -> std::io::Result<ProcessExit> {
        (**self).launch(request)
    }
}

/// 同步启动真实进程，阻塞直到退出；设置了超时则到期后强制结束
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    poll_interval: Duration,
}

impl Default for SystemLauncher {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(200) }
    }
}

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, request: &InvocationRequest) -> std::io::Result<ProcessExit> {
        let mut cmd = Command::new(&request.command);
        cmd.args(&request.args).stdin(Stdio::null());
        if let Some(dir) = &request.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn()?;
        let status = match request.timeout {
            None => child.wait()?,
            Some(timeout) => {
                let deadline = Instant::now() + timeout;
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        warn!(command = %request.command.display(), ?timeout, "trainer exceeded its deadline, killing it");
                        child.kill()?;
                        child.wait()?;
                        return Ok(ProcessExit::TimedOut);
                    }
                    thread::sleep(self.poll_interval);
                }
            }
        };

        Ok(match status.code() {
            Some(code) => ProcessExit::Code(code),
            None => ProcessExit::Terminated,
        })
    }
}

/// 只打印命令、不启动进程的实现（--dry-run）
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLauncher;

impl ProcessLauncher for DryRunLauncher {
    fn launch(&self, request: &InvocationRequest) -> std::io::Result<ProcessExit> {
        println!("[dry-run] {}", request.command_line());
        Ok(ProcessExit::Code(0))
    }
}

/// 训练调用适配器：把配置映射为外部训练程序的参数并执行
pub struct TrainerAdapter<L> {
    trainer: PathBuf,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    positional_key: String,
    launcher: L,
}

impl<L: ProcessLauncher> TrainerAdapter<L> {
    pub fn new(trainer: impl Into<PathBuf>, launcher: L) -> Self {
        Self {
            trainer: trainer.into(),
            working_dir: None,
            timeout: None,
            positional_key: "model_type".to_string(),
            launcher,
        }
    }

    pub fn from_config(config: &TrainerConfig, launcher: L) -> Self {
        let mut adapter = Self::new(config.path.clone(), launcher)
            .with_timeout((config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)))
            .with_working_dir(config.working_dir.clone());
        adapter.positional_key = config.positional_key.clone();
        adapter
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, working_dir: Option<PathBuf>) -> Self {
        self.working_dir = working_dir;
        self
    }

    /// 组装参数列表
    ///
    /// 监督模式以字面量 `supervised` 开头；模型变体（positional_key）作为裸参数紧随其后，
    /// 其余每个键输出为 `-<key> <value>`，顺序与配置一致。`type` 键不会被转发。
    pub fn build_args(&self, configuration: &Configuration, mode: TrainingMode) -> Vec<String> {
        let mut args = Vec::with_capacity(configuration.len() * 2 + 1);
        if mode == TrainingMode::Supervised {
            args.push(mode.as_str().to_string());
        }
        if let Some(variant) = configuration.get(&self.positional_key) {
            args.push(variant.to_string());
        }
        for (name, value) in configuration.iter() {
            if name == self.positional_key || name == "type" {
                continue;
            }
            args.push(format!("-{}", name));
            args.push(value.to_string());
        }
        args
    }

    pub fn build_invocation(&self, configuration: &Configuration, mode: TrainingMode) -> InvocationRequest {
        InvocationRequest {
            command: self.trainer.clone(),
            args: self.build_args(configuration, mode),
            working_dir: self.working_dir.clone(),
            timeout: self.timeout,
        }
    }

    /// 同步执行一次训练；退出码非0、被终止、超时或无法启动都视为失败
    pub fn invoke(&self, configuration: &Configuration, mode: TrainingMode) -> SettingsResult<i32> {
        let request = self.build_invocation(configuration, mode);
        let command = request.command_line();
        info!(%command, "launching trainer");

        let exit = self.launcher.launch(&request).map_err(|e| SettingsError::TrainerProcessError {
            command: command.clone(),
            exit_code: None,
            reason: format!("failed to launch: {}", e),
        })?;
        debug!(?exit, "trainer finished");

        match exit {
            ProcessExit::Code(0) => Ok(0),
            ProcessExit::Code(code) => Err(SettingsError::TrainerProcessError {
                command,
                exit_code: Some(code),
                reason: format!("exit status {}", code),
            }),
            ProcessExit::Terminated => Err(SettingsError::TrainerProcessError {
                command,
                exit_code: None,
                reason: "terminated by signal".to_string(),
            }),
            ProcessExit::TimedOut => Err(SettingsError::TrainerProcessError {
                command,
                exit_code: None,
                reason: "timed out".to_string(),
            }),
        }
    }
}
