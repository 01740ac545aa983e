// src/main.rs
mod batch;
mod config;
mod config_line;
mod driver;
mod error;
mod file_utils;
mod grid;
mod master_settings;
mod models;
mod search_space;
mod settings_parser;
mod trainer;

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use batch::{BatchOptions, assemble_batches};
use config::load_config;
use driver::{ExperimentDriver, training_modes};
use file_utils::{find_master_settings_files, stale_master_settings_files, variant_from_path, write_master_settings};
use grid::GridExpander;
use master_settings::MasterSettingsReader;
use models::*;
use search_space::load_search_space;
use settings_parser::read_settings_file;
use trainer::{DryRunLauncher, ProcessLauncher, SystemLauncher, TrainerAdapter};

/// 超参数网格搜索：生成组合设置文件，并逐个调用外部训练程序
#[derive(Parser, Debug)]
#[command(name = "gridrunner", version, about)]
struct Args {
    /// 配置文件路径（不存在时自动创建）
    #[arg(short, long, default_value = "gridrunner.toml", global = true)]
    config: PathBuf,

    /// 日志级别（trace, debug, info, warn, error），RUST_LOG 优先
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 展开搜索空间，为每个模型变体写出一个主设置文件
    Generate {
        /// 搜索空间定义（覆盖配置中的 grid.search_space）
        #[arg(long)]
        search_space: Option<PathBuf>,
    },

    /// 依次运行主设置文件中的全部组合
    Run {
        /// 主设置文件；省略时使用设置目录下的全部主设置文件
        files: Vec<PathBuf>,

        /// 只打印命令，不启动训练
        #[arg(long)]
        dry_run: bool,

        /// 遇到杂散行或空组合时报错，而不是跳过
        #[arg(long)]
        strict: bool,
    },

    /// 使用单个平铺设置文件运行一次训练
    Train {
        #[arg(short, long)]
        settings: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },

    /// 以JSON形式打印设置文件中的组合
    Show {
        file: PathBuf,

        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("gridrunner={}", args.log_level))),
        )
        .with_target(false)
        .init();

    // 加载配置文件
    let config = load_config(&args.config)?;
    info!(config = %args.config.display(), "configuration loaded");

    match args.command {
        Command::Generate { search_space } => {
            let path = search_space.unwrap_or_else(|| config.grid.search_space.clone());
            generate(&config, &path)
        }
        Command::Run { files, dry_run, strict } => run(&config, files, dry_run, strict),
        Command::Train { settings, dry_run } => train(&config, &settings, dry_run),
        Command::Show { file, strict } => show(&config, &file, strict),
    }
}

fn generate(config: &Config, search_space: &Path) -> Result<()> {
    let dimensions = load_search_space(search_space)?;
    let expander = GridExpander::new().with_known_names(config.grid.known_hyperparameters.iter().cloned());
    let configurations = expander
        .expand(&dimensions)
        .with_context(|| format!("Invalid search space: {}", search_space.display()))?;
    println!("Number of combinations: {}", configurations.len());

    let batches = assemble_batches(configurations, &BatchOptions::from_config(&config.grid));
    let written = write_master_settings(&config.general.settings_dir, &config.general.master_suffix, &batches)?;

    for (batch, path) in batches.iter().zip(&written) {
        println!("  {} ({} combinations) -> {}", batch.variant, batch.len(), path.display());
    }

    // 旧网格留下的文件会被 `run` 一起拾取
    let stale = stale_master_settings_files(&config.general.settings_dir, &config.general.master_suffix, &written)?;
    for path in &stale {
        warn!(file = %path.display(), "master settings file was not written by this run");
    }
    if !stale.is_empty() {
        println!(
            "{} other master settings files remain in '{}' and will be picked up by `run`; remove them if they are outdated",
            stale.len(),
            config.general.settings_dir.display()
        );
    }
    Ok(())
}

fn launcher(dry_run: bool) -> Box<dyn ProcessLauncher> {
    if dry_run {
        Box::new(DryRunLauncher)
    } else {
        Box::new(SystemLauncher::default())
    }
}

fn run(config: &Config, files: Vec<PathBuf>, dry_run: bool, strict: bool) -> Result<()> {
    let files = if files.is_empty() {
        find_master_settings_files(&config.general.settings_dir, &config.general.master_suffix)?
    } else {
        files
    };
    if files.is_empty() {
        anyhow::bail!(
            "No master settings files found in '{}'",
            config.general.settings_dir.display()
        );
    }

    // 先解析并检查全部文件，任何结构错误都不会启动训练
    let reader = MasterSettingsReader::new().lenient(config.reader.lenient && !strict);
    let mut plan = Vec::with_capacity(files.len());
    for file in &files {
        let parsed = reader.read_file(file)?;
        training_modes(&parsed.configurations)
            .with_context(|| format!("Invalid master settings file: {}", file.display()))?;
        info!(file = %file.display(), combinations = parsed.configurations.len(), "loaded master settings");
        plan.push((file, parsed.configurations));
    }

    let adapter = TrainerAdapter::from_config(&config.trainer, launcher(dry_run));
    let driver = ExperimentDriver::from_config(adapter, &config.driver);

    let mut report = DriverReport::default();
    for (file, configurations) in plan {
        let variant = variant_from_path(file, &config.general.master_suffix);
        info!(file = %file.display(), variant = variant.as_deref().unwrap_or("-"), "starting batch");
        let file_report = driver.run(configurations)?;
        for failure in file_report.failures() {
            if let RunStatus::Failed { exit_code, reason } = &failure.status {
                println!(
                    "{}: combination {} failed (exit status: {}): {}",
                    file.display(),
                    failure.position,
                    exit_code.map_or_else(|| "none".to_string(), |c| c.to_string()),
                    reason
                );
            }
        }
        report.extend(file_report);
    }

    if let Some(report_file) = &config.general.report_file {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        std::fs::write(report_file, json)
            .with_context(|| format!("Failed to write run report: {}", report_file.display()))?;
    }

    println!("{} succeeded, {} failed", report.succeeded(), report.failed());
    if report.failed() > 0 {
        anyhow::bail!("{} of {} runs failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}

fn train(config: &Config, settings: &Path, dry_run: bool) -> Result<()> {
    let parsed = read_settings_file(settings, true)?;
    let mode = parsed
        .training_mode()
        .with_context(|| format!("Invalid settings file: {}", settings.display()))?;

    let adapter = TrainerAdapter::from_config(&config.trainer, launcher(dry_run));
    let code = adapter.invoke(&parsed.configuration, mode)?;
    println!("return code: {}", code);
    Ok(())
}

fn show(config: &Config, file: &Path, strict: bool) -> Result<()> {
    let parsed = MasterSettingsReader::new()
        .lenient(config.reader.lenient && !strict)
        .read_file(file)?;

    print_configurations_pretty(&parsed.configurations)?;
    println!("Number of combinations: {}", parsed.configurations.len());
    if parsed.has_warnings() {
        println!(
            "Skipped {} stray lines and {} empty combinations",
            parsed.skipped_lines, parsed.empty_blocks
        );
    }
    Ok(())
}
