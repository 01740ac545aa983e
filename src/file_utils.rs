use std::path::{Path, PathBuf};
use walkdir::{WalkDir, DirEntry};
use anyhow::{Context, Result};
use crate::master_settings::write_batch;
use crate::models::CombinationBatch;

/// 遍历设置目录，收集所有主设置文件路径（按文件名排序）
pub fn find_master_settings_files(settings_dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    // 检查目录是否存在
    if !settings_dir.exists() {
        anyhow::bail!("Settings directory '{}' does not exist", settings_dir.display());
    }

    if !settings_dir.is_dir() {
        anyhow::bail!("'{}' is not a directory", settings_dir.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(settings_dir)
        .follow_links(true)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)                        // 过滤掉错误条目
        .filter(|entry| is_master_settings_file(entry, suffix))
        .map(|entry| entry.path().to_path_buf())
        .collect();

    files.sort();
    Ok(files)
}

/// 检查是否为以 suffix 结尾的普通文件，且后缀前还有变体名
fn is_master_settings_file(entry: &DirEntry, suffix: &str) -> bool {
    entry.file_type().is_file() && variant_from_file_name(&entry.file_name().to_string_lossy(), suffix).is_some()
}

/// 从文件名中提取变体名（如 "cbow_master_settings.txt" → "cbow"）
fn variant_from_file_name(file_name: &str, suffix: &str) -> Option<String> {
    file_name
        .strip_suffix(suffix)
        .filter(|variant| !variant.is_empty())
        .map(|variant| variant.to_string())
}

/// 从文件路径中提取变体名
pub fn variant_from_path(path: &Path, suffix: &str) -> Option<String> {
    path.file_name()
        .and_then(|name| variant_from_file_name(&name.to_string_lossy(), suffix))
}

/// 某个变体的主设置文件路径
pub fn master_settings_path(settings_dir: &Path, variant: &str, suffix: &str) -> PathBuf {
    settings_dir.join(format!("{}{}", variant, suffix))
}

/// 将每个批次写入各自的主设置文件，返回写出的路径
pub fn write_master_settings(settings_dir: &Path, suffix: &str, batches: &[CombinationBatch]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(settings_dir)
        .with_context(|| format!("Failed to create settings directory: {}", settings_dir.display()))?;

    let mut written = Vec::with_capacity(batches.len());
    for batch in batches {
        let path = master_settings_path(settings_dir, &batch.variant, suffix);
        let contents = write_batch(batch)
            .with_context(|| format!("Failed to serialize combinations for variant '{}'", batch.variant))?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write master settings file: {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// 设置目录中本次没有写出的主设置文件（例如来自旧网格、已不存在的变体）
///
/// `run` 不带参数时会拾取目录中的全部主设置文件，所以调用方应提示用户处理这些文件。
pub fn stale_master_settings_files(settings_dir: &Path, suffix: &str, written: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let current: Vec<_> = written.iter().filter_map(|path| path.file_name()).collect();
    let stale = find_master_settings_files(settings_dir, suffix)?
        .into_iter()
        .filter(|path| path.file_name().is_none_or(|name| !current.contains(&name)))
        .collect();
    Ok(stale)
}
