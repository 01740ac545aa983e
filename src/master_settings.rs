// src/master_settings.rs
use std::path::Path;
use anyhow::{Context, Result};
use tracing::warn;
use crate::config_line::{self, is_marker_line, marker_line};
use crate::error::{SettingsError, SettingsResult};
use crate::models::{CombinationBatch, Configuration};

// ————————————————————————————————————————————————————————————————————————
// 写出：每个组合一段，分隔行 + 每个键一行 + 一个空行
// ————————————————————————————————————————————————————————————————————————

/// 将一个组合批次序列化为主设置文件内容
pub fn write_batch(batch: &CombinationBatch) -> SettingsResult<String> {
    let mut to_write = String::new();
    for entry in &batch.entries {
        to_write.push_str(&marker_line(entry.sequence));
        to_write.push('\n');
        for (name, value) in entry.configuration.iter() {
            to_write.push_str(&config_line::encode(name, value)?);
            to_write.push('\n');
        }
        to_write.push('\n');
    }
    Ok(to_write)
}

// ————————————————————————————————————————————————————————————————————————
// 读取：两状态的逐行状态机
// ————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    OutsideBlock,
    InBlock,
}

/// 主设置文件的解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMasterSettings {
    pub configurations: Vec<Configuration>,
    pub skipped_lines: usize, // 被跳过的非空、无冒号的行数
    pub empty_blocks: usize,  // 没有任何参数的组合段数（可能的数据丢失）
}

impl ParsedMasterSettings {
    pub fn has_warnings(&self) -> bool {
        self.skipped_lines > 0 || self.empty_blocks > 0
    }
}

/// 主设置文件读取器
///
/// 宽松模式下跳过无冒号的杂散行和空组合段，只计数；
/// 严格模式下二者都作为错误返回。空行在两种模式下都是合法的分隔符。
#[derive(Debug, Clone, Copy, Default)]
pub struct MasterSettingsReader {
    lenient: bool,
}

impl MasterSettingsReader {
    pub fn new() -> Self {
        Self { lenient: false }
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn parse(&self, content: &str) -> SettingsResult<ParsedMasterSettings> {
        let mut result = ParsedMasterSettings::default();
        let mut pending = Configuration::new();
        let mut state = ReaderState::OutsideBlock;
        let mut open_marker: Option<usize> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_number = idx + 1;

            if is_marker_line(line) {
                if !pending.is_empty() {
                    result.configurations.push(std::mem::take(&mut pending));
                } else if let Some(marker) = open_marker {
                    self.empty_block(marker, &mut result)?;
                }
                open_marker = Some(line_number);
                state = ReaderState::InBlock;
                continue;
            }

            if !line.contains(':') {
                if !line.trim().is_empty() {
                    if !self.lenient {
                        return Err(SettingsError::MalformedLine {
                            line: line_number,
                            content: line.to_string(),
                        });
                    }
                    result.skipped_lines += 1;
                }
                continue;
            }

            let (name, value) = config_line::decode_at(line, line_number)?;
            pending.insert(name, value);
            if state == ReaderState::OutsideBlock {
                // 没有分隔行的平铺文件：整个文件视为一个组合
                state = ReaderState::InBlock;
            }
        }

        if !pending.is_empty() {
            result.configurations.push(pending);
        } else if let Some(marker) = open_marker {
            self.empty_block(marker, &mut result)?;
        }

        if result.has_warnings() {
            warn!(
                skipped_lines = result.skipped_lines,
                empty_blocks = result.empty_blocks,
                "master settings contained stray lines or empty combinations"
            );
        }

        Ok(result)
    }

    fn empty_block(&self, marker: usize, result: &mut ParsedMasterSettings) -> SettingsResult<()> {
        if !self.lenient {
            return Err(SettingsError::EmptyCombination { line: marker });
        }
        result.empty_blocks += 1;
        Ok(())
    }

    /// 读取并解析主设置文件
    pub fn read_file(&self, file_path: &Path) -> Result<ParsedMasterSettings> {
        let contents = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read master settings file: {}", file_path.display()))?;

        self.parse(&contents)
            .with_context(|| format!("Failed to parse master settings file: {}", file_path.display()))
    }
}
