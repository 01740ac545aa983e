// src/config_line.rs
use crate::error::{SettingsError, SettingsResult};

/// 组合分隔行的固定前缀
pub const COMBINATION_MARKER: &str = "#### COMBINATION";

/// 生成组合分隔行：`#### COMBINATION <n> ####`
pub fn marker_line(sequence: usize) -> String {
    format!("{} {} ####", COMBINATION_MARKER, sequence)
}

pub fn is_marker_line(line: &str) -> bool {
    line.contains(COMBINATION_MARKER)
}

/// 将一个参数编码为 `name: value` 行
///
/// 只接受能被 [`decode`] 原样读回的参数：参数名不能为空，不能含冒号、换行或组合分隔标记；
/// 参数值不能含换行或分隔标记，也不能带首尾空白（读取时会被去掉）。
pub fn encode(name: &str, value: &str) -> SettingsResult<String> {
    if name.is_empty()
        || name.contains(':')
        || name.contains(['\n', '\r'])
        || name.contains(COMBINATION_MARKER)
    {
        return Err(SettingsError::InvalidKey(name.to_string()));
    }
    let invalid = |reason: &'static str| SettingsError::InvalidValue { key: name.to_string(), reason };
    if value.contains(['\n', '\r']) {
        return Err(invalid("values must not contain line breaks"));
    }
    if value.contains(COMBINATION_MARKER) {
        return Err(invalid("values must not contain the combination marker"));
    }
    if value.trim() != value {
        return Err(invalid("values must not have leading or trailing whitespace"));
    }
    Ok(format!("{}: {}", name, value))
}

/// 解析 `name: value` 行，只在第一个冒号处切分
///
/// 参数值去除首尾空白；参数名保持原样，前后带空白的键视为不同的键。
pub fn decode(line: &str) -> SettingsResult<(String, String)> {
    let (name, value) = line.split_once(':').ok_or_else(|| SettingsError::MalformedLine {
        line: 0,
        content: line.to_string(),
    })?;
    Ok((name.to_string(), value.trim().to_string()))
}

/// 与 [`decode`] 相同，但在错误中记录行号（1-based）
pub fn decode_at(line: &str, line_number: usize) -> SettingsResult<(String, String)> {
    decode(line).map_err(|err| match err {
        SettingsError::MalformedLine { content, .. } => SettingsError::MalformedLine {
            line: line_number,
            content,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode("dim", "50").unwrap(), "dim: 50");
        assert_eq!(encode("input", "").unwrap(), "input: ");
    }

    #[test]
    fn test_encode_rejects_bad_keys() {
        assert!(matches!(encode("", "1"), Err(SettingsError::InvalidKey(_))));
        assert!(matches!(encode("a:b", "1"), Err(SettingsError::InvalidKey(_))));
        assert!(matches!(encode("a\nb", "1"), Err(SettingsError::InvalidKey(_))));
        assert!(matches!(encode("lr", "0.1\n"), Err(SettingsError::InvalidValue { .. })));
    }

    #[test]
    fn test_encode_rejects_marker() {
        assert!(matches!(
            encode("label", "#### COMBINATION"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            encode("#### COMBINATION 2 ####", "1"),
            Err(SettingsError::InvalidKey(_))
        ));
        // 被接受的行不会被当作分隔行读回
        assert!(!is_marker_line(&encode("label", "#### combination").unwrap()));
    }

    #[test]
    fn test_encode_rejects_surrounding_whitespace() {
        for value in ["data/train.txt ", " data/train.txt", "\tdata/train.txt"] {
            match encode("input", value) {
                Err(SettingsError::InvalidValue { key, reason }) => {
                    assert_eq!(key, "input");
                    assert!(reason.contains("whitespace"));
                }
                other => panic!("unexpected result for {:?}: {:?}", value, other),
            }
        }
        // 内部空白可以无损读回
        let line = encode("label", "a b").unwrap();
        assert_eq!(decode(&line).unwrap(), ("label".to_string(), "a b".to_string()));
    }

    #[test]
    fn test_decode_splits_on_first_colon() {
        let (name, value) = decode("input: C:/data/train.txt").unwrap();
        assert_eq!(name, "input");
        assert_eq!(value, "C:/data/train.txt");
    }

    #[test]
    fn test_decode_trims_value_not_name() {
        let (name, value) = decode(" dim :   50  ").unwrap();
        assert_eq!(name, " dim ");
        assert_eq!(value, "50");
    }

    #[test]
    fn test_decode_without_colon() {
        assert!(matches!(decode("cbow"), Err(SettingsError::MalformedLine { line: 0, .. })));
        assert!(matches!(decode_at("cbow", 7), Err(SettingsError::MalformedLine { line: 7, .. })));
    }

    #[test]
    fn test_marker_line() {
        assert_eq!(marker_line(3), "#### COMBINATION 3 ####");
        assert!(is_marker_line(&marker_line(42)));
        assert!(!is_marker_line("model_type: cbow"));
    }
}
