//! Fixture 文件解析器
//!
//! 一次扫描同时得到字段和内容

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use super::grammar::{comment_body, field_assignment, parse_bool};
use super::{Field, FieldValue, FixtureWarning, ParsedFixture};
use crate::utils::read_file;

/// 解析 fixture 文本
///
/// 顶部连续的注释行构成元数据块；`remove_comments = True` 时内容为去掉该块后的剩余部分，
/// 否则为完整文本。
pub fn parse_fixture(text: &str) -> ParsedFixture {
    let mut parsed = ParsedFixture::default();
    // 元数据块结束处的字节偏移
    let mut block_end = 0;

    for line in text.split_inclusive('\n') {
        let body = match comment_body(line) {
            Some(body) => body,
            None => break,
        };
        block_end += line.len();

        let (field, raw) = match field_assignment(body) {
            Some(assignment) => assignment,
            None => continue,
        };

        if parsed.fields.contains_key(&field) {
            parsed.warnings.push(FixtureWarning::Repeated { key: field });
        }

        let value = if field.is_boolean() {
            match parse_bool(raw) {
                Some(b) => FieldValue::Bool(b),
                None => {
                    parsed.warnings.push(FixtureWarning::InvalidBoolean {
                        key: field,
                        value: raw.to_string(),
                    });
                    FieldValue::Text(raw.to_string())
                }
            }
        } else {
            FieldValue::Text(raw.to_string())
        };

        parsed.fields.insert(field, value);
    }

    for field in Field::ALL.into_iter().filter(Field::is_required) {
        if !parsed.fields.contains_key(&field) {
            parsed
                .warnings
                .push(FixtureWarning::MissingRequired { key: field });
        }
    }

    let remove_comments = parsed
        .get(Field::RemoveComments)
        .and_then(FieldValue::as_bool)
        .unwrap_or(false);

    parsed.content = if remove_comments {
        text[block_end..].to_string()
    } else {
        text.to_string()
    };

    parsed
}

/// 读取并解析 fixture 文件
pub fn parse_fixture_file(path: &Path) -> Result<ParsedFixture> {
    let text = read_file(path)?;
    let parsed = parse_fixture(&text);
    debug!(
        file = %path.display(),
        fields = parsed.fields.len(),
        warnings = parsed.warnings.len(),
        "parsed flatpage fixture"
    );
    Ok(parsed)
}

// ═══════════════════════════════════════════════════════════════════
// 测试
// ═══════════════════════════════════════════════════════════════════
