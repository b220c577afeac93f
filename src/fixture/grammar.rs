//! 元数据注释语法
//!
//! 一行元数据注释的结构：
//!
//! ```text
//! comment_line := PREFIX BODY SUFFIX?
//! PREFIX       := "#" | ".." | "<!--" | "<!---" | "//"
//! SUFFIX       := "-->" | "--->"
//! BODY         := WS* FIELD WS* SEPARATOR VALUE     (字段行)
//!               | 任意文本                          (普通注释，忽略)
//! FIELD        := "url" | "title" | "enable_comments" | "template_name"
//!               | "registration_required" | "remove_comments"
//! SEPARATOR    := "=" | ":"
//! VALUE        := 行内剩余文本，去掉首尾空白
//! ```
//!
//! 元数据块必须从文件第一行开始且连续，遇到第一行非注释即结束。

use lazy_static::lazy_static;
use regex::Regex;

use super::Field;

lazy_static! {
    // 注释行：前缀 + 内容 + 可选的 HTML 注释结尾
    static ref COMMENT_LINE: Regex = Regex::new(r"^(#|\.\.|<!---?|//)(.*?)(-?-->)?$").unwrap();

    // 字段行：字段名 + 分隔符 + 值
    static ref FIELD_LINE: Regex = {
        let names: Vec<&str> = Field::ALL.iter().map(|f| f.as_str()).collect();
        Regex::new(&format!(r"^\s*({})\s*(?:=|:)(.*)$", names.join("|"))).unwrap()
    };
}

/// 去掉行尾换行符
fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// 匹配注释行，返回注释内容（不含前缀和后缀）
///
/// 非注释行返回 None
pub fn comment_body(line: &str) -> Option<&str> {
    COMMENT_LINE
        .captures(strip_line_ending(line))
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
}

/// 匹配字段表达式，返回字段和去掉首尾空白的值
pub fn field_assignment(body: &str) -> Option<(Field, &str)> {
    let caps = FIELD_LINE.captures(body)?;
    let field = Field::from_name(caps.get(1)?.as_str())?;
    let value = caps.get(2).map_or("", |m| m.as_str()).trim();
    Some((field, value))
}

/// 解析布尔字面量，只接受 `True` 和 `False`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "True" => Some(true),
        "False" => Some(false),
        _ => None,
    }
}
