//! Fixture 数据模型
//!
//! 定义 Field, FieldValue, FixtureWarning, ParsedFixture 等数据结构

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// 可识别的字段名
///
/// `RemoveComments` 是解析指令，不会写入页面记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Url,
    Title,
    EnableComments,
    TemplateName,
    RegistrationRequired,
    RemoveComments,
}

impl Field {
    /// 所有字段，顺序即 grammar 中 alternation 的顺序
    pub const ALL: [Field; 6] = [
        Field::Url,
        Field::Title,
        Field::EnableComments,
        Field::TemplateName,
        Field::RegistrationRequired,
        Field::RemoveComments,
    ];

    /// 必填字段
    pub const REQUIRED: [Field; 2] = [Field::Url, Field::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Title => "title",
            Field::EnableComments => "enable_comments",
            Field::TemplateName => "template_name",
            Field::RegistrationRequired => "registration_required",
            Field::RemoveComments => "remove_comments",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.as_str() == name)
    }

    pub fn is_required(&self) -> bool {
        Field::REQUIRED.contains(self)
    }

    /// 布尔字段只接受 `True` / `False`
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            Field::EnableComments | Field::RegistrationRequired | Field::RemoveComments
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 字段值
///
/// 布尔字段的值不合法时保留原始字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(true) => f.write_str("True"),
            FieldValue::Bool(false) => f.write_str("False"),
        }
    }
}

/// 解析过程中产生的非致命问题
///
/// 只有 `MissingRequired` 会导致文件被拒绝
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureWarning {
    #[error("Key '{key}' is repeated")]
    Repeated { key: Field },

    #[error("Key '{key}' expects True or False but got '{value}'")]
    InvalidBoolean { key: Field, value: String },

    #[error("Key '{key}' is required but missing")]
    MissingRequired { key: Field },
}

/// 单个 fixture 文件的解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFixture {
    /// 元数据块中识别到的字段
    pub fields: BTreeMap<Field, FieldValue>,

    /// 页面内容（完整文件，或去掉元数据块后的剩余部分）
    pub content: String,

    pub warnings: Vec<FixtureWarning>,
}

impl ParsedFixture {
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// 缺少必填字段时为 true，此时不应写入任何记录
    pub fn is_rejected(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, FixtureWarning::MissingRequired { .. }))
    }

    /// 映射到页面字段；文件被拒绝时返回 None
    pub fn page_fields(&self) -> Option<PageFields> {
        if self.is_rejected() {
            return None;
        }

        let text = |field: Field| {
            self.get(field)
                .and_then(FieldValue::as_text)
                .map(str::to_string)
        };
        let flag = |field: Field| self.get(field).and_then(FieldValue::as_bool);

        Some(PageFields {
            url: text(Field::Url)?,
            title: text(Field::Title)?,
            enable_comments: flag(Field::EnableComments),
            template_name: text(Field::TemplateName),
            registration_required: flag(Field::RegistrationRequired),
        })
    }
}

/// 写入页面记录的字段
///
/// `None` 表示文件中没有该字段（或布尔值不合法），保留记录原值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFields {
    pub url: String,
    pub title: String,
    pub enable_comments: Option<bool>,
    pub template_name: Option<String>,
    pub registration_required: Option<bool>,
}
