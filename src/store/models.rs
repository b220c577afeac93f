//! 持久化数据模型

use crate::fixture::PageFields;

/// 数据库中的一条页面记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFlatPage {
    /// 尚未保存的记录为 None
    pub id: Option<i64>,
    pub app: String,
    pub path: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub enable_comments: bool,
    pub template_name: String,
    pub registration_required: bool,
    pub sites: Vec<i64>,
}

impl StoredFlatPage {
    /// 新建空记录
    pub fn new(app: &str, path: &str) -> Self {
        Self {
            id: None,
            app: app.to_string(),
            path: path.to_string(),
            url: String::new(),
            title: String::new(),
            content: String::new(),
            enable_comments: false,
            template_name: String::new(),
            registration_required: false,
            sites: Vec::new(),
        }
    }

    /// 把解析出的字段写到记录上，文件中没有的可选字段保留原值
    pub fn apply(&mut self, fields: &PageFields) {
        self.url = fields.url.clone();
        self.title = fields.title.clone();

        if let Some(enable_comments) = fields.enable_comments {
            self.enable_comments = enable_comments;
        }
        if let Some(template_name) = &fields.template_name {
            self.template_name = template_name.clone();
        }
        if let Some(registration_required) = fields.registration_required {
            self.registration_required = registration_required;
        }
    }
}
