//! Flat page fixture 解析模块
//!
//! 从文件顶部的注释块提取元数据，其余部分作为页面内容

pub mod grammar;
pub mod models;
pub mod parser;

// 重导出
pub use models::*;
pub use parser::*;
