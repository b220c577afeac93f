//! Flat page 同步模块
//!
//! 扫描每个应用的 `flatpages/` 目录，把 fixture 写入数据库

pub mod loader;
pub mod report;

// 重导出
pub use loader::*;
pub use report::*;
