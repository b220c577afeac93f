//! 页面持久化模块
//!
//! SQLite 存储，页面以 (app, path) 唯一标识

pub mod models;
pub mod sqlite;

// 重导出
pub use models::*;
pub use sqlite::*;
