//! 工具模块
//!
//! 提供文件系统、YAML 等常用工具函数

pub mod fs;
pub mod yaml;

// 重导出
pub use fs::*;
pub use yaml::*;
