//! YAML 工具

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::{read_file, write_file};

/// 读取 YAML 文件
pub fn read_yaml<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = read_file(path)?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
}

/// 写入 YAML 文件
pub fn write_yaml<T>(path: &Path, data: &T) -> Result<()>
where
    T: Serialize,
{
    let yaml = serde_yaml::to_string(data).context("Failed to serialize to YAML")?;

    write_file(path, &yaml).with_context(|| format!("Failed to write YAML file: {}", path.display()))
}
