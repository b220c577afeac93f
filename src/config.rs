//! 配置
//!
//! 从 YAML 设置文件加载数据库路径、默认站点和已安装应用列表。
//!
//! 设置文件查找顺序：
//! 1. `--settings <path>`
//! 2. `FLATPAGES_SETTINGS` 环境变量
//! 3. 当前目录下的 `flatpages.yaml`
//!
//! `FLATPAGES_DATABASE` / `FLATPAGES_SITE_ID` 环境变量覆盖文件中的值。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::{file_exists, read_yaml};

pub const DEFAULT_SETTINGS_FILE: &str = "flatpages.yaml";
pub const SETTINGS_ENV: &str = "FLATPAGES_SETTINGS";
pub const DATABASE_ENV: &str = "FLATPAGES_DATABASE";
pub const SITE_ID_ENV: &str = "FLATPAGES_SITE_ID";

/// 已安装的应用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    /// 应用名，作为记录主键的一部分
    pub name: String,

    /// 应用代码位置（模块文件或目录）
    pub path: PathBuf,
}

impl InstalledApp {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// `flatpages/` 目录，与代码位置同级
    pub fn flatpages_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("flatpages")
    }
}

/// 设置文件内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite 数据库文件
    pub database: PathBuf,

    /// 写入每个页面的默认站点
    pub site_id: i64,

    pub installed_apps: Vec<InstalledApp>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("flatpages.db"),
            site_id: 1,
            installed_apps: Vec::new(),
        }
    }
}

impl Settings {
    /// 按查找顺序加载设置，并应用环境变量覆盖
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit);

        if !file_exists(&path) {
            if explicit.is_some() || env::var_os(SETTINGS_ENV).is_some() {
                bail!("Settings file not found: {}", path.display());
            }
            bail!(
                "No {} found in the current directory. Run 'fileflatpages init' first.",
                DEFAULT_SETTINGS_FILE
            );
        }

        let mut settings = Self::from_file(&path)?;
        settings.apply_env()?;
        Ok(settings)
    }

    /// 读取设置文件，相对路径以设置文件所在目录为基准
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Settings = read_yaml(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        debug!(settings = %path.display(), apps = settings.installed_apps.len(), "loaded settings");
        Ok(settings.rebase(base_dir))
    }

    fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(path) = env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_SETTINGS_FILE)
    }

    fn rebase(mut self, base_dir: &Path) -> Self {
        self.database = base_dir.join(&self.database);
        for app in &mut self.installed_apps {
            app.path = base_dir.join(&app.path);
        }
        self
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(database) = env::var_os(DATABASE_ENV) {
            self.database = PathBuf::from(database);
        }
        if let Ok(site_id) = env::var(SITE_ID_ENV) {
            self.site_id = site_id
                .trim()
                .parse()
                .with_context(|| format!("{} must be an integer, got '{}'", SITE_ID_ENV, site_id))?;
        }
        Ok(())
    }
}
