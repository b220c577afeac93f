//! 同步结果与诊断输出

use std::fmt;
use std::path::PathBuf;

use crate::fixture::FixtureWarning;

/// 同步过程中的一条诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// 开始处理某个 flatpages 目录
    Processing { dir: PathBuf },

    /// flatpages 存在但不是目录
    NotADirectory { path: PathBuf },

    /// 目录条目不是普通文件
    NotAFile { path: PathBuf },

    /// 解析警告
    Warning { file: PathBuf, warning: FixtureWarning },

    Created { app: String, path: String },
    Updated { app: String, path: String },

    /// dry run 中通过校验的文件
    Checked { app: String, path: String },
}

impl SyncEvent {
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SyncEvent::NotADirectory { .. } | SyncEvent::NotAFile { .. } | SyncEvent::Warning { .. }
        )
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::Processing { dir } => {
                write!(f, "Processing flatpage fixtures in {}", dir.display())
            }
            SyncEvent::NotADirectory { path } => {
                write!(f, "WARNING: {} is not a directory", path.display())
            }
            SyncEvent::NotAFile { path } => write!(f, "WARNING: {} is not a file", path.display()),
            SyncEvent::Warning { file, warning } => match warning {
                FixtureWarning::Repeated { .. } => {
                    write!(f, "WARNING: {} in file {}", warning, file.display())
                }
                _ => write!(f, "WARNING: {} in {}", warning, file.display()),
            },
            SyncEvent::Created { app, path } => {
                write!(f, "Added flatpage fixture {} from {}", path, app)
            }
            SyncEvent::Updated { app, path } => {
                write!(f, "Updated flatpage fixture {} from {}", path, app)
            }
            SyncEvent::Checked { app, path } => {
                write!(f, "Checked flatpage fixture {} from {}", path, app)
            }
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub events: Vec<SyncEvent>,

    /// 因缺少必填字段被跳过的文件数
    pub rejected: usize,
}

impl SyncReport {
    pub fn push(&mut self, event: SyncEvent) {
        self.events.push(event);
    }

    pub fn created(&self) -> usize {
        self.count(|e| matches!(e, SyncEvent::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|e| matches!(e, SyncEvent::Updated { .. }))
    }

    pub fn checked(&self) -> usize {
        self.count(|e| matches!(e, SyncEvent::Checked { .. }))
    }

    pub fn warnings(&self) -> usize {
        self.count(SyncEvent::is_warning)
    }

    fn count(&self, predicate: impl Fn(&SyncEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Field;

    #[test]
    fn test_event_lines() {
        let event = SyncEvent::Warning {
            file: PathBuf::from("app/flatpages/about.html"),
            warning: FixtureWarning::MissingRequired { key: Field::Title },
        };
        assert_eq!(
            event.to_string(),
            "WARNING: Key 'title' is required but missing in app/flatpages/about.html"
        );
        assert!(event.is_warning());

        let event = SyncEvent::Created {
            app: "example_project.app".to_string(),
            path: "about.html".to_string(),
        };
        assert_eq!(
            event.to_string(),
            "Added flatpage fixture about.html from example_project.app"
        );
        assert!(!event.is_warning());
    }

    #[test]
    fn test_repeated_key_line() {
        let event = SyncEvent::Warning {
            file: PathBuf::from("app/flatpages/about.html"),
            warning: FixtureWarning::Repeated { key: Field::Title },
        };
        assert_eq!(
            event.to_string(),
            "WARNING: Key 'title' is repeated in file app/flatpages/about.html"
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = SyncReport::default();
        report.push(SyncEvent::Processing {
            dir: PathBuf::from("app/flatpages"),
        });
        report.push(SyncEvent::Created {
            app: "a".to_string(),
            path: "x".to_string(),
        });
        report.push(SyncEvent::Updated {
            app: "a".to_string(),
            path: "y".to_string(),
        });
        report.push(SyncEvent::NotAFile {
            path: PathBuf::from("app/flatpages/sub"),
        });

        assert_eq!(report.created(), 1);
        assert_eq!(report.updated(), 1);
        assert_eq!(report.warnings(), 1);
        assert_eq!(report.checked(), 0);
    }
}
