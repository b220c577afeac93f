//! 把 flatpage fixtures 安装到数据库

use anyhow::Result;
use tracing::{debug, info};

use super::{SyncEvent, SyncReport};
use crate::config::InstalledApp;
use crate::fixture::{parse_fixture_file, PageFields};
use crate::store::FlatPageStore;
use crate::utils::{dir_exists, list_dir_sorted};

/// 一个通过校验的 fixture 文件
pub struct FixtureEntry<'a> {
    pub app: &'a InstalledApp,
    /// 相对 `flatpages/` 的文件名，即记录的 path
    pub path: String,
    pub fields: PageFields,
    pub content: String,
}

// ═══════════════════════════════════════════════════════════════════
// 目录遍历
// ═══════════════════════════════════════════════════════════════════

/// 遍历每个应用的 flatpages 目录，解析每个文件
///
/// 警告写入 report；缺少必填字段的文件计入 `rejected` 并跳过，
/// 其余文件交给 `visit`。I/O 错误直接返回。
pub fn walk_fixtures<'a, F>(
    apps: &'a [InstalledApp],
    report: &mut SyncReport,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(FixtureEntry<'a>, &mut SyncReport) -> Result<()>,
{
    for app in apps {
        let dir = app.flatpages_dir();

        if !dir.exists() {
            debug!(app = %app.name, dir = %dir.display(), "no flatpages directory");
            continue;
        }
        if !dir_exists(&dir) {
            report.push(SyncEvent::NotADirectory { path: dir });
            continue;
        }

        report.push(SyncEvent::Processing { dir: dir.clone() });

        for file in list_dir_sorted(&dir)? {
            if !file.is_file() {
                report.push(SyncEvent::NotAFile { path: file });
                continue;
            }

            let parsed = parse_fixture_file(&file)?;
            for warning in &parsed.warnings {
                report.push(SyncEvent::Warning {
                    file: file.clone(),
                    warning: warning.clone(),
                });
            }

            let fields = match parsed.page_fields() {
                Some(fields) => fields,
                None => {
                    report.rejected += 1;
                    continue;
                }
            };

            let path = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            visit(
                FixtureEntry {
                    app,
                    path,
                    fields,
                    content: parsed.content,
                },
                report,
            )?;
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// load
// ═══════════════════════════════════════════════════════════════════

/// 把所有应用的 flatpage fixtures 写入数据库
///
/// 整次运行在一个事务中，全部处理完才提交；中途出错时事务被 drop 并回滚。
/// 被拒绝的文件不会影响已有记录。
pub fn load_flatpages(
    store: &mut FlatPageStore,
    apps: &[InstalledApp],
    site_id: i64,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    let tx = store.transaction()?;

    walk_fixtures(apps, &mut report, |entry, report| {
        let (mut page, created) = tx.get_or_create(&entry.app.name, &entry.path)?;

        page.apply(&entry.fields);
        page.content = entry.content;
        page.sites = vec![site_id];
        tx.save(&mut page)?;

        let (app, path) = (entry.app.name.clone(), entry.path);
        report.push(if created {
            SyncEvent::Created { app, path }
        } else {
            SyncEvent::Updated { app, path }
        });
        Ok(())
    })?;

    tx.commit()?;

    info!(
        created = report.created(),
        updated = report.updated(),
        rejected = report.rejected,
        "flatpage fixtures installed"
    );

    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════
// check (dry run)
// ═══════════════════════════════════════════════════════════════════

/// 只解析不写库，报告与 load 相同的警告
pub fn check_flatpages(apps: &[InstalledApp]) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    walk_fixtures(apps, &mut report, |entry, report| {
        report.push(SyncEvent::Checked {
            app: entry.app.name.clone(),
            path: entry.path,
        });
        Ok(())
    })?;

    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════
// 测试
// ═══════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Field, FixtureWarning};
    use crate::utils::write_file;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const ABOUT: &str = "<!-- url = /about/ -->\n<!-- title = About -->\n<h1>About</h1>\n";
    const NO_TITLE: &str = "<!-- url = /broken/ -->\n<p>Broken</p>\n";

    /// 创建 <root>/<dir>/src 与 <root>/<dir>/flatpages
    fn make_app(root: &Path, name: &str, dir: &str, files: &[(&str, &str)]) -> InstalledApp {
        let app_dir = root.join(dir);
        fs::create_dir_all(app_dir.join("src")).unwrap();
        for (file, content) in files {
            write_file(&app_dir.join("flatpages").join(file), content).unwrap();
        }
        InstalledApp::new(name, app_dir.join("src"))
    }

    #[test]
    fn test_load_valid_and_invalid_files() {
        let temp = TempDir::new().unwrap();
        let app = make_app(
            temp.path(),
            "example_project.app",
            "app",
            &[("about.html", ABOUT), ("broken.html", NO_TITLE)],
        );

        let mut store = FlatPageStore::open_in_memory().unwrap();
        let report = load_flatpages(&mut store, &[app], 1).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(report.created(), 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.warnings(), 1);
        assert!(report.events.contains(&SyncEvent::Warning {
            file: temp.path().join("app/flatpages/broken.html"),
            warning: FixtureWarning::MissingRequired { key: Field::Title },
        }));

        let page = store.get("example_project.app", "about.html").unwrap().unwrap();
        assert_eq!(page.url, "/about/");
        assert_eq!(page.title, "About");
        assert_eq!(page.content, ABOUT);
        assert_eq!(page.sites, vec![1]);
        assert!(!page.enable_comments);
    }

    #[test]
    fn test_load_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let app = make_app(temp.path(), "blog", "blog", &[("about.html", ABOUT)]);
        let apps = vec![app];

        let mut store = FlatPageStore::open_in_memory().unwrap();
        load_flatpages(&mut store, &apps, 1).unwrap();
        let first = store.list().unwrap();

        let report = load_flatpages(&mut store, &apps, 1).unwrap();
        let second = store.list().unwrap();

        assert_eq!(report.created(), 0);
        assert_eq!(report.updated(), 1);
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_load_updates_changed_fixture() {
        let temp = TempDir::new().unwrap();
        let app = make_app(temp.path(), "blog", "blog", &[("about.html", ABOUT)]);
        let apps = vec![app];

        let mut store = FlatPageStore::open_in_memory().unwrap();
        load_flatpages(&mut store, &apps, 1).unwrap();

        let updated = "# url = /about/\n# title = About us\n# enable_comments = True\n# remove_comments = True\nBody\n";
        write_file(&temp.path().join("blog/flatpages/about.html"), updated).unwrap();
        load_flatpages(&mut store, &apps, 2).unwrap();

        let page = store.get("blog", "about.html").unwrap().unwrap();
        assert_eq!(page.title, "About us");
        assert!(page.enable_comments);
        assert_eq!(page.content, "Body\n");
        assert_eq!(page.sites, vec![2]);
    }

    #[test]
    fn test_rejected_file_leaves_existing_record() {
        let temp = TempDir::new().unwrap();
        let app = make_app(temp.path(), "blog", "blog", &[("about.html", ABOUT)]);
        let apps = vec![app];

        let mut store = FlatPageStore::open_in_memory().unwrap();
        load_flatpages(&mut store, &apps, 1).unwrap();

        write_file(&temp.path().join("blog/flatpages/about.html"), NO_TITLE).unwrap();
        let report = load_flatpages(&mut store, &apps, 1).unwrap();

        assert_eq!(report.rejected, 1);
        let page = store.get("blog", "about.html").unwrap().unwrap();
        assert_eq!(page.title, "About");
        assert_eq!(page.content, ABOUT);
    }

    #[test]
    fn test_missing_and_non_directory_flatpages() {
        let temp = TempDir::new().unwrap();

        // 没有 flatpages 目录：静默跳过
        fs::create_dir_all(temp.path().join("quiet/src")).unwrap();
        let quiet = InstalledApp::new("quiet", temp.path().join("quiet/src"));

        // flatpages 是文件：警告并跳过
        fs::create_dir_all(temp.path().join("odd/src")).unwrap();
        write_file(&temp.path().join("odd/flatpages"), "not a dir").unwrap();
        let odd = InstalledApp::new("odd", temp.path().join("odd/src"));

        let mut store = FlatPageStore::open_in_memory().unwrap();
        let report = load_flatpages(&mut store, &[quiet, odd], 1).unwrap();

        assert_eq!(
            report.events,
            vec![SyncEvent::NotADirectory {
                path: temp.path().join("odd/flatpages"),
            }]
        );
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_subdirectory_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let app = make_app(temp.path(), "blog", "blog", &[("about.html", ABOUT)]);
        fs::create_dir_all(temp.path().join("blog/flatpages/drafts")).unwrap();

        let mut store = FlatPageStore::open_in_memory().unwrap();
        let report = load_flatpages(&mut store, &[app], 1).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert!(report.events.contains(&SyncEvent::NotAFile {
            path: temp.path().join("blog/flatpages/drafts"),
        }));
    }

    #[test]
    fn test_io_error_rolls_back_whole_run() {
        let temp = TempDir::new().unwrap();
        // about.html 在 zz.html 之前处理，随后读取非 UTF-8 文件失败
        let app = make_app(temp.path(), "blog", "blog", &[("about.html", ABOUT)]);
        fs::write(temp.path().join("blog/flatpages/zz.html"), [0xff, 0xfe, 0x00]).unwrap();

        let mut store = FlatPageStore::open_in_memory().unwrap();
        assert!(load_flatpages(&mut store, &[app], 1).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_check_does_not_write() {
        let temp = TempDir::new().unwrap();
        let app = make_app(
            temp.path(),
            "blog",
            "blog",
            &[("about.html", ABOUT), ("broken.html", NO_TITLE)],
        );

        let report = check_flatpages(&[app]).unwrap();
        assert_eq!(report.checked(), 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.warnings(), 1);
    }
}
