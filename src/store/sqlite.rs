//! SQLite 存储实现

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use tracing::debug;

use super::StoredFlatPage;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS flatpages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    app TEXT NOT NULL,
    path TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    enable_comments INTEGER NOT NULL DEFAULT 0,
    template_name TEXT NOT NULL DEFAULT '',
    registration_required INTEGER NOT NULL DEFAULT 0,
    UNIQUE (app, path)
);

CREATE TABLE IF NOT EXISTS flatpage_sites (
    flatpage_id INTEGER NOT NULL,
    site_id INTEGER NOT NULL,
    PRIMARY KEY (flatpage_id, site_id),
    FOREIGN KEY (flatpage_id) REFERENCES flatpages(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_flatpages_url ON flatpages(url);
"#;

const SELECT_PAGE: &str = "SELECT id, app, path, url, title, content, enable_comments, \
                           template_name, registration_required FROM flatpages";

/// 页面存储
pub struct FlatPageStore {
    connection: Connection,
}

impl FlatPageStore {
    /// 打开（或创建）数据库文件并初始化表结构
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let connection = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        debug!(database = %path.display(), "opened flatpage database");
        Self::with_connection(connection)
    }

    /// 内存数据库，用于测试和 dry run
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        connection
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize flatpage schema")?;
        Ok(Self { connection })
    }

    /// 开启显式事务；提交前 drop 会回滚
    pub fn transaction(&mut self) -> Result<StoreTransaction<'_>> {
        let tx = self
            .connection
            .transaction()
            .context("Failed to start flatpage transaction")?;
        Ok(StoreTransaction { tx })
    }

    pub fn get(&self, app: &str, path: &str) -> Result<Option<StoredFlatPage>> {
        find_page(&self.connection, app, path)
    }

    /// 所有页面，按 (app, path) 排序
    pub fn list(&self) -> Result<Vec<StoredFlatPage>> {
        let mut statement = self
            .connection
            .prepare(&format!("{} ORDER BY app, path", SELECT_PAGE))
            .context("Failed to prepare flatpage listing")?;

        let pages = statement
            .query_map([], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to list flatpages")?;

        pages
            .into_iter()
            .map(|page| with_sites(&self.connection, page))
            .collect()
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM flatpages", [], |row| row.get(0))
            .context("Failed to count flatpages")?;
        Ok(count as usize)
    }
}

/// 一次 load 运行中的事务
pub struct StoreTransaction<'a> {
    tx: Transaction<'a>,
}

impl StoreTransaction<'_> {
    /// 查找记录，不存在时返回新的空记录；bool 表示是否新建
    pub fn get_or_create(&self, app: &str, path: &str) -> Result<(StoredFlatPage, bool)> {
        match find_page(&self.tx, app, path)? {
            Some(page) => Ok((page, false)),
            None => Ok((StoredFlatPage::new(app, path), true)),
        }
    }

    /// 插入或更新记录，并替换站点关联；返回记录 id
    pub fn save(&self, page: &mut StoredFlatPage) -> Result<i64> {
        let id = match page.id {
            Some(id) => {
                self.tx
                    .execute(
                        "UPDATE flatpages SET
                            url = ?1,
                            title = ?2,
                            content = ?3,
                            enable_comments = ?4,
                            template_name = ?5,
                            registration_required = ?6
                         WHERE id = ?7",
                        params![
                            page.url,
                            page.title,
                            page.content,
                            page.enable_comments,
                            page.template_name,
                            page.registration_required,
                            id,
                        ],
                    )
                    .with_context(|| {
                        format!("Failed to update flatpage {} from {}", page.path, page.app)
                    })?;
                id
            }
            None => {
                self.tx
                    .execute(
                        "INSERT INTO flatpages (
                            app,
                            path,
                            url,
                            title,
                            content,
                            enable_comments,
                            template_name,
                            registration_required
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            page.app,
                            page.path,
                            page.url,
                            page.title,
                            page.content,
                            page.enable_comments,
                            page.template_name,
                            page.registration_required,
                        ],
                    )
                    .with_context(|| {
                        format!("Failed to insert flatpage {} from {}", page.path, page.app)
                    })?;
                self.tx.last_insert_rowid()
            }
        };

        self.tx
            .execute(
                "DELETE FROM flatpage_sites WHERE flatpage_id = ?1",
                params![id],
            )
            .context("Failed to clear flatpage sites")?;

        for site_id in &page.sites {
            self.tx
                .execute(
                    "INSERT OR IGNORE INTO flatpage_sites (flatpage_id, site_id) VALUES (?1, ?2)",
                    params![id, site_id],
                )
                .with_context(|| format!("Failed to attach site {} to flatpage {}", site_id, id))?;
        }

        page.id = Some(id);
        Ok(id)
    }

    pub fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .context("Failed to commit flatpage transaction")
    }
}

// ═══════════════════════════════════════════════════════════════════
// 辅助函数
// ═══════════════════════════════════════════════════════════════════

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<StoredFlatPage> {
    Ok(StoredFlatPage {
        id: Some(row.get(0)?),
        app: row.get(1)?,
        path: row.get(2)?,
        url: row.get(3)?,
        title: row.get(4)?,
        content: row.get(5)?,
        enable_comments: row.get(6)?,
        template_name: row.get(7)?,
        registration_required: row.get(8)?,
        sites: Vec::new(),
    })
}

fn find_page(connection: &Connection, app: &str, path: &str) -> Result<Option<StoredFlatPage>> {
    let page = connection
        .query_row(
            &format!("{} WHERE app = ?1 AND path = ?2", SELECT_PAGE),
            params![app, path],
            page_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to look up flatpage {} from {}", path, app))?;

    page.map(|page| with_sites(connection, page)).transpose()
}

fn with_sites(connection: &Connection, mut page: StoredFlatPage) -> Result<StoredFlatPage> {
    let mut statement = connection
        .prepare("SELECT site_id FROM flatpage_sites WHERE flatpage_id = ?1 ORDER BY site_id")
        .context("Failed to prepare site lookup")?;

    let id = page.id;
    page.sites = statement
        .query_map(params![id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<i64>>>()
        .context("Failed to load flatpage sites")?;

    Ok(page)
}
