// File Flat Pages - Library Root
//
// 从每个应用的 flatpages/ 目录加载 flat page fixtures 到数据库

pub mod config;
pub mod fixture;
pub mod store;
pub mod sync;
pub mod utils;

// 重新导出常用类型
pub use config::{InstalledApp, Settings};
pub use fixture::{parse_fixture, parse_fixture_file, ParsedFixture};
pub use store::{FlatPageStore, StoredFlatPage};
pub use sync::{check_flatpages, load_flatpages, SyncEvent, SyncReport};
