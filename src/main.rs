use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fileflatpages::{
    check_flatpages, config::DEFAULT_SETTINGS_FILE, load_flatpages, utils::write_yaml,
    FlatPageStore, InstalledApp, Settings, SyncReport,
};

/// File Flat Pages CLI
///
/// 从文件安装 flat page fixtures 到数据库
#[derive(Parser)]
#[command(name = "fileflatpages")]
#[command(author, version = env!("APP_VERSION"), about)]
#[command(
    long_about = "Installs flat page fixtures stored as files in each application's flatpages/ \
                  directory into the database.\n\
                  Metadata is read from the comment lines at the top of each file."
)]
struct Cli {
    /// 设置文件路径（默认：$FLATPAGES_SETTINGS 或 ./flatpages.yaml）
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// 覆盖设置中的数据库路径
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// 日志详细程度（-v, -vv, -vvv）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 创建初始设置文件
    Init {
        /// 强制覆盖已存在的设置文件
        #[arg(short, long)]
        force: bool,
    },

    /// 安装 flatpage fixtures 到数据库
    Load,

    /// 只检查 fixtures，不写数据库
    Check,

    /// 列出数据库中的 flatpages
    List,
}

// ═══════════════════════════════════════════════════════════════════
// 日志
// ═══════════════════════════════════════════════════════════════════

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

// ═══════════════════════════════════════════════════════════════════
// init
// ═══════════════════════════════════════════════════════════════════

fn init_settings(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE), Path::to_path_buf);

    if path.exists() && !force {
        println!(
            "{}",
            format!("⚠️  {} already exists (use --force to overwrite)", path.display()).yellow()
        );
        return Ok(());
    }

    let settings = Settings {
        installed_apps: vec![InstalledApp::new("app", "app/src")],
        ..Settings::default()
    };
    write_yaml(&path, &settings)?;

    println!("{} Created {}", "✓".green(), path.display().to_string().cyan());
    println!(
        "💡 Put fixtures in {} and run {}",
        "app/flatpages/".cyan(),
        "fileflatpages load".cyan()
    );

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// load / check
// ═══════════════════════════════════════════════════════════════════

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    if let Some(database) = &cli.database {
        settings.database = database.clone();
    }
    Ok(settings)
}

fn print_report(report: &SyncReport) {
    for event in &report.events {
        if event.is_warning() {
            println!("{}", event.to_string().yellow());
        } else {
            println!("{}", event);
        }
    }
}

fn load(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut store = FlatPageStore::open(&settings.database)?;

    let report = load_flatpages(&mut store, &settings.installed_apps, settings.site_id)?;
    print_report(&report);

    println!();
    println!(
        "{} {} created, {} updated, {} rejected",
        "✓".green(),
        report.created().to_string().green(),
        report.updated().to_string().cyan(),
        report.rejected.to_string().yellow()
    );

    Ok(())
}

fn check(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;

    let report = check_flatpages(&settings.installed_apps)?;
    print_report(&report);

    println!();
    if report.warnings() == 0 {
        println!("{} {} fixtures OK", "✓".green(), report.checked());
    } else {
        println!(
            "{} {} fixtures OK, {} warnings, {} rejected",
            "!".yellow(),
            report.checked(),
            report.warnings().to_string().yellow(),
            report.rejected.to_string().red()
        );
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// list
// ═══════════════════════════════════════════════════════════════════

fn list(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let store = FlatPageStore::open(&settings.database)?;
    let pages = store.list()?;

    if pages.is_empty() {
        println!("No flatpages found.");
        println!("💡 Tip: Run {} to install fixtures.", "fileflatpages load".cyan());
        return Ok(());
    }

    for page in &pages {
        let sites: Vec<String> = page.sites.iter().map(|s| s.to_string()).collect();
        println!(
            "  {} {} {} ({}/{}) [sites: {}]",
            "•".green(),
            page.url.yellow(),
            page.title,
            page.app.cyan(),
            page.path,
            sites.join(", ")
        );
    }

    println!();
    println!("{} {} flatpages", "✓".green(), pages.len());

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { force } => init_settings(cli.settings.as_deref(), force),
        Commands::Load => load(&cli),
        Commands::Check => check(&cli),
        Commands::List => list(&cli),
    }
}
