use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use sync_no_ci::config::appsettings::{self, AppSettings};
use sync_no_ci::dispatch::{self, Platform};
use sync_no_ci::terminal::TerminalManager;
use sync_no_ci::{util, workspace};

#[derive(Parser, Debug)]
#[command(
    name = "sync-no-ci",
    about = "Run a workspace's sync script (no CI build) in a fresh terminal"
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run scripts/sync-no-ci.{sh,ps1} from the current workspace in a new terminal
    Sync {
        /// Workspace root to use for this run instead of the registry
        #[arg(long)]
        root: Option<String>,
    },
    /// Register a workspace root and make it current
    Open { path: PathBuf },
    /// Unregister a workspace root
    Close { path: PathBuf },
    /// Show registered workspace roots
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = util::data_dir()?;
    fs::create_dir_all(&data_dir)?;

    let (app_settings, app_settings_path) = appsettings::load_app_settings(&data_dir)?;
    if !app_settings_path.exists() {
        appsettings::save_app_settings(&data_dir, &app_settings).ok();
    }

    match cli.command {
        Cmd::Sync { root } => run_sync(&data_dir, &app_settings, root),
        Cmd::Open { path } => open_workspace(&data_dir, &path),
        Cmd::Close { path } => close_workspace(&data_dir, &path),
        Cmd::List => list_workspaces(&data_dir),
    }
}

fn run_sync(data_dir: &Path, settings: &AppSettings, root_override: Option<String>) -> anyhow::Result<()> {
    let root = match root_override {
        Some(root) => root,
        None => {
            let registry = workspace::load(data_dir)?;
            match registry.first_root() {
                Ok(root) => root.to_string(),
                Err(err) => {
                    eprintln!("Error: {}", err);
                    std::process::exit(1);
                }
            }
        }
    };

    let terminal = TerminalManager::new(settings.terminal.r#type.clone());
    match dispatch::dispatch(&root, Platform::host(), &terminal) {
        Ok(res) => {
            println!("Workspace: {}", util::display_path(&res.root));
            println!("Terminal: {}", res.label);
            println!("Submitted: {}", res.command);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn open_workspace(data_dir: &Path, path: &Path) -> anyhow::Result<()> {
    // Only existing directories can become workspaces; the sync script
    // itself is still never checked.
    let absolute = fs::canonicalize(path)
        .map_err(|err| anyhow::anyhow!("cannot open {}: {}", path.display(), err))?;
    let root = absolute.to_string_lossy().to_string();

    let mut registry = workspace::load(data_dir)?;
    registry.open(&root);
    workspace::save(data_dir, &registry)?;

    println!("Opened workspace: {}", util::display_path(&absolute));
    Ok(())
}

fn close_workspace(data_dir: &Path, path: &Path) -> anyhow::Result<()> {
    // Match the registered form when the directory still exists, the given
    // form otherwise (the root may have been deleted since it was opened).
    let root = fs::canonicalize(path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string());

    let mut registry = workspace::load(data_dir)?;
    if !registry.close(&root) {
        eprintln!("Error: workspace not open: {}", root);
        std::process::exit(1);
    }
    workspace::save(data_dir, &registry)?;

    println!("Closed workspace: {}", root);
    Ok(())
}

fn list_workspaces(data_dir: &Path) -> anyhow::Result<()> {
    let registry = workspace::load(data_dir)?;
    if registry.workspaces.is_empty() {
        println!("No workspaces open.");
        return Ok(());
    }

    for (idx, entry) in registry.workspaces.iter().enumerate() {
        let marker = if idx == 0 { "*" } else { " " };
        println!(
            "{} {}  (opened {})",
            marker,
            util::display_path(&entry.path),
            entry.opened_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}
