use anyhow::{bail, Context, Result};
use issue_manager::{
    agent::{self, ClaudeRunner},
    config::{self, GlobalConfig, MergedConfig, ProjectConfig},
    git::RealGitOps,
    logging,
    operations::RealProcessLauncher,
    storage::FileStore,
    tui,
};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let root = parse_root(std::env::args().skip(1))?;
    let root = root.canonicalize().unwrap_or(root);

    let global_config = GlobalConfig::load().unwrap_or_else(|e| {
        eprintln!("warning: {e:#}, using defaults");
        GlobalConfig::default()
    });
    let project_config = ProjectConfig::load(&root).unwrap_or_else(|e| {
        eprintln!("warning: {e:#}, using defaults");
        ProjectConfig::default()
    });
    let config = MergedConfig::merge(&global_config, &project_config);

    // Logging is optional; a read-only project still gets a session
    let _log_guard = match logging::init(&config::log_dir(&root), &config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e:#}");
            None
        }
    };

    let store = FileStore::new(&root);
    store
        .ensure_issues_dir()
        .context("Failed to prepare the issues directory")?;

    if !agent::is_available(&config.runner_command) {
        eprintln!(
            "warning: '{}' not found in PATH; analysis, planning and commit messages will fail",
            config.runner_command
        );
    }

    tracing::info!(root = %root.display(), "starting session");

    let runner = ClaudeRunner::new(config.runner_command.clone(), &root);
    let session = tui::Session::new(
        Arc::new(store),
        Arc::new(RealGitOps::new(&root)),
        Arc::new(runner),
        config,
        root,
    );

    let mut app = tui::App::new(session, Arc::new(RealProcessLauncher))?;
    app.run().await?;

    tracing::info!("session ended");
    Ok(())
}

/// `im [-p|--path <dir>]`, defaulting to the current directory
fn parse_root(mut args: impl Iterator<Item = String>) -> Result<PathBuf> {
    let mut root = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-p" | "--path" => match args.next() {
                Some(path) => root = Some(PathBuf::from(path)),
                None => bail!("{arg} requires a directory"),
            },
            "-h" | "--help" => {
                println!("usage: im [-p|--path <project dir>]");
                std::process::exit(0);
            }
            other => bail!("unexpected argument '{other}'"),
        }
    }
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to read the current directory"),
    }
}
