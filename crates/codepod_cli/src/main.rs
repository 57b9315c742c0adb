//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `codepod_core` linkage and the configured database.
//! - Print a short summary of the `demo` repository and persisted keys.

use codepod_core::db::open_db;
use codepod_core::{
    init_logging, CoreConfig, RepoKey, RepoRegistry, SqliteRecordRepository, StaticUserDirectory,
};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("codepod_core ping={}", codepod_core::ping());
    println!("codepod_core version={}", codepod_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("codepod_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let store = SqliteRecordRepository::new(open_db(&config.db_path)?);
    let registry = RepoRegistry::new(Arc::new(store), Arc::new(StaticUserDirectory::seeded()));
    println!("db_path={}", config.db_path.display());

    let demo = registry.handle(&RepoKey::new("demo")?)?;
    println!(
        "repo={} issues={} commits={} files={}",
        demo.key(),
        demo.get_issues()?.len(),
        demo.get_commits()?.len(),
        demo.list_file_paths()?.len()
    );
    for issue in demo.get_issues()? {
        println!("issue={} status={}", issue.id, issue.status.as_str());
    }

    for key in registry.persisted_keys()? {
        println!("persisted_key={key}");
    }
    Ok(())
}
