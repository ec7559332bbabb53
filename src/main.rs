use clap::Parser;
use taskbook::planner;
use taskbook::planner::storage::FileStorage;
use taskbook::planner::store::Store;
use taskbook::settings::Settings;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Terminal notebook for personal tasks
#[derive(Debug, Parser)]
#[command(name = "taskbook", version, about)]
struct Cli {
    /// Directory holding the task file (overrides config and environment)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Config file to read instead of the per-user default
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    init_logging(&settings);
    tracing::info!(data_dir = %settings.data_dir.display(), key = %settings.storage_key, "starting taskbook");

    let storage = FileStorage::new(&settings.data_dir);
    let mut store = Store::load_with_key(storage, &settings.storage_key);

    planner::ui::run_planner(&mut store)?;

    tracing::info!(
        total = store.len(),
        completed = store.completed_count(),
        "session ended"
    );
    println!("👋 Goodbye!");
    Ok(())
}

/// The terminal belongs to the planner, so logs go to a file in the data dir.
fn init_logging(settings: &Settings) {
    let log_file = settings.log_file();

    let file = fs::create_dir_all(&settings.data_dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
    });

    let file = match file {
        Ok(f) => f,
        Err(e) => {
            eprintln!("⚠️  Warning: logging disabled, could not open {}: {}", log_file.display(), e);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["taskbook", "--data-dir", "/tmp/notes", "--config", "c.toml"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/notes")));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));

        let cli = Cli::parse_from(["taskbook"]);
        assert!(cli.data_dir.is_none());
        assert!(cli.config.is_none());
    }
}
