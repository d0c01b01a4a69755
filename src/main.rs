use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use worklog_sync::{build_engine, Backend, ConfigManager, SecretsManager, SyncError, Worklog};

#[derive(Parser)]
#[command(name = "worklog-sync", version, about = "Keep Toggl Track and Tempo worklogs in sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show worklogs of a date range with their Tempo counterparts.
    List(RangeArgs),
    /// Push every Toggl entry of a date range to Tempo.
    Push(RangeArgs),
    /// Update persisted settings.
    Configure {
        #[arg(long)]
        workspace_id: Option<u64>,
        #[arg(long)]
        account_id: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        utc_offset_minutes: Option<i32>,
    },
    /// Store an API token in the OS keyring.
    SetToken { backend: BackendArg, token: String },
    /// Remove a stored API token.
    ClearToken { backend: BackendArg },
}

#[derive(clap::Args)]
struct RangeArgs {
    /// First day, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day (inclusive), YYYY-MM-DD. Defaults to `from`.
    #[arg(long)]
    to: Option<NaiveDate>,
}

impl RangeArgs {
    fn resolve(&self) -> Result<(NaiveDate, NaiveDate)> {
        let from = self.from.unwrap_or_else(|| Local::now().date_naive());
        let to = self.to.unwrap_or(from);
        anyhow::ensure!(from <= to, "--from {} is after --to {}", from, to);
        Ok((from, to))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Toggl,
    Tempo,
}

impl From<BackendArg> for Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Toggl => Backend::Toggl,
            BackendArg::Tempo => Backend::Tempo,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let secrets = SecretsManager::new(worklog_sync::secrets::KEYRING_SERVICE);
    let manager = ConfigManager::new()?;

    match cli.command {
        Command::List(range) => {
            let (from, to) = range.resolve()?;
            let engine = build_engine(&manager.load(), &secrets)?;
            let loaded = engine.load(from, to).await.context("loading worklogs")?;
            for worklog in &loaded.worklogs {
                println!("{}", describe(worklog));
            }
            for worklog in &loaded.unmatched {
                println!("{} (tempo only)", describe(worklog));
            }
        }
        Command::Push(range) => {
            let (from, to) = range.resolve()?;
            let engine = build_engine(&manager.load(), &secrets)?;
            let mut loaded = engine.load(from, to).await.context("loading worklogs")?;
            let mut failures = 0usize;
            for worklog in loaded.worklogs.iter_mut() {
                match engine.synchronize(worklog).await {
                    Ok(report) if report.tempo_skipped => {
                        println!("? {} (no issue key, not sent to tempo)", describe(worklog))
                    }
                    Ok(report) if report.is_noop() => println!("= {}", describe(worklog)),
                    Ok(_) => println!("+ {}", describe(worklog)),
                    Err(err @ SyncError::RollbackFailure { .. }) => {
                        failures += 1;
                        println!("! {}: {} (check both backends by hand)", describe(worklog), err);
                    }
                    Err(err) => {
                        failures += 1;
                        println!("x {}: {}", describe(worklog), err);
                    }
                }
            }
            if !loaded.unmatched.is_empty() {
                warn!(
                    "{} tempo worklogs have no toggl entry and were left alone",
                    loaded.unmatched.len()
                );
            }
            anyhow::ensure!(failures == 0, "{} worklogs failed to synchronize", failures);
        }
        Command::Configure {
            workspace_id,
            account_id,
            utc_offset_minutes,
        } => {
            let mut config = manager.load();
            if workspace_id.is_some() {
                config.toggl_workspace_id = workspace_id;
            }
            if account_id.is_some() {
                config.tempo_account_id = account_id;
            }
            if utc_offset_minutes.is_some() {
                config.utc_offset_minutes = utc_offset_minutes;
                config.offset()?;
            }
            manager.save(&config)?;
            info!("saved settings to {}", manager.path().display());
        }
        Command::SetToken { backend, token } => {
            let backend = Backend::from(backend);
            secrets.save_token(backend, &token)?;
            info!("stored {} token", backend);
        }
        Command::ClearToken { backend } => {
            let backend = Backend::from(backend);
            secrets.clear_token(backend)?;
            info!("removed {} token", backend);
        }
    }
    Ok(())
}

fn describe(worklog: &Worklog) -> String {
    let minutes = worklog.duration.num_minutes();
    format!(
        "{} {:>3}h{:02}m {} [tempo: {}]",
        worklog.start().with_timezone(&Local).format("%Y-%m-%d %H:%M"),
        minutes / 60,
        minutes % 60,
        worklog.description,
        match worklog.tempo.as_ref().and_then(|record| record.id) {
            Some(id) => id.to_string(),
            None => "-".to_string(),
        }
    )
}
