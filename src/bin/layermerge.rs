use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layermerge::{
    CompositeThreading, Fingerprint, MergeSession, RateLimiter, RecentStore, SaveOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "layermerge", version)]
struct Cli {
    /// Where the last opened settings file is remembered.
    #[arg(long, global = true)]
    recent_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge once and write the output image.
    Merge(MergeArgs),
    /// Merge, then re-merge and save whenever an input changes.
    Watch(WatchArgs),
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Settings JSON. Defaults to the last opened file.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Output path, overriding `outputFileName`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Desaturate the result even if the settings do not ask for it.
    #[arg(long, default_value_t = false)]
    gray: bool,

    /// Enable row-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct WatchArgs {
    /// Settings JSON. Defaults to the last opened file.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Polling interval for input changes.
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,

    /// Minimum gap between two saves.
    #[arg(long, default_value_t = 3000)]
    min_save_interval_ms: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let recent_path = cli.recent_file.unwrap_or_else(RecentStore::default_path);
    let result = match cli.cmd {
        Command::Merge(args) => cmd_merge(args, &recent_path),
        Command::Watch(args) => cmd_watch(args, &recent_path),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Pick the settings file and remember it for next time.
fn settings_path(in_path: Option<PathBuf>, recent_path: &Path) -> anyhow::Result<PathBuf> {
    let mut recent = RecentStore::load(recent_path);
    let path = match in_path {
        Some(p) => p,
        None => recent
            .last_opened()
            .map(Path::to_path_buf)
            .context("no --in given and no previously opened settings file")?,
    };
    if let Err(err) = recent.remember(&path) {
        tracing::warn!(%err, "could not update recent-file store");
    }
    Ok(path)
}

fn cmd_merge(args: MergeArgs, recent_path: &Path) -> anyhow::Result<()> {
    let path = settings_path(args.in_path, recent_path)?;
    let mut session = MergeSession::new(&path)
        .with_gray(args.gray)
        .with_threading(CompositeThreading {
            parallel: args.parallel,
            threads: args.threads,
        });
    if let Some(out) = args.out {
        session = session.with_output(out);
    }

    session
        .refresh()
        .with_context(|| format!("merge '{}'", path.display()))?;
    match session.save(&RateLimiter::default())? {
        SaveOutcome::Saved(out) => eprintln!("wrote {}", out.display()),
        other => anyhow::bail!("merge produced nothing to write ({other:?})"),
    }
    Ok(())
}

fn cmd_watch(args: WatchArgs, recent_path: &Path) -> anyhow::Result<()> {
    let path = settings_path(args.in_path, recent_path)?;
    let mut session = MergeSession::new(&path);
    let limiter = RateLimiter::new(Duration::from_millis(args.min_save_interval_ms));
    let interval = Duration::from_millis(args.interval_ms);

    let mut seen = session.current_fingerprint();
    let mut pending_save = refresh_logged(&mut session, &mut seen);

    if session.settings().is_some_and(|s| s.auto_save_and_exit) {
        return match session.save(&limiter)? {
            SaveOutcome::Saved(out) => {
                eprintln!("wrote {}", out.display());
                Ok(())
            }
            other => anyhow::bail!("nothing saved ({other:?})"),
        };
    }

    tracing::info!(path = %path.display(), "watching for changes");
    loop {
        let current = session.current_fingerprint();
        if current.is_stale_since(&seen) {
            seen = current;
            pending_save |= refresh_logged(&mut session, &mut seen);
        }
        if pending_save {
            match session.save(&limiter) {
                Ok(SaveOutcome::Saved(out)) => {
                    eprintln!("wrote {}", out.display());
                    pending_save = false;
                }
                Ok(SaveOutcome::Throttled) => {}
                Ok(SaveOutcome::NothingToSave) => pending_save = false,
                Err(err) => {
                    tracing::error!(%err, "save failed");
                    pending_save = false;
                }
            }
        }
        std::thread::sleep(interval);
    }
}

/// Refresh `session`; on success `seen` becomes the session's fingerprint.
/// Returns whether there is a new canvas to save.
fn refresh_logged(session: &mut MergeSession, seen: &mut Fingerprint) -> bool {
    match session.refresh() {
        Ok(out) => {
            tracing::info!(
                width = out.canvas.width,
                height = out.canvas.height,
                skipped = out.unavailable.len(),
                "merged"
            );
            if let Some(fp) = session.fingerprint() {
                *seen = fp.clone();
            }
            true
        }
        Err(err) => {
            tracing::error!(%err, "merge failed; keeping previous result");
            false
        }
    }
}
