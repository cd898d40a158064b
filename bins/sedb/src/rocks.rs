use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Subcommand};
use sedb_db::{AccessMode, RocksConfig, RocksSettings, Store};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, ClapArgs)]
#[clap(args_conflicts_with_subcommands = false)]
pub struct Command {
    /// Path to the RocksDB database directory
    #[clap(long, short = 'p')]
    pub db_path: Option<PathBuf>,

    /// Access mode: read_write, read_only, or secondary
    #[clap(long, short = 'm')]
    pub access_mode: Option<String>,

    /// Working directory for secondary mode (default: <db-path>.secondary.<pid>)
    #[clap(long)]
    pub secondary_path: Option<PathBuf>,

    /// Keep the secondary working directory on exit
    #[clap(long)]
    pub keep_secondary_path: bool,

    /// JSON settings file; command-line flags override its fields
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub verb: Verb,
}

#[derive(Debug, Subcommand)]
pub enum Verb {
    /// Show mode, paths and key count
    Info,
    /// Print values as JSON, one `key<TAB>value` line per key (null when absent)
    Get(Get),
    /// Store a value (parsed as JSON, or a plain string otherwise) and flush
    Set(Set),
    /// List keys in store order
    Keys(Keys),
    /// Secondary only: catch up periodically and print each change of a key
    Follow(Follow),
}

#[derive(Debug, ClapArgs)]
pub struct Get {
    /// Keys to look up
    #[clap(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, ClapArgs)]
pub struct Set {
    pub key: String,
    pub value: String,
}

#[derive(Debug, ClapArgs)]
pub struct Keys {
    /// Keys fetched per batch
    #[clap(long, default_value = "1000")]
    pub batch_size: usize,

    /// Maximum number of keys to print
    #[clap(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, ClapArgs)]
pub struct Follow {
    pub key: String,

    /// Delay between catch-ups in milliseconds
    #[clap(long, default_value = "500")]
    pub interval_ms: u64,

    /// Stop after this many catch-ups (default: run until interrupted)
    #[clap(long)]
    pub polls: Option<usize>,
}

pub fn run(cmd: &Command) {
    trace!("Running command: {:?}", cmd);

    if let Err(e) = run_verb(cmd) {
        error!("rocks command failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Run the verb inside `Store::scoped`, so the store is closed on every path
/// and a verb error is reported ahead of a close error.
fn run_verb(cmd: &Command) -> anyhow::Result<()> {
    let config = build_config(cmd)?;

    Store::scoped(config, |store| match &cmd.verb {
        Verb::Info => run_info(store),
        Verb::Get(args) => run_get(store, args),
        Verb::Set(args) => run_set(store, args),
        Verb::Keys(args) => run_keys(store, args),
        Verb::Follow(args) => run_follow(store, args),
    })
}

/// Merge the optional settings file with command-line overrides.
fn build_config(cmd: &Command) -> anyhow::Result<RocksConfig> {
    let mut settings = match &cmd.config {
        Some(path) => RocksSettings::from_json_file(path)?,
        None => RocksSettings::default(),
    };

    if let Some(db_path) = &cmd.db_path {
        settings.db_path = Some(db_path.clone());
    }
    if let Some(access_mode) = &cmd.access_mode {
        settings.access_type = Some(access_mode.clone());
    }
    if let Some(secondary_path) = &cmd.secondary_path {
        settings.secondary_path = Some(secondary_path.clone());
    }
    if cmd.keep_secondary_path {
        settings.keep_secondary_path = Some(true);
    }

    Ok(settings.into_config()?)
}

fn run_info(store: &Store) -> anyhow::Result<()> {
    let mut count = 0usize;
    for batch in store.iter_keys(1000)? {
        count += batch?.len();
    }

    println!("path\t{}", store.path().display());
    println!("mode\t{}", store.mode());
    println!("writable\t{}", store.is_writable());
    if let Some(secondary_path) = store.secondary_path() {
        println!("secondary_path\t{}", secondary_path.display());
    }
    println!("keys\t{}", count);
    Ok(())
}

fn run_get(store: &Store, args: &Get) -> anyhow::Result<()> {
    let values: Vec<Option<Value>> = store.mget(args.keys.as_slice())?;
    for (key, value) in args.keys.iter().zip(values) {
        println!("{}\t{}", key, value.unwrap_or(Value::Null));
    }
    Ok(())
}

fn run_set(store: &mut Store, args: &Set) -> anyhow::Result<()> {
    let value = parse_value(&args.value);
    store.set(&args.key, &value)?;
    store.flush()?;
    info!(key = %args.key, "Stored value");
    Ok(())
}

fn run_keys(store: &Store, args: &Keys) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(usize::MAX);
    let mut printed = 0usize;
    'batches: for batch in store.iter_keys(args.batch_size)? {
        for key in batch? {
            if printed >= limit {
                break 'batches;
            }
            println!("{}", key);
            printed += 1;
        }
    }
    Ok(())
}

fn run_follow(store: &mut Store, args: &Follow) -> anyhow::Result<()> {
    if store.mode() != AccessMode::Secondary {
        bail!("follow requires --access-mode secondary");
    }

    // Ctrl-C ends the loop normally so the caller closes the store and
    // removes the secondary directory.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    runtime.block_on(follow_key(store, args))
}

async fn follow_key(store: &mut Store, args: &Follow) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last: Option<Option<Value>> = None;
    let mut polls = 0usize;
    loop {
        tokio::select! {
            // Polled first so the handler is installed before any output.
            biased;
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                info!(polls, "Interrupted, stopping follow");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        store.catch_up()?;
        let current: Option<Value> = store.get(&args.key)?;
        if last.as_ref() != Some(&current) {
            println!("{}\t{}", args.key, current.clone().unwrap_or(Value::Null));
            last = Some(current);
        }

        polls += 1;
        if args.polls.is_some_and(|max| polls >= max) {
            return Ok(());
        }
    }
}

/// Interpret a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_json_and_fallback() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_value("plain text"), Value::from("plain text"));
        assert_eq!(parse_value("[1,2]"), serde_json::json!([1, 2]));
    }

    fn command(access_mode: Option<&str>) -> Command {
        Command {
            db_path: Some(PathBuf::from("/tmp/cli.rkdb")),
            access_mode: access_mode.map(str::to_string),
            secondary_path: None,
            keep_secondary_path: false,
            config: None,
            verb: Verb::Info,
        }
    }

    #[test]
    fn test_build_config_defaults_to_read_write() {
        let config = build_config(&command(None)).unwrap();
        assert_eq!(config.access_mode, AccessMode::ReadWrite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/cli.rkdb"));
    }

    #[test]
    fn test_build_config_rejects_unknown_mode() {
        let err = build_config(&command(Some("bogus"))).unwrap_err();
        assert!(err.to_string().contains("Invalid access_type"));
    }

    #[test]
    fn test_build_config_requires_db_path() {
        let mut cmd = command(None);
        cmd.db_path = None;
        assert!(build_config(&cmd).is_err());
    }
}
