use crate::storage::Store;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "kb-tile-games.log";
const FILTER_VAR: &str = "KB_GAMES_LOG";

/// Sends `tracing` output to a log file in the data directory. The terminal
/// runs in raw mode while a game is up, so nothing goes to stderr.
pub fn init(store: &Store) -> Result<(), String>
{
    store.ensure_dir().map_err(|err| err.to_string())?;
    let path = store.path(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| format!("Failed to open log file {}: {err}", path.display()))?;

    let filter = EnvFilter::try_from_env(FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| format!("Failed to install logger: {err}"))
}
