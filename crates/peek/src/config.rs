//! CLI contract (§6.4). `peek` intentionally has no file-based config layer:
//! the spec scopes the flag parser out, so this module only has to expose
//! the documented flags, with sensible defaults for everything else.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use engine::RetentionConfig;

fn default_db_path() -> PathBuf {
    dirs_home().join(".peek").join("db")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
#[value(rename_all = "lowercase")]
pub enum FormatMode {
    Auto,
    Json,
    Logfmt,
}

/// `peek` — local-first log ingestion and query service.
#[derive(Debug, Parser)]
#[command(name = "peek", version)]
pub struct Cli {
    /// Directory holding the embedded store's files (default ~/.peek/db).
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Size budget before the size-based retention sweep kicks in, e.g. "1GB".
    #[arg(long)]
    pub retention_size: Option<String>,

    /// Delete records older than this many days.
    #[arg(long)]
    pub retention_days: Option<i64>,

    /// Force a specific ingest format instead of auto-detecting per line.
    #[arg(long, value_enum, default_value_t = FormatMode::Auto)]
    pub format: FormatMode,

    /// HTTP port to listen on.
    #[arg(long, default_value_t = 9999)]
    pub port: u16,

    /// Don't open a browser tab on startup (no-op here; kept for CLI parity).
    #[arg(long)]
    pub no_browser: bool,

    /// Disable the fresh-mode filter: show pre-existing records too.
    #[arg(long)]
    pub all: bool,
}

pub struct Config {
    pub db_path: PathBuf,
    pub retention: RetentionConfig,
    pub format: FormatMode,
    pub port: u16,
    pub fresh_mode: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let retention_size_bytes = cli
            .retention_size
            .as_deref()
            .map(|s| s.parse::<bytesize::ByteSize>().map(|b| b.0))
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid --retention-size: {e}"))
            .context("parsing --retention-size")?;

        Ok(Self {
            db_path: cli.db_path.unwrap_or_else(default_db_path),
            retention: RetentionConfig {
                max_size_bytes: retention_size_bytes,
                retention_days: cli.retention_days,
            },
            format: cli.format,
            port: cli.port,
            fresh_mode: !cli.all,
        })
    }
}
