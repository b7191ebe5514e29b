//! `jix` command-line probe.
//!
//! # Responsibility
//! - Verify `jix_core` linkage and exercise key export, the checkbox mapper
//!   and database bootstrap without a UI.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jix_core::crypto::{key_downloader, EcdhKeyPair, ExportKey, KeyKind, RsaKeyPair};
use jix_core::db::schema_report;
use jix_core::{lex_todos, open_db, CoreConfig};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jix", about = "Encrypted local-first notebook store", version)]
struct Cli {
    /// TOML config with `db_path` and optional logging settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeyAlgo {
    Rsa,
    Ecdh,
}

#[derive(Subcommand)]
enum Command {
    /// Print core ping and version
    Ping,

    /// Generate a key pair and write pub.key / priv.key
    Keygen {
        #[arg(long, value_enum)]
        algo: KeyAlgo,
        /// Output directory (created if missing)
        #[arg(long)]
        out: PathBuf,
    },

    /// List checkbox lines of a markdown file with their byte offsets
    Todos {
        file: PathBuf,
    },

    /// Open the configured database and print schema information
    DbInfo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(CoreConfig::load)
        .transpose()
        .context("loading config")?;
    if let Some(config) = &config {
        config.init_logging().context("starting logging")?;
    }
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Command::Ping => {
            println!("jix_core ping={}", jix_core::ping());
            println!("jix_core version={}", jix_core::core_version());
        }
        Command::Keygen { algo, out } => keygen(algo, &out)?,
        Command::Todos { file } => todos(&file)?,
        Command::DbInfo => {
            let Some(config) = config else {
                bail!("db-info needs --config <file> with a db_path");
            };
            db_info(&config)?;
        }
    }
    Ok(())
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Keygen { .. } => "keygen",
            Self::Todos { .. } => "todos",
            Self::DbInfo => "db-info",
        }
    }
}

fn keygen(algo: KeyAlgo, out: &Path) -> Result<()> {
    match algo {
        KeyAlgo::Rsa => write_pair(&RsaKeyPair::generate()?, out),
        KeyAlgo::Ecdh => write_pair(&EcdhKeyPair::generate(), out),
    }
}

fn write_pair(pair: &impl ExportKey, out: &Path) -> Result<()> {
    for which in [KeyKind::Public, KeyKind::Private] {
        let download = key_downloader(which, pair)?;
        let path = download
            .save_into(out)
            .with_context(|| format!("writing {}", download.file_name))?;
        info!(
            "event=cli_keygen module=cli status=ok which={} bytes={}",
            which,
            download.bytes.len()
        );
        println!("{} {} bytes={}", path.display(), download.mime_type, download.bytes.len());
    }
    Ok(())
}

fn todos(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    for (index, todo) in lex_todos(&content).iter().enumerate() {
        println!("{index}\t{}..{}\t{}", todo.line_start, todo.line_end, todo.line);
    }
    Ok(())
}

fn db_info(config: &CoreConfig) -> Result<()> {
    let conn = open_db(&config.db_path)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let report = schema_report(&conn)?;
    println!("path={}", config.db_path.display());
    println!("schema_version={}", report.schema_version);
    println!("notebooks={} notes={}", report.notebooks, report.notes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, KeyAlgo};
    use clap::Parser;

    #[test]
    fn logged_command_names_match_the_command_line() {
        for (args, name) in [
            (vec!["jix", "ping"], "ping"),
            (vec!["jix", "keygen", "--algo", "ecdh", "--out", "/tmp/k"], "keygen"),
            (vec!["jix", "todos", "notes.md"], "todos"),
            (vec!["jix", "--config", "jix.toml", "db-info"], "db-info"),
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.command.name(), name);
        }
    }

    #[test]
    fn keygen_parses_algorithm() {
        let cli = Cli::try_parse_from(["jix", "keygen", "--algo", "rsa", "--out", "keys"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Keygen {
                algo: KeyAlgo::Rsa,
                ..
            }
        ));
    }
}
