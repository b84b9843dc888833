//! gemkey: encrypted Gemini API key store
//!
//! Commands:
//!   set [--stdin]               - encrypt and store the API key
//!   show [--reveal]             - resolve the current key (container, then legacy file)
//!   status                      - describe what is on disk, without prompting
//!   migrate [--remove-legacy]   - encrypt a legacy plaintext key into the container
//!   config show                 - display the effective configuration
//!
//! Exit status: 0 on success, 1 on error, 2 when cancelled or nothing is stored.

mod prompt;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use gemkey_core::config::{default_config_path, GemkeyConfig};
use gemkey_core::SecureBytes;
use gemkey_crypto::TAG_SIZE;
use gemkey_secrets::{
    resolve_secret, ContainerStatus, CredentialStore, PutOutcome, Resolution, SecretSource,
    StorePaths,
};

use prompt::TerminalPrompt;

/// Exit status for a cancelled prompt or an absent key.
const EXIT_UNAVAILABLE: u8 = 2;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "gemkey",
    version,
    about = "Encrypted Gemini API key store",
    long_about = "gemkey: store the Gemini API key in a passphrase-encrypted container and read it back"
)]
struct Cli {
    /// Path to gemkey.toml (default: <config dir>/gemini-gtk/gemkey.toml)
    #[arg(long, short = 'c', env = "GEMKEY_CONFIG")]
    config: Option<PathBuf>,

    /// Use this directory instead of the user configuration directory
    #[arg(long, env = "GEMKEY_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Log level filter (overrides config; RUST_LOG wins over both)
    #[arg(long, env = "GEMKEY_LOG")]
    log: Option<String>,

    /// Log format (overrides config)
    #[arg(long, env = "GEMKEY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt and store the API key (prompts for a passphrase twice)
    Set {
        /// Read the key from the first line of stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },

    /// Print the current API key, masked unless --reveal is given
    Show {
        /// Print the full key to stdout
        #[arg(long)]
        reveal: bool,
    },

    /// Describe the stored files without prompting
    Status,

    /// Encrypt a legacy plaintext key into the container
    Migrate {
        /// Delete api_key.txt after the container has been written
        #[arg(long)]
        remove_legacy: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Display the effective configuration
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    fn from_config(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = match cli.config.clone() {
        Some(path) => Some(path),
        None => default_config_path().ok(),
    };
    let config = load_config(config_path.as_deref())?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.log.format));
    init_logging(&level, format);

    if let Commands::Config { action: ConfigAction::Show } = cli.command {
        return cmd_config_show(&config, config_path.as_deref());
    }

    let config_dir = cli.config_dir.clone().or_else(|| config.store.config_dir.clone());
    let paths = StorePaths::resolve(config_dir.as_deref())
        .context("locating the user configuration directory")?;
    tracing::debug!(app_dir = %paths.app_dir().display(), "store location");
    let store = CredentialStore::new(paths, Arc::new(TerminalPrompt));

    match cli.command {
        Commands::Set { stdin } => cmd_set(&store, stdin),
        Commands::Show { reveal } => cmd_show(&store, reveal),
        Commands::Status => cmd_status(&store),
        Commands::Migrate { remove_legacy } => cmd_migrate(&store, remove_legacy),
        Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn init_logging(level: &str, format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output (and the key itself for `show --reveal`).
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<GemkeyConfig> {
    match path {
        Some(path) => GemkeyConfig::load(path)
            .with_context(|| format!("loading config: {}", path.display())),
        None => Ok(GemkeyConfig::default()),
    }
}

// ── `gemkey config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &GemkeyConfig, path: Option<&Path>) -> Result<ExitCode> {
    match path {
        Some(path) => println!("# config: {}", path.display()),
        None => println!("# config: <defaults>"),
    }
    let rendered = toml::to_string_pretty(config).context("serializing config")?;
    print!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

// ── `gemkey set` ──────────────────────────────────────────────────────────────

fn cmd_set(store: &CredentialStore, from_stdin: bool) -> Result<ExitCode> {
    let entry = if from_stdin {
        read_stdin_line()?
    } else {
        prompt::read_hidden("Gemini API key: ").context("reading API key")?
    };

    let key = entry.expose_secret().trim();
    if key.is_empty() {
        eprintln!("No API key entered.");
        return Ok(ExitCode::from(EXIT_UNAVAILABLE));
    }

    match store.put(key.as_bytes()).context("storing API key")? {
        PutOutcome::Stored => {
            println!("API key encrypted to {}", store.paths().encrypted_path().display());
            Ok(ExitCode::SUCCESS)
        }
        PutOutcome::Cancelled => {
            eprintln!("Cancelled; nothing was written.");
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
    }
}

fn read_stdin_line() -> Result<SecretString> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading API key from stdin")?;
    Ok(SecretString::from(line))
}

// ── `gemkey show` ─────────────────────────────────────────────────────────────

fn cmd_show(store: &CredentialStore, reveal: bool) -> Result<ExitCode> {
    let (secret, source) = match resolve_secret(store).context("reading API key")? {
        Resolution::Found { secret, source } => (secret, source),
        Resolution::Cancelled => {
            eprintln!("Cancelled.");
            return Ok(ExitCode::from(EXIT_UNAVAILABLE));
        }
        Resolution::NotAvailable => {
            eprintln!("No API key available. Run `gemkey set` to store one.");
            return Ok(ExitCode::from(EXIT_UNAVAILABLE));
        }
    };

    if source.is_legacy() {
        eprintln!(
            "warning: key read from {}; run `gemkey migrate` to encrypt it",
            source.describe()
        );
    }

    let mut out = std::io::stdout().lock();
    if reveal {
        out.write_all(secret.expose_secret())?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", mask(&secret))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// First four bytes followed by the total length, e.g. `AIza… (39 bytes)`.
fn mask(secret: &SecureBytes) -> String {
    let bytes = secret.expose_secret();
    let shown = &bytes[..bytes.len().min(4)];
    format!("{}… ({} bytes)", String::from_utf8_lossy(shown), bytes.len())
}

// ── `gemkey status` ───────────────────────────────────────────────────────────

fn cmd_status(store: &CredentialStore) -> Result<ExitCode> {
    let paths = store.paths();
    println!("Directory: {}", paths.app_dir().display());

    let container = paths.encrypted_path();
    match store.inspect().context("inspecting container")? {
        ContainerStatus::Missing => println!("Container: {} (missing)", container.display()),
        ContainerStatus::Container { ciphertext_len } => println!(
            "Container: {} (encrypted, {} byte secret)",
            container.display(),
            ciphertext_len.saturating_sub(TAG_SIZE)
        ),
        ContainerStatus::Legacy { len } => println!(
            "Container: {} (legacy plaintext, {len} bytes)",
            container.display()
        ),
        ContainerStatus::Corrupt { len } => {
            println!("Container: {} (corrupt, {len} bytes)", container.display())
        }
    }

    let legacy = paths.legacy_plain_path();
    match std::fs::metadata(&legacy) {
        Ok(meta) => println!("Legacy:    {} ({} bytes)", legacy.display(), meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("Legacy:    {} (missing)", legacy.display())
        }
        Err(e) => return Err(e).with_context(|| format!("stat {}", legacy.display())),
    }
    Ok(ExitCode::SUCCESS)
}

// ── `gemkey migrate` ──────────────────────────────────────────────────────────

fn cmd_migrate(store: &CredentialStore, remove_legacy: bool) -> Result<ExitCode> {
    let container = store.paths().encrypted_path();
    match store.inspect().context("inspecting container")? {
        ContainerStatus::Container { .. } => {
            println!("{} is already encrypted; nothing to migrate.", container.display());
            return Ok(ExitCode::SUCCESS);
        }
        ContainerStatus::Corrupt { .. } => {
            bail!("{} is corrupt; run `gemkey set` to replace it", container.display())
        }
        ContainerStatus::Legacy { .. } | ContainerStatus::Missing => {}
    }

    // Neither case prompts: the container path holds no container.
    let Resolution::Found { secret, source } = resolve_secret(store).context("reading legacy key")?
    else {
        eprintln!("No legacy API key found.");
        return Ok(ExitCode::from(EXIT_UNAVAILABLE));
    };

    match store.put(secret.expose_secret()).context("storing API key")? {
        PutOutcome::Stored => {}
        PutOutcome::Cancelled => {
            eprintln!("Cancelled; legacy key left in place.");
            return Ok(ExitCode::from(EXIT_UNAVAILABLE));
        }
    }
    println!("Migrated {} to {}", source.describe(), container.display());

    if remove_legacy && source == SecretSource::LegacyPlainFile {
        let legacy = store.paths().legacy_plain_path();
        std::fs::remove_file(&legacy)
            .with_context(|| format!("removing {}", legacy.display()))?;
        println!("Removed {}", legacy.display());
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_shows_prefix_and_length() {
        let secret = SecureBytes::from_vec(b"AIzaSyExampleExampleExample".to_vec());
        assert_eq!(mask(&secret), "AIza… (27 bytes)");
    }

    #[test]
    fn test_mask_short_secret() {
        let secret = SecureBytes::from_vec(b"ab".to_vec());
        assert_eq!(mask(&secret), "ab… (2 bytes)");
    }

    #[test]
    fn test_log_format_from_config() {
        assert_eq!(LogFormat::from_config("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_config("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_config("text"), LogFormat::Text);
        assert_eq!(LogFormat::from_config("anything"), LogFormat::Text);
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "gemkey",
            "--config-dir",
            "/tmp/alt",
            "--log-format",
            "json",
            "show",
            "--reveal",
        ])
        .unwrap();
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/alt")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(cli.command, Commands::Show { reveal: true }));
    }

    #[test]
    fn test_cli_parses_migrate() {
        let cli = Cli::try_parse_from(["gemkey", "migrate", "--remove-legacy"]).unwrap();
        assert!(matches!(cli.command, Commands::Migrate { remove_legacy: true }));
    }
}
