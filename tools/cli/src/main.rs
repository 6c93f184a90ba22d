//! JsonVault CLI - fill a JSON template with secrets and seal it.
//!
//! Every `"<ask>"` value in the template is replaced with operator input,
//! the result is shown for review, encrypted for a certificate, written to
//! `<thumbprint>.encVault`, then decrypted again to prove it can be opened.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use jsonvault_common::Error;
use jsonvault_crypto::StoreScope;
use jsonvault_vault::{
    AnswerMap, ConsolePrompt, Session, SessionOptions, SessionReport, ToolConfig, VaultCodec,
};

/// Key store layout, shown by `--help`.
const KEY_STORE_HELP: &str = "\
Key store:
  Each certificate is a file named <THUMBPRINT>.key (thumbprint in upper
  case) holding the Base64 encoding of a 32-byte key. LocalMachine keys live
  in the machine store directory, CurrentUser keys (-u) in the user store.
  Override the directories with JSONVAULT_MACHINE_STORE and
  JSONVAULT_USER_STORE, or in the jsonvault/config.json config file.
  Create a key with, for example:
    head -c 32 /dev/urandom | base64 > <THUMBPRINT>.key
  and make it readable only by its owner.";

#[derive(Parser)]
#[command(name = "jsonvault")]
#[command(about = "JsonVault - Seal a JSON template with secrets to a certificate")]
#[command(after_help = KEY_STORE_HELP)]
#[command(version)]
struct Cli {
    /// Path to input JSON file.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    file: PathBuf,

    /// Certificate thumbprint (40 or 64 hex characters).
    #[arg(short = 't', long = "thumbprint", value_name = "THUMB")]
    thumbprint: Option<String>,

    /// Use the CurrentUser certificate store instead of LocalMachine.
    #[arg(short = 'u', long = "user-store")]
    user_store: bool,

    /// JSON object of answers keyed by placeholder path, instead of prompting.
    #[arg(short = 'a', long = "answers", value_name = "PATH")]
    answers: Option<PathBuf>,

    /// Directory to write the vault file to (default: current directory).
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("Error: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(report) if report.verified => {
            println!();
            println!("Vault written to {}", report.artifact.display());
            ExitCode::SUCCESS
        }
        Ok(report) => {
            eprintln!(
                "Error: {} decrypted to different text than was encrypted",
                report.artifact.display()
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Setup logging on stderr so stdout carries only the console dialogue.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Run one session against the configured key store.
fn run(cli: Cli) -> Result<SessionReport> {
    let mut config = ToolConfig::load().context("Failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if !config.output_dir.is_dir() {
        return Err(Error::Argument(format!(
            "output directory {} does not exist",
            config.output_dir.display()
        ))
        .into());
    }

    let scope = StoreScope::from_user_flag(cli.user_store);
    let store = Arc::new(config.key_store());

    let answers = cli
        .answers
        .as_deref()
        .map(AnswerMap::load)
        .transpose()
        .context("Failed to load answers")?;

    let codec = VaultCodec::new(store.clone(), scope, &config.output_dir);
    info!(
        "Using {} store at {}",
        codec.scope(),
        store.root(codec.scope()).display()
    );
    let options = SessionOptions {
        input: cli.file,
        thumbprint: cli.thumbprint,
        answers,
    };

    let mut console = ConsolePrompt::new(io::stdin().lock(), io::stdout());
    let report = Session::new(options, codec).run(&mut console)?;
    Ok(report)
}

/// Print an error once; anything outside the known taxonomy gets full detail.
fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        Some(Error::Io(_)) | None => {
            eprintln!("An unexpected error occurred:");
            eprintln!("{:?}", err);
        }
        Some(_) => eprintln!("Error: {:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "jsonvault",
            "-f",
            "settings.json",
            "-t",
            "ABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "-u",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("settings.json"));
        assert_eq!(
            cli.thumbprint.as_deref(),
            Some("ABCDEF0123456789ABCDEF0123456789ABCDEF01")
        );
        assert!(cli.user_store);
        assert!(cli.answers.is_none());
    }

    #[test]
    fn test_machine_store_by_default() {
        let cli = Cli::try_parse_from(["jsonvault", "-f", "a.json"]).unwrap();

        assert!(!cli.user_store);
        assert!(cli.thumbprint.is_none());
        assert!(StoreScope::from_user_flag(cli.user_store).is_machine());
    }

    #[test]
    fn test_missing_file_flag_rejected() {
        assert!(Cli::try_parse_from(["jsonvault", "-t", "abc"]).is_err());
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(Cli::try_parse_from(["jsonvault", "-f"]).is_err());
        assert!(Cli::try_parse_from(["jsonvault", "-f", "a.json", "-t"]).is_err());
    }

    #[test]
    fn test_help_describes_key_files() {
        let help = Cli::command().render_long_help().to_string();

        assert!(help.contains("<THUMBPRINT>.key"));
        assert!(help.contains("32-byte key"));
        assert!(help.contains("JSONVAULT_MACHINE_STORE"));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["jsonvault", "-f", "a.json", "-x"]).is_err());
    }
}
