//! Bulk-creates Jira saved filters from a delimited sheet.
//!
//! Run `jira-filter-importer --help` for usage information.

mod app_error;
mod auth;
mod config;
mod import;
mod jira;
mod keychain;
mod loader;
mod models;
mod preview;

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::app_error::{AppError, AppResult};
use crate::config::{Config, Overrides};
use crate::jira::JiraClient;
use crate::models::Credential;

const TOKEN_ENV: &str = "JIRA_API_TOKEN";

#[derive(Parser)]
#[command(name = "jira-filter-importer")]
#[command(about = "Create Jira saved filters from a CSV sheet")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    import: ImportArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Import filters from the sheet (default)
    Import(ImportArgs),

    /// Manage the API token stored in the OS keychain
    Token {
        #[command(subcommand)]
        action: TokenAction,

        /// Account email the token belongs to
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a token read from stdin
    Set,
    /// Remove the stored token
    Clear,
}

#[derive(Args, Clone)]
struct ImportArgs {
    /// CSV file with `Filter Name` and `JQL` columns
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Field delimiter (default `;`)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Jira base URL, e.g. https://your-domain.atlassian.net
    #[arg(long)]
    base_url: Option<String>,

    /// Account email used for Basic authentication
    #[arg(long)]
    email: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Preview and validate the sheet without calling Jira
    #[arg(long)]
    dry_run: bool,
}

impl From<ImportArgs> for Overrides {
    fn from(args: ImportArgs) -> Self {
        Overrides {
            base_url: args.base_url,
            email: args.email,
            csv_path: args.csv,
            delimiter: args.delimiter,
            timeout_secs: args.timeout_secs,
        }
    }
}

fn main() -> ExitCode {
    // A missing .env file is the normal case.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            if e.aborts_run() {
                log::error!("No filters were created. Exiting.");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> AppResult<()> {
    let file = config::load_file_config(cli.config.as_deref())?;
    let env = |key: &str| std::env::var(key).ok();

    match cli.command {
        Some(Command::Token { action, email }) => {
            let overrides = Overrides {
                email,
                ..Overrides::default()
            };
            let config = Config::resolve(file, env, overrides)?;
            manage_token(action, config.require_email()?)
        }
        Some(Command::Import(args)) => {
            let dry_run = args.dry_run;
            import_filters(Config::resolve(file, env, args.into())?, dry_run)
        }
        None => {
            let dry_run = cli.import.dry_run;
            import_filters(Config::resolve(file, env, cli.import.into())?, dry_run)
        }
    }
}

fn import_filters(config: Config, dry_run: bool) -> AppResult<()> {
    log::info!("--- Starting Jira Filter Creation Process ---");

    let rows = loader::load_rows(&config.csv_path, config.delimiter)?;
    if rows.is_empty() {
        log::warn!("No filter data found in '{}'. Exiting.", config.csv_path.display());
        return Ok(());
    }

    println!("\n--- Filter Data from CSV File ---");
    println!("{}", preview::render_table(&rows));

    if dry_run {
        let invalid: Vec<_> = rows.iter().filter_map(|row| row.to_record().err()).collect();
        for reason in &invalid {
            log::warn!("{reason}");
        }
        println!(
            "Dry run: {} rows read, {} would be submitted, {} would be skipped.",
            rows.len(),
            rows.len() - invalid.len(),
            invalid.len()
        );
        return Ok(());
    }

    let base_url = config.require_base_url()?;
    let email = config.require_email()?;
    let credential = Credential {
        account_id: email.to_string(),
        secret: keychain::resolve_api_token(std::env::var(TOKEN_ENV).ok(), email)?,
    };
    let header = auth::basic_auth_header(&credential);
    let client = JiraClient::new(base_url, &header, config.timeouts)?;

    let summary = import::run_import(&client, &config.policy, &rows);
    println!("\n{}", import::render_summary(&summary));
    Ok(())
}

fn manage_token(action: TokenAction, email: &str) -> AppResult<()> {
    match action {
        TokenAction::Set => {
            let mut token = String::new();
            std::io::stdin()
                .read_to_string(&mut token)
                .map_err(|e| AppError::Keychain(format!("cannot read token from stdin: {e}")))?;
            keychain::save_api_token(email, &token)?;
            log::info!("API token stored in keychain for {email}");
        }
        TokenAction::Clear => {
            keychain::delete_api_token(email)?;
            log::info!("API token removed from keychain for {email}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_flags_import_by_default() {
        let cli = Cli::try_parse_from(["jira-filter-importer", "--csv", "f.csv", "--dry-run"])
            .expect("valid args");
        assert!(cli.command.is_none());
        assert!(cli.import.dry_run);
        assert_eq!(cli.import.csv, Some(PathBuf::from("f.csv")));
    }

    #[test]
    fn top_level_import_flags_cannot_precede_a_subcommand() {
        let parsed = Cli::try_parse_from(["jira-filter-importer", "--dry-run", "import"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn import_subcommand_takes_its_own_flags() {
        let cli = Cli::try_parse_from(["jira-filter-importer", "import", "--dry-run", "-v"])
            .expect("valid args");
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Import(ref args)) if args.dry_run));
    }

    #[test]
    fn token_subcommand_parses() {
        let cli = Cli::try_parse_from(["jira-filter-importer", "token", "--email", "a@b.c", "set"])
            .expect("valid args");
        assert!(matches!(
            cli.command,
            Some(Command::Token {
                action: TokenAction::Set,
                email: Some(ref e)
            }) if e == "a@b.c"
        ));
    }

    #[test]
    fn missing_sheet_aborts_before_any_request() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::resolve(
            config::FileConfig::default(),
            |_| None,
            Overrides {
                csv_path: Some(dir.path().join("missing.csv")),
                base_url: Some("http://127.0.0.1:9".to_string()),
                email: Some("a@b.c".to_string()),
                ..Overrides::default()
            },
        )
        .expect("valid config");

        let err = import_filters(config, false).expect_err("file absent");
        assert!(matches!(err, AppError::FileNotFound(_)));
        assert!(err.aborts_run());
    }
}
