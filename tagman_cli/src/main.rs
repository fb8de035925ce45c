use anyhow::{Context, Result, bail};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;

use tagman_cli::auth;
use tagman_cli::config::ConfigManager;
use tagman_cli::error::{exit_code, exit_code_for};
use tagman_cli::orchestrators::CleanupOrchestrator;
use tagman_client_core::TagManagerService;

#[derive(Parser)]
#[command(name = "tagman")]
#[command(author, version, about = "Tag Manager container automation - reference analysis and cleanup", long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    /// Tag Manager account id
    #[arg(value_name = "ACCOUNT_ID", required = true)]
    account_id: Option<String>,

    /// Name of the container to operate on
    #[arg(value_name = "CONTAINER_NAME", required = true)]
    container_name: Option<String>,

    /// Delete triggers referenced by no tag
    #[arg(long)]
    delete_unused_triggers: bool,

    /// Delete variables referenced by no tag, trigger, or variable
    #[arg(long)]
    delete_unused_variables: bool,

    /// Delete tags with no firing triggers and no teardown marker
    #[arg(long)]
    delete_tags_without_triggers: bool,

    /// Add a user-id field override to analytics tags that lack one
    #[arg(long)]
    ensure_user_id_field: bool,

    /// Variable id to keep regardless of the reference scan (repeatable)
    #[arg(long = "keep-variable", value_name = "ID")]
    keep_variables: Vec<String>,

    /// Tag id to keep regardless of trigger wiring (repeatable)
    #[arg(long = "keep-tag", value_name = "ID")]
    keep_tags: Vec<String>,

    /// Plan and report without calling any mutation endpoint
    #[arg(long)]
    dry_run: bool,

    /// Output format for the run report
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Store tokens from the OAuth consent flow
    Login,
    /// Show stored credential state
    Status,
    /// Remove stored credentials
    Logout,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_code::SUCCESS,
                _ => exit_code::FAILURE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(exit_code_for(&err));
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Auth { command }) => match command {
            AuthCommand::Login => auth::login(),
            AuthCommand::Status => auth::status(),
            AuthCommand::Logout => auth::logout(),
        },
        Some(Commands::Config { command }) => {
            let manager = ConfigManager::new();
            match command {
                ConfigCommand::Show => print!("{}", manager.show()?),
                ConfigCommand::Init => {
                    if manager.init()? {
                        println!("Wrote {}", manager.get_config_path().display());
                    } else {
                        println!("Config already exists at {}", manager.get_config_path().display());
                    }
                }
                ConfigCommand::Path => println!("{}", manager.get_config_path().display()),
            }
            Ok(())
        }
        None => cleanup(&cli).await,
    }
}

async fn cleanup(cli: &Cli) -> Result<()> {
    let (Some(account_id), Some(container_name)) = (&cli.account_id, &cli.container_name) else {
        bail!("usage: tagman <ACCOUNT_ID> <CONTAINER_NAME>");
    };

    let config = ConfigManager::new().load()?;
    let token = auth::require_access_token().context("Authentication required")?;
    let service = TagManagerService::new(config.api.service_config(), token)?;

    let mut policy = config.cleanup.policy();
    policy.delete_unused_triggers |= cli.delete_unused_triggers;
    policy.delete_unused_variables |= cli.delete_unused_variables;
    policy.delete_tags_without_triggers |= cli.delete_tags_without_triggers;
    policy.ensure_user_id_field |= cli.ensure_user_id_field;
    policy.keep_variable_ids.extend(cli.keep_variables.iter().cloned());
    policy.keep_tag_ids.extend(cli.keep_tags.iter().cloned());

    if !(policy.delete_unused_triggers
        || policy.delete_unused_variables
        || policy.delete_tags_without_triggers
        || policy.ensure_user_id_field)
    {
        log::warn!("no cleanup rules enabled; pass --help to see the available rules");
    }

    let orchestrator = CleanupOrchestrator::new(service, policy).with_dry_run(cli.dry_run);
    let report = orchestrator.run(account_id, container_name).await?;

    if let OutputFormat::Json = cli.format {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if cli.dry_run {
        println!(
            "{} {} action(s) planned against container {} (dry run)",
            "✓".green(),
            report.planned,
            report.container_id
        );
    } else if report.failed == 0 {
        println!(
            "{} {} of {} action(s) applied to container {}",
            "✓".green(),
            report.executed,
            report.planned,
            report.container_id
        );
    } else {
        println!(
            "{} {} applied, {} failed of {} planned against container {}",
            "!".yellow(),
            report.executed,
            report.failed,
            report.planned,
            report.container_id
        );
    }
    Ok(())
}
