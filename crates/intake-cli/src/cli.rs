//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use intake_config::{ConfigLoader, ConfigOverrides};
use intake_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};

use crate::client::{AppContext, CliDependencies, CliError, CliResult};
use crate::commands::check::handle_check;
use crate::commands::endpoint::{handle_files, handle_health};
use crate::commands::policy::handle_policy;
use crate::commands::upload::handle_upload;

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        build_sha: option_env!("INTAKE_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }
    let _context = GlobalContextGuard::new(command_label(&cli.command));

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        request_timeout_secs: cli.timeout,
        transport: None,
    };
    let mut loader = ConfigLoader::new().with_overrides(overrides);
    if let Some(path) = cli.config {
        loader = loader.with_file(path);
    }
    let config = loader
        .load()
        .map_err(|err| CliError::validation(format!("invalid configuration: {}", err.describe())))?;

    let deps = CliDependencies::new(&config)?;
    let ctx = AppContext::new(deps, config, cli.output)?;

    match cli.command {
        Command::Upload(args) => handle_upload(&ctx, args).await,
        Command::Check(args) => handle_check(&ctx, args).await,
        Command::Health => handle_health(&ctx).await,
        Command::Files => handle_files(&ctx).await,
        Command::Policy => handle_policy(&ctx),
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Upload(_) => "upload",
        Command::Check(_) => "check",
        Command::Health => "health",
        Command::Files => "files",
        Command::Policy => "policy",
    }
}

#[derive(Parser)]
#[command(name = "intake", about = "Validate and upload drawing files to the intake endpoint")]
pub(crate) struct Cli {
    #[arg(long, global = true, help = "Endpoint base URL (overrides INTAKE_ENDPOINT)")]
    endpoint: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    timeout: Option<u64>,
    #[arg(long, global = true, help = "YAML configuration file (overrides INTAKE_CONFIG)")]
    config: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(
        long,
        global = true,
        env = "INTAKE_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    log_level: String,
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormatArg>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Validate and upload files, one submission per path.
    Upload(UploadArgs),
    /// Run only the validation policy against a file.
    Check(CheckArgs),
    /// Query the endpoint health route.
    Health,
    /// List files stored by the endpoint.
    Files,
    /// Print the effective configuration.
    Policy,
}

#[derive(Args, Default)]
pub(crate) struct UploadArgs {
    #[arg(required = true, help = "Files to submit, in order")]
    pub(crate) paths: Vec<PathBuf>,
    #[arg(long, help = "Use the simulated transport instead of the network")]
    pub(crate) simulate: bool,
    #[arg(long, help = "Declared media type (defaults to one derived from the extension)")]
    pub(crate) content_type: Option<String>,
    #[arg(long, help = "Stay alive until the last notification clears")]
    pub(crate) wait_notifications: bool,
    #[arg(long, help = "Print Prometheus metrics after the run")]
    pub(crate) metrics: bool,
}

#[derive(Args, Default)]
pub(crate) struct CheckArgs {
    #[arg(help = "File to check")]
    pub(crate) path: PathBuf,
    #[arg(long, help = "Declared media type (defaults to one derived from the extension)")]
    pub(crate) content_type: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn upload_parses_flags_and_paths() {
        let cli = Cli::try_parse_from([
            "intake",
            "--output",
            "json",
            "upload",
            "a.png",
            "b.pdf",
            "--simulate",
            "--wait-notifications",
        ])
        .expect("parse");
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Command::Upload(args) => {
                assert_eq!(args.paths.len(), 2);
                assert!(args.simulate);
                assert!(args.wait_notifications);
                assert!(!args.metrics);
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn upload_requires_a_path() {
        assert!(Cli::try_parse_from(["intake", "upload"]).is_err());
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from([
            "intake",
            "health",
            "--endpoint",
            "http://127.0.0.1:9000",
            "--timeout",
            "3",
        ])
        .expect("parse");
        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(command_label(&cli.command), "health");
    }
}
