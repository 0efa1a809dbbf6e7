use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log format options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log level options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Informational messages and above
    Info,
    /// Debug messages and above
    Debug,
    /// All messages including trace
    Trace,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// devmanifest subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode the manifest and print its normalized form as JSON
    ReadConfiguration {
        /// Include the path the manifest was loaded from
        #[arg(long)]
        include_origin: bool,
    },

    /// Decode the manifest and report provisioning, lifecycle hooks and warnings
    Check {
        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },
}

/// Inspect devcontainer.json manifests
#[derive(Debug, Parser)]
#[command(name = "devmanifest", version)]
pub struct Cli {
    /// Log format (text or json, defaults to text, can be set via DEVMANIFEST_LOG_FORMAT env var)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Workspace folder path
    #[arg(long, global = true, value_name = "PATH")]
    pub workspace_folder: Option<PathBuf>,

    /// Manifest file path (skips discovery)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Initialize logging from the global options and run the subcommand.
    pub fn dispatch(self) -> Result<()> {
        let log_format = match self.log_format {
            Some(LogFormat::Text) => Some("text"),
            Some(LogFormat::Json) => Some("json"),
            None => None, // Let logging module check environment variable
        };

        let log_level = self.log_level.as_str();
        if std::env::var_os(devmanifest_core::logging::LOG_FILTER_ENV).is_none()
            && std::env::var_os("RUST_LOG").is_none()
        {
            std::env::set_var(
                "RUST_LOG",
                format!("devmanifest={},devmanifest_core={}", log_level, log_level),
            );
        }
        devmanifest_core::logging::init(log_format)?;

        tracing::debug!("CLI initialized with log level: {}", log_level);

        let workspace_folder = match self.workspace_folder {
            Some(path) => path,
            None => std::env::current_dir()?,
        };

        match self.command {
            Some(Commands::ReadConfiguration { include_origin }) => {
                use crate::commands::read_configuration::{
                    execute_read_configuration, ReadConfigurationArgs,
                };

                execute_read_configuration(ReadConfigurationArgs {
                    workspace_folder,
                    config_path: self.config,
                    include_origin,
                })
            }
            Some(Commands::Check { output_format }) => {
                use crate::commands::check::{execute_check, CheckArgs};

                execute_check(CheckArgs {
                    workspace_folder,
                    config_path: self.config,
                    output_format,
                })
            }
            None => {
                let mut output = devmanifest_core::io::Output::stdout();
                output.write_lines(&[
                    "devmanifest - inspect devcontainer.json manifests",
                    "Run with --help to see available commands",
                ])
            }
        }
    }
}
