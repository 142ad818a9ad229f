use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the docgen binary.
#[derive(Debug, Parser)]
#[command(name = "docgen", version, about = "Template document generation server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DOCGEN_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve,
    /// Render a `{template, data}` request file to a .docx without starting the server.
    Generate(GenerateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// JSON file holding `template` and `data`.
    #[arg(value_name = "REQUEST", value_hint = ValueHint::FilePath)]
    pub request: PathBuf,

    /// Destination of the generated document.
    #[arg(value_name = "OUTPUT", value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Flatten arbitrary nested data instead of filling template fields.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub structured: bool,
}

/// Overrides that take precedence over files and `DOCGEN__*` variables.
///
/// Several read the plain `PORT`, `FRONTEND_URL`, `DEBUG` and `RENDER`
/// variables that hosting platforms set.
#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "port", env = "PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Enable debug mode (debug-level logging unless a level is set).
    #[arg(
        long = "debug",
        env = "DEBUG",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: Option<bool>,

    /// Override the URL that `GET /` redirects to.
    #[arg(long = "frontend-url", env = "FRONTEND_URL", value_name = "URL")]
    pub frontend_url: Option<String>,

    /// Mark the deployment as hosted and name its environment.
    #[arg(long = "hosted-environment", env = "RENDER", value_name = "NAME")]
    pub hosted_environment: Option<String>,

    /// Override the deepest nesting level accepted for structured data.
    #[arg(long = "render-max-depth", value_name = "LEVELS")]
    pub render_max_depth: Option<u64>,

    /// Confine `/generate-json-document` output to this directory.
    #[arg(long = "documents-output-root", value_name = "PATH")]
    pub output_root: Option<PathBuf>,

    /// Override the directory that holds preview scratch files.
    #[arg(long = "documents-scratch-dir", value_name = "PATH")]
    pub scratch_dir: Option<PathBuf>,
}
