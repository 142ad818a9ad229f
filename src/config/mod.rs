//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{CliArgs, Command, GenerateArgs, ServeOverrides};

use crate::application::render::DEFAULT_MAX_DEPTH;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "docgen";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_FRONTEND_URL: &str = "https://docexp.onrender.com";
const DEFAULT_ENVIRONMENT: &str = "development";
const HOSTED_SCRATCH_DIR: &str = "/tmp";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub frontend: FrontendSettings,
    pub deployment: DeploymentSettings,
    pub render: RenderSettings,
    pub documents: DocumentsSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct FrontendSettings {
    /// Redirect target for `GET /`, validated as an absolute URL.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct DeploymentSettings {
    pub environment: String,
    pub hosted: bool,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub max_depth: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct DocumentsSettings {
    pub scratch_dir: PathBuf,
    pub output_root: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    load_from(cli, None)
}

/// Same as [`load`], reading `DOCGEN__*` variables from `env` instead of the
/// process environment when given.
fn load_from(
    cli: &CliArgs,
    env: Option<config::Map<String, String>>,
) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("DOCGEN")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    frontend: RawFrontendSettings,
    deployment: RawDeploymentSettings,
    render: RawRenderSettings,
    documents: RawDocumentsSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(debug) = overrides.debug {
            self.logging.debug = Some(debug);
        }
        if let Some(url) = overrides.frontend_url.as_ref() {
            self.frontend.url = Some(url.clone());
        }
        if let Some(environment) = overrides.hosted_environment.as_ref() {
            self.deployment.hosted = Some(true);
            self.deployment.environment = Some(environment.clone());
        }
        if let Some(depth) = overrides.render_max_depth {
            self.render.max_depth = Some(depth);
        }
        if let Some(root) = overrides.output_root.as_ref() {
            self.documents.output_root = Some(root.clone());
        }
        if let Some(dir) = overrides.scratch_dir.as_ref() {
            self.documents.scratch_dir = Some(dir.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            frontend,
            deployment,
            render,
            documents,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let frontend = build_frontend_settings(frontend)?;
        let deployment = build_deployment_settings(deployment);
        let render = build_render_settings(render)?;
        let documents = build_documents_settings(documents, &deployment)?;

        Ok(Self {
            server,
            logging,
            frontend,
            deployment,
            render,
            documents,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None if logging.debug.unwrap_or(false) => LevelFilter::DEBUG,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_frontend_settings(frontend: RawFrontendSettings) -> Result<FrontendSettings, LoadError> {
    let url = frontend
        .url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());

    Url::parse(&url).map_err(|err| {
        LoadError::invalid("frontend.url", format!("invalid URL `{url}`: {err}"))
    })?;

    Ok(FrontendSettings { url })
}

fn build_deployment_settings(deployment: RawDeploymentSettings) -> DeploymentSettings {
    let environment = deployment
        .environment
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

    DeploymentSettings {
        environment,
        hosted: deployment.hosted.unwrap_or(false),
    }
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let value = render.max_depth.unwrap_or(DEFAULT_MAX_DEPTH as u64);
    let value = usize::try_from(value).map_err(|_| {
        LoadError::invalid("render.max_depth", "value exceeds supported range for usize")
    })?;
    let max_depth = NonZeroUsize::new(value)
        .ok_or_else(|| LoadError::invalid("render.max_depth", "must be greater than zero"))?;

    Ok(RenderSettings { max_depth })
}

fn build_documents_settings(
    documents: RawDocumentsSettings,
    deployment: &DeploymentSettings,
) -> Result<DocumentsSettings, LoadError> {
    let scratch_dir = match documents.scratch_dir {
        Some(dir) if dir.as_os_str().is_empty() => {
            return Err(LoadError::invalid(
                "documents.scratch_dir",
                "path must not be empty",
            ));
        }
        Some(dir) => dir,
        None if deployment.hosted => PathBuf::from(HOSTED_SCRATCH_DIR),
        None => std::env::temp_dir(),
    };

    let output_root = documents
        .output_root
        .filter(|root| !root.as_os_str().is_empty());

    Ok(DocumentsSettings {
        scratch_dir,
        output_root,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
    debug: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFrontendSettings {
    url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDeploymentSettings {
    environment: Option<String>,
    hosted: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    max_depth: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDocumentsSettings {
    scratch_dir: Option<PathBuf>,
    output_root: Option<PathBuf>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}
