use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use learnimation_core::render::{RenderCommand, RenderQuality};
use learnimation_generator::GeneratorConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight render jobs to record their outcome on
    /// shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory holding one subdirectory per job (default: `storage/jobs`).
    pub storage_root: PathBuf,
    pub render: RenderConfig,
    /// `None` when `OPENAI_API_KEY` is unset, which disables generation.
    pub generator: Option<GeneratorConfig>,
}

/// How render workers are started and how long they may run.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub command: RenderCommand,
    /// Wall-clock budget of one worker run in seconds (default: `900`).
    pub timeout_secs: u64,
}

impl RenderConfig {
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `RENDER_PROGRAM`      | `python3`                    |
    /// | `RENDER_SCRIPT`       | `scripts/manim_renderer.py`  |
    /// | `RENDER_SCENE_CLASS`  | `GeneratedScene`             |
    /// | `RENDER_QUALITY`      | `low`                        |
    /// | `RENDER_TIMEOUT_SECS` | `900`                        |
    ///
    /// An empty `RENDER_SCRIPT` runs `RENDER_PROGRAM` without a script
    /// argument.
    pub fn from_env() -> Self {
        let program = std::env::var("RENDER_PROGRAM").unwrap_or_else(|_| "python3".into());

        let script = std::env::var("RENDER_SCRIPT")
            .unwrap_or_else(|_| "scripts/manim_renderer.py".into());
        let script = (!script.trim().is_empty()).then(|| resolve_path(script.trim()));

        let scene_class =
            std::env::var("RENDER_SCENE_CLASS").unwrap_or_else(|_| "GeneratedScene".into());

        let quality: RenderQuality = std::env::var("RENDER_QUALITY")
            .unwrap_or_else(|_| "low".into())
            .parse()
            .expect("RENDER_QUALITY must be low, medium or high");

        let timeout_secs: u64 = std::env::var("RENDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "900".into())
            .parse()
            .expect("RENDER_TIMEOUT_SECS must be a valid u64");

        Self {
            command: RenderCommand {
                program,
                script,
                scene_class,
                quality,
            },
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Anchor a relative path to the current working directory.
fn resolve_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Output format of the tracing subscriber, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines (default).
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`pretty` or `json`, default `pretty`).
    ///
    /// Read before [`ServerConfig::from_env`] because the subscriber is
    /// installed first.
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|raw| raw.parse().expect("LOG_FORMAT must be pretty or json"))
            .unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// | Env Var          | Default                      |
/// |------------------|------------------------------|
/// | `OPENAI_API_KEY` | unset (generator disabled)   |
/// | `OPENAI_MODEL`   | `gpt-4o-mini`                |
/// | `OPENAI_API_URL` | `https://api.openai.com/v1`  |
fn generator_config_from_env() -> Option<GeneratorConfig> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())?;

    Some(GeneratorConfig {
        api_url: std::env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
        api_key,
        model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
    })
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STORAGE_ROOT`         | `storage/jobs`             |
    ///
    /// Relative paths (`STORAGE_ROOT`, `RENDER_SCRIPT`) are resolved against
    /// the working directory at startup.
    ///
    /// Render and generator settings are described on [`RenderConfig`] and
    /// [`GeneratorConfig`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let storage_root =
            resolve_path(&std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "storage/jobs".into()));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            storage_root,
            render: RenderConfig::from_env(),
            generator: generator_config_from_env(),
        }
    }
}
