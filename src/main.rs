//! reqpath: inspect how a URL decomposes into base path and script path.
//!
//! ```text
//! reqpath http://localhost/app/index.php/users/5 --base-path /app/index.php
//! ```
//!
//! Prints a JSON snapshot of the resulting request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;

use reqpath::config::{load_config, AppConfig};
use reqpath::observability::init_logging;
use reqpath::{Request, RequestOverrides};

#[derive(Parser)]
#[command(name = "reqpath")]
#[command(about = "Resolve a request URL into path, base path and script path", long_about = None)]
struct Cli {
    /// Request URL, absolute or origin-form (e.g. "/index.php/users?page=2").
    url: String,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    method: Option<String>,

    #[arg(long)]
    scheme: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Overrides the path found in the URL.
    #[arg(long)]
    path: Option<String>,

    /// Deployment prefix; defaults to `deployment.base_path` from the config.
    #[arg(short, long)]
    base_path: Option<String>,

    #[arg(short, long)]
    script_path: Option<String>,

    /// Header as "Name: value"; may be repeated.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Route parameter as "name=value"; may be repeated.
    #[arg(short = 'P', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once(':')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected \"Name: value\", got \"{}\"", raw))
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected \"name=value\", got \"{}\"", raw))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    init_logging(&config.logging.filter)?;

    let overrides = RequestOverrides {
        method: cli.method,
        scheme: cli.scheme,
        host: cli.host,
        port: cli.port,
        path: cli.path,
        base_path: cli.base_path.or(config.deployment.base_path.clone()),
        script_path: cli.script_path,
        headers: (!cli.headers.is_empty()).then(|| cli.headers.into_iter().collect::<BTreeMap<_, _>>()),
        params: (!cli.params.is_empty()).then(|| cli.params.into_iter().collect::<BTreeMap<_, _>>()),
        ..RequestOverrides::default()
    };

    let request = Request::with_defaults(&cli.url, overrides, &config.defaults)?;
    tracing::debug!(url = %cli.url, resolution = ?request.resolution(), "Request built");

    println!("{}", serde_json::to_string_pretty(&request.snapshot())?);
    Ok(())
}
