//!
//! bamn server binary
//! ------------------
//! Starts the mentor directory HTTP API. Configuration comes from the
//! environment (see `bamn::config`); `--http-port` and `--data-file` override it.

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bamn::config::{has_flag, parse_port_arg, parse_value_arg, Settings};

const USAGE: &str = "bamn Server

USAGE:
  bamn_server [--http-port N] [--data-file PATH]

OPTIONS:
  --http-port N       HTTP API port (env: BAMN_HTTP_PORT, default 8000)
  --data-file PATH    Repository snapshot file (env: BAMN_DATA_FILE, default data/bamn.json)

ENVIRONMENT:
  SECRET_KEY (required), ALGORITHM, ACCESS_TOKEN_EXPIRE_MINUTES, API_V1_STR,
  BACKEND_CORS_ORIGINS, DEBUG, ENVIRONMENT, ADMIN_EMAIL, ADMIN_PASSWORD, RUST_LOG
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let mut settings = Settings::from_env()?;
    // CLI arguments override environment
    if let Some(port) = parse_port_arg(&args, "--http-port") {
        settings.http_port = port;
    }
    if let Some(path) = parse_value_arg(&args, "--data-file") {
        settings.data_file = path.into();
    }

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "bamn",
        "bamn starting: RUST_LOG='{}', http_port={}, data_file='{}', algorithm={:?}, token_minutes={}",
        rust_log,
        settings.http_port,
        settings.data_file.display(),
        settings.algorithm,
        settings.access_token_expire_minutes
    );

    bamn::server::run(settings).await
}
