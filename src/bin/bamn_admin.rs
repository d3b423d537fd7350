//!
//! bamn admin provisioning
//! -----------------------
//! Creates an administrator account in the repository snapshot. Admin
//! accounts are never created through the HTTP API.
//!
//! The data file is owned by one process at a time, so this refuses to run
//! while a server holds it. Use `ADMIN_EMAIL`/`ADMIN_PASSWORD` on the server
//! to seed an admin at startup instead.

use anyhow::{bail, Result};

use bamn::config::{has_flag, parse_value_arg, DEFAULT_DATA_FILE};
use bamn::directory::FileRepository;

const USAGE: &str = "bamn admin provisioning

USAGE:
  bamn_admin --email EMAIL --password PASSWORD [--name NAME] [--data-file PATH]

OPTIONS:
  --email EMAIL       Admin login email
  --password PASS     Admin password (env: ADMIN_PASSWORD)
  --name NAME         Display name (default: Administrator)
  --data-file PATH    Repository snapshot file (env: BAMN_DATA_FILE, default data/bamn.json)

Run with the server stopped; the server locks the data file while it runs.
";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let Some(email) = parse_value_arg(&args, "--email").or_else(|| std::env::var("ADMIN_EMAIL").ok()) else {
        bail!("--email is required\n\n{}", USAGE);
    };
    let Some(password) = parse_value_arg(&args, "--password").or_else(|| std::env::var("ADMIN_PASSWORD").ok()) else {
        bail!("--password is required\n\n{}", USAGE);
    };
    let name = parse_value_arg(&args, "--name").unwrap_or_else(|| "Administrator".to_string());
    let data_file = parse_value_arg(&args, "--data-file")
        .or_else(|| std::env::var("BAMN_DATA_FILE").ok())
        .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

    let repo = FileRepository::open(&data_file)?;
    if bamn::security::ensure_default_admin(&repo, &email, &name, &password).await? {
        println!("Admin user created: {} ({})", email.trim().to_lowercase(), data_file);
    } else {
        println!("Admin user already exists: {}", email.trim().to_lowercase());
    }
    Ok(())
}
