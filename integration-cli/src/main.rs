use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common_http_client::{HttpClientConfig, RequestOptions};
use common_token_auth::IntegrationAuth;
use integration_cli::{commands, init};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "integration-api", version, about = "Server-to-server integration tokens")]
struct Cli {
    /// Load settings from this env file before reading the environment
    #[arg(long, global = true, env = "INTEGRATION_API_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a configuration template for this service
    Init {
        #[arg(long, default_value = init::DEFAULT_ENV_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Print a freshly signed token
    Sign {
        #[arg(long, default_value = "System")]
        issuer: String,
        /// JSON payload embedded as the `data` claim
        #[arg(long)]
        data: Option<String>,
        /// Lifetime in seconds; the configured TTL when omitted
        #[arg(long)]
        ttl: Option<i64>,
        /// Sign with this secret instead of the configured one
        #[arg(long)]
        secret: Option<String>,
    },

    /// Check a token and print its claims
    Verify {
        token: String,
        #[arg(long)]
        secret: Option<String>,
    },

    /// Send an authenticated request
    Request {
        /// GET, POST, PUT or DELETE
        method: String,
        url: String,
        /// JSON request body for POST/PUT
        #[arg(long)]
        body: Option<String>,
        /// Send the body as-is instead of wrapping it as {"data": ...}
        #[arg(long, default_value_t = false)]
        no_wrap: bool,
        #[arg(long, default_value = "System")]
        sender: String,
        /// JSON payload embedded in the token
        #[arg(long)]
        token_data: Option<String>,
        #[arg(long)]
        secret: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load env file {}", path.display()))?;
    }

    match cli.cmd {
        Command::Init { path, force } => {
            init::write_template(&path, force)?;
            info!(path = %path.display(), "integration configuration template written");
            println!("IntegrationApi installed! Edit {} before use.", path.display());
        }
        Command::Sign {
            issuer,
            data,
            ttl,
            secret,
        } => {
            let auth = IntegrationAuth::from_env()?;
            let data = commands::parse_json(data.as_deref())?;
            println!("{}", commands::sign(&auth, &issuer, data, ttl, secret)?);
        }
        Command::Verify { token, secret } => {
            let auth = IntegrationAuth::from_env()?;
            println!("{}", commands::verify(&auth, &token, secret.as_deref())?);
        }
        Command::Request {
            method,
            url,
            body,
            no_wrap,
            sender,
            token_data,
            secret,
        } => {
            let auth = IntegrationAuth::from_env()?;
            let http = HttpClientConfig::from_env()?;
            let body = commands::parse_json(body.as_deref())?;

            let mut options = RequestOptions::new().sender(sender).wrap_in_data(!no_wrap);
            if let Some(data) = commands::parse_json(token_data.as_deref())? {
                options = options.token_data(data);
            }
            if let Some(secret) = secret {
                options = options.secret_override(secret);
            }

            let (status, text) =
                commands::request(&auth, &http, &method, &url, body, options).await?;
            println!("{status}");
            if !text.is_empty() {
                println!("{text}");
            }
        }
    }

    Ok(())
}
