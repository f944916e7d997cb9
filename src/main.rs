use clap::{Parser, Subcommand};
use csb_client::{
    AppState, Credentials, CredentialsStore, CsbClient, CsbRequest, RequestConfig,
    ResponseFormat, app_state::DEFAULT_MAX_SKEW, create_app,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// Gateway configuration
const HOST: &str = "127.0.0.1";
const PORT: u16 = 8086;

// Default credentials accepted by the local gateway
const DEFAULT_ACCESS_KEY: &str = "ak-local-gateway";
const DEFAULT_SECRET_KEY: &str = "sk-local-gateway";

/// csb: signed client for APIs published through the CSB gateway
#[derive(Parser, Debug)]
#[command(name = "csb")]
#[command(about = "Call CSB-published APIs with signed requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign and send one request described in a JSON or YAML file
    Call {
        /// Path to the request description
        #[arg(short, long, env = "CSB_REQUEST")]
        request: String,

        /// Access key, overrides the one in the request file
        #[arg(long)]
        access_key: Option<String>,

        /// Secret key, overrides the one in the request file
        #[arg(long)]
        secret_key: Option<String>,

        /// Default timeout in seconds when the request file sets none
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },

    /// Run a local gateway that verifies CSB signatures and echoes requests back
    Gateway {
        /// Host to bind to
        #[arg(long, env = "HOST", default_value = HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = PORT)]
        port: u16,

        /// Access key accepted by the gateway
        #[arg(long, env = "CSB_ACCESS_KEY", default_value = DEFAULT_ACCESS_KEY)]
        access_key: String,

        /// Secret key for the accepted access key
        #[arg(long, env = "CSB_SECRET_KEY", default_value = DEFAULT_SECRET_KEY, hide_env_values = true)]
        secret_key: String,

        /// Tolerated clock skew in seconds
        #[arg(long, default_value_t = DEFAULT_MAX_SKEW.as_secs())]
        max_skew_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    // Values from a .env file feed the clap env fallbacks
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Call {
            request,
            access_key,
            secret_key,
            timeout_secs,
        } => call(request, access_key, secret_key, timeout_secs).await,
        Command::Gateway {
            host,
            port,
            access_key,
            secret_key,
            max_skew_secs,
        } => gateway(host, port, access_key, secret_key, max_skew_secs).await,
    }
}

async fn call(
    path: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    timeout_secs: u64,
) {
    let mut config = match RequestConfig::from_file(&path) {
        Ok(cfg) => {
            tracing::info!("Loaded request from {}", path);
            cfg
        }
        Err(e) => {
            tracing::error!("{}: {}", e, source_of(&e));
            std::process::exit(1);
        }
    };

    if access_key.is_some() {
        config.access_key = access_key;
    }
    if secret_key.is_some() {
        config.secret_key = secret_key;
    }

    // Neither the file nor the flags carry keys: fall back to CSB_ACCESS_KEY / CSB_SECRET_KEY
    if config.access_key.is_none() && config.secret_key.is_none() {
        match Credentials::from_env() {
            Ok(credentials) => {
                tracing::info!("Using credentials from the environment");
                config.access_key = Some(credentials.access_key().to_string());
                config.secret_key = Some(credentials.expose_secret().to_string());
            }
            Err(e) => tracing::debug!("No credentials in the environment: {}", e),
        }
    }

    let request = match CsbRequest::try_from(config) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Invalid request: {}", e);
            std::process::exit(1);
        }
    };

    let client = match CsbClient::new(Duration::from_secs(timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let response = match client.send(&request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Call failed: {}: {}", e, source_of(&e));
            std::process::exit(1);
        }
    };

    match response.format() {
        ResponseFormat::Json => match response.decode::<serde_json::Value>() {
            Ok(decoded) => {
                if let Some(value) = decoded.structured() {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
                    );
                }
            }
            Err(e) => {
                tracing::error!("{}: {}", e, source_of(&e));
                std::process::exit(1);
            }
        },
        ResponseFormat::Xml | ResponseFormat::Plain => {
            println!("{}", String::from_utf8_lossy(&response.body));
        }
    }
}

async fn gateway(
    host: String,
    port: u16,
    access_key: String,
    secret_key: String,
    max_skew_secs: u64,
) {
    tracing::info!("Accepting access key: {}", access_key);

    let credentials = CredentialsStore::new([Credentials::new(access_key, secret_key)]);
    let app_state = AppState::new(credentials, Duration::from_secs(max_skew_secs));
    let app = create_app(app_state);

    let addr = format!("{}:{}", host, port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Local CSB gateway listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Gateway stopped: {}", e);
        std::process::exit(1);
    }
}

fn source_of(err: &dyn std::error::Error) -> String {
    err.source().map(|s| s.to_string()).unwrap_or_default()
}
