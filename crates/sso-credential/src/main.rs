//! SSO Credential - Entry Point
//!
//! Decodes SSO tokens, exchanges them locally or through a simple-auth
//! service, and hosts that service.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sso_credential::credential::StaticSsoToken;
use sso_credential::server::AuthService;
use sso_credential::{
    AuthConfig, OnBehalfOfCredential, RemoteTokenBroker, Scopes, TokenCredential, parse_token,
};

#[derive(Parser, Debug)]
#[command(name = "sso-credential")]
#[command(about = "Exchange SSO tokens for scoped access tokens")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the claims carried by a token
    Decode {
        /// Raw token
        token: String,
    },
    /// Run the on-behalf-of exchange locally (needs the client secret)
    Exchange {
        /// SSO token of the signed-in user
        #[arg(long, env = "SSO_TOKEN")]
        sso_token: String,

        /// Space-delimited scopes; empty returns the SSO token
        #[arg(long, default_value = "")]
        scopes: String,
    },
    /// Ask the simple-auth service for a token
    Fetch {
        /// SSO token of the signed-in user
        #[arg(long, env = "SSO_TOKEN")]
        sso_token: String,

        /// Space-delimited scopes; empty returns the SSO token
        #[arg(long, default_value = "")]
        scopes: String,

        /// Print the interactive login URL for the scopes instead
        #[arg(long)]
        login_url: bool,
    },
    /// Host the simple-auth token exchange service
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "5000", env = "PORT")]
        port: u16,
    },
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = AuthConfig::from_env();

    match cli.command {
        Command::Decode { token } => {
            let claims = parse_token(&token)?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Command::Exchange { sso_token, scopes } => {
            let credential: Box<dyn TokenCredential> =
                Box::new(OnBehalfOfCredential::new(&config, &sso_token)?);
            print_token(credential.as_ref(), &Scopes::parse(&scopes)).await?;
        }
        Command::Fetch { sso_token, scopes, login_url } => {
            let broker = RemoteTokenBroker::new(&config, Arc::new(StaticSsoToken::new(sso_token)))?;
            let scopes = Scopes::parse(&scopes);

            if login_url {
                println!("{}", broker.login_url(&scopes)?);
            } else {
                let credential: Box<dyn TokenCredential> = Box::new(broker);
                print_token(credential.as_ref(), &scopes).await?;
            }
        }
        Command::Serve { port } => {
            tracing::info!(version = env!("CARGO_PKG_VERSION"), port, "Starting token exchange service");
            AuthService::new(&config)?.run_http(port).await?;
        }
    }

    Ok(())
}

async fn print_token(credential: &dyn TokenCredential, scopes: &Scopes) -> anyhow::Result<()> {
    let token = credential.get_token(scopes).await.inspect_err(|e| {
        tracing::error!(code = %e.code(), error = %e, "Failed to get token");
    })?;
    println!("{}", serde_json::to_string_pretty(&token)?);
    Ok(())
}
