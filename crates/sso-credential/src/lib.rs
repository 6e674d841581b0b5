//! SSO Credential
//!
//! Turns a signed-in user's SSO token into access tokens for downstream APIs.
//!
//! # Features
//!
//! - **Token parsing**: Decodes v1 and v2 identity tokens without signature checks
//! - **On-behalf-of exchange**: Runs the `jwt-bearer` grant against the identity provider
//! - **Remote broker**: Delegates the exchange to a simple-auth service when the
//!   client secret must stay server-side
//! - **Cached**: Tokens are reused until five minutes before expiry
//!
//! # Example
//!
//! ```no_run
//! use sso_credential::{AuthConfig, OnBehalfOfCredential, Scopes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AuthConfig::from_env();
//!     let credential = OnBehalfOfCredential::new(&config, "<sso token>")?;
//!
//!     let token = credential.get_token(&Scopes::parse("User.Read")).await?;
//!     println!("expires at {}", token.expires_on_timestamp);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod scopes;
pub mod server;
pub mod token;

pub use cache::{TokenCache, derive_assertion_bound_cache_key, derive_cache_key};
pub use config::AuthConfig;
pub use credential::{OnBehalfOfCredential, RemoteTokenBroker, TokenCredential};
pub use error::{AuthError, AuthResult, ErrorCode};
pub use scopes::Scopes;
pub use token::{AccessToken, DecodedClaims, SsoToken, UserInfo, parse_token};
