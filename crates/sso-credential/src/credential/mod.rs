//! Credentials that turn an SSO token into scoped access tokens.
//!
//! - [`OnBehalfOfCredential`]: runs the on-behalf-of exchange itself (needs the client secret)
//! - [`RemoteTokenBroker`]: asks the simple-auth service to run it

mod obo;
mod provider;
mod remote;

pub use obo::OnBehalfOfCredential;
pub use provider::{IdentityProvider, ProviderError, ProviderErrorKind, ProviderToken};
pub use remote::{RemoteTokenBroker, SsoTokenSource, StaticSsoToken};

use crate::error::AuthResult;
use crate::scopes::Scopes;
use crate::token::{AccessToken, UserInfo};

/// Common surface of both credentials.
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// Access token for `scopes`; the SSO token itself when `scopes` is empty.
    async fn get_token(&self, scopes: &Scopes) -> AuthResult<AccessToken>;

    /// Identity of the signed-in user.
    async fn user_info(&self) -> AuthResult<UserInfo>;
}
