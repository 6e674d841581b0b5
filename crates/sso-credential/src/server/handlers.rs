//! Token exchange endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejection;

use super::AuthServiceState;
use crate::client::{ServiceErrorBody, TokenExchangeRequest};
use crate::config::api;
use crate::credential::OnBehalfOfCredential;
use crate::error::AuthError;
use crate::scopes::Scopes;

/// Exception type clients treat as "log in first".
pub const UI_REQUIRED_EXCEPTION: &str = "AadUiRequiredException";

impl AuthError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::UiRequired(_) | Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidConfiguration(_) | Self::Internal(_) | Self::InvalidToken(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Service(_) | Self::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }

    const fn exception_type(&self) -> &'static str {
        match self {
            Self::UiRequired(_) => UI_REQUIRED_EXCEPTION,
            Self::InvalidParameter(_) => "InvalidParameterException",
            Self::TokenExpired(_) => "TokenExpiredException",
            Self::InvalidConfiguration(_) => "InvalidConfigurationException",
            Self::Internal(_) | Self::InvalidToken(_) => "InternalServerException",
            Self::Service(_) | Self::Http(_) => "ServiceException",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ServiceErrorBody {
            error_type: self.exception_type().to_string(),
            code: self.code().as_str().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sso-credential",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `POST /auth/token`
///
/// Exchanges the caller's bearer SSO token for a token carrying `scope`.
pub async fn handle_token(
    State(state): State<Arc<AuthServiceState>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    body: Result<Json<TokenExchangeRequest>, JsonRejection>,
) -> Response {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ServiceErrorBody {
                error_type: UI_REQUIRED_EXCEPTION.to_string(),
                code: "UiRequiredError".to_string(),
                message: "Missing bearer SSO token".to_string(),
            }),
        )
            .into_response();
    };

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return AuthError::invalid_parameter(rejection.body_text()).into_response();
        }
    };

    if req.grant_type != api::SSO_TOKEN_GRANT_TYPE {
        return AuthError::invalid_parameter(format!(
            "unsupported grant_type '{}'",
            req.grant_type
        ))
        .into_response();
    }

    let scopes = Scopes::parse(&req.scope);
    if scopes.is_empty() {
        return AuthError::invalid_parameter("scope is required").into_response();
    }

    // Bearer tokens are not signature-checked here, so cache entries are
    // keyed by the exact token bytes as well as its claims.
    let credential = match OnBehalfOfCredential::with_provider(
        state.settings.clone(),
        bearer.token(),
        Arc::clone(&state.provider),
        state.cache.clone(),
    ) {
        Ok(credential) => credential.bind_cache_to_assertion(),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected undecodable SSO token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ServiceErrorBody {
                    error_type: UI_REQUIRED_EXCEPTION.to_string(),
                    code: e.code().as_str().to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    match credential.get_token(&scopes).await {
        Ok(token) => Json(token).into_response(),
        Err(e) => {
            tracing::info!(code = %e.code(), error = %e, "Token exchange failed");
            e.into_response()
        }
    }
}
