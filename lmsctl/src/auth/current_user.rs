//! Request identity resolution.
//!
//! Every request is resolved independently: the bearer credential is pulled
//! from the `Authorization` header and decoded through the [`TokenCodec`].
//! Nothing is cached between requests - tokens are immutable and decoding is
//! cheap - and the resulting [`CurrentUser`] is handed to the handler by value,
//! so no handler can mutate another's view of the principal.
//!
//! A missing or undecodable credential does not abort the request here; the
//! route's own extractor choice decides. Handlers taking [`CurrentUser`]
//! reject with 401, handlers taking `Option<CurrentUser>` proceed
//! unauthenticated.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::{debug, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{AuthError, token::TokenCodec},
    errors::Error,
};

/// Extract and validate the bearer credential from request parts.
///
/// Returns:
/// - `None`: no bearer credential present
/// - `Some(Ok(user))`: credential present and valid
/// - `Some(Err(error))`: credential present but undecodable
pub fn resolve_principal(parts: &Parts, codec: &TokenCodec) -> Option<std::result::Result<CurrentUser, AuthError>> {
    let header = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    // A header that is not valid UTF-8 or not Bearer-shaped is treated as absent
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?;

    Some(codec.decode(token).map(CurrentUser::from))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, &state.token_codec) {
            Some(Ok(user)) => {
                trace!("Resolved bearer principal: {} ({})", user.username, user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                // The failure kind stays in the logs; the response is a bare 401
                debug!("Bearer token rejected: {e}");
                Err(Error::Unauthenticated { message: None })
            }
            None => {
                trace!("No bearer credential on request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Option<Self>, Self::Rejection> {
        match resolve_principal(parts, &state.token_codec) {
            Some(Ok(user)) => Ok(Some(user)),
            Some(Err(e)) => {
                // Invalid credentials on an optional route degrade to anonymous
                debug!("Bearer token rejected, continuing unauthenticated: {e}");
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
