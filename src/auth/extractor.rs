// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated sessions.
//!
//! Use the `Auth` extractor in handlers to require a valid, unrevoked token:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(session): Auth) -> impl IntoResponse {
//!     // session is AuthenticatedSession
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedSession};
use crate::state::AppState;

/// Raw `Authorization` header value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidAuthHeader))
        .transpose()
}

/// Extractor for authenticated sessions.
///
/// Runs [`AuthResolver::authenticate`](super::AuthResolver::authenticate):
/// signature, expiry policy and revocation. Rejects with 503 when the
/// revocation store cannot be consulted.
pub struct Auth(pub AuthenticatedSession);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthenticatedSession>().cloned() {
            return Ok(Auth(session));
        }

        let header = authorization_header(&parts.headers)?;
        let session = state.resolver.authenticate(header).await?;

        parts.extensions.insert(session.clone());
        Ok(Auth(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Principal;
    use crate::state::tests::test_state;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _) = test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let (state, _) = test_state();
        let token = state
            .resolver
            .codec()
            .issue(&Principal::new("u-1", "ada@example.com"))
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}").as_str()));

        let Auth(session) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(session.subject(), "ada@example.com");
        assert!(parts.extensions.get::<AuthenticatedSession>().is_some());
    }

    #[tokio::test]
    async fn auth_extractor_rejects_forged_token() {
        let (state, _) = test_state();
        let mut parts = parts_with_header(Some("Bearer abc.def.ghi"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }
}
