// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token encoding and validation.
//!
//! Tokens are compact JWTs signed with a single long-lived symmetric secret.
//! Validation checks the signature only; audience and issuer are never
//! checked, and `exp` is checked only under [`ExpiryPolicy::Enforce`].

use std::collections::HashSet;

use chrono::{DateTime, Months, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::claims::{Principal, SessionClaims};
use super::AuthError;
use crate::config::{ensure_symmetric, ConfigError, ExpiryPolicy, TokenSettings};

/// Lifetime baked into every issued token.
pub const TOKEN_LIFETIME: Months = Months::new(12);

/// Signs and reads session tokens. Key material is fixed for the process lifetime.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    expiry_policy: ExpiryPolicy,
}

impl TokenCodec {
    /// Build a codec from validated settings.
    pub fn new(settings: &TokenSettings) -> Result<Self, ConfigError> {
        if settings.secret.is_empty() {
            return Err(ConfigError::EmptySigningKey);
        }
        ensure_symmetric(settings.algorithm)?;

        let secret = settings.secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: settings.algorithm,
            expiry_policy: settings.expiry_policy,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        self.expiry_policy
    }

    /// Issue a token for `principal`, valid for one year from now.
    pub fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        self.issue_at(principal, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        principal: &Principal,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at
            .checked_add_months(TOKEN_LIFETIME)
            .ok_or_else(|| AuthError::InternalError("token expiry out of range".to_string()))?;

        let claims = SessionClaims {
            subject: principal.user_name.clone(),
            user_id: principal.user_id.clone(),
            exp: expires_at.timestamp(),
            iat: Some(issued_at.timestamp()),
            nbf: Some(issued_at.timestamp()),
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))
    }

    /// Read claims without checking signature or expiry.
    ///
    /// Only for identity association; never use the result for an
    /// authorization decision.
    pub fn decode_unchecked(token: &str) -> Option<SessionClaims> {
        jsonwebtoken::dangerous::insecure_decode::<SessionClaims>(token)
            .ok()
            .map(|data| data.claims)
    }

    /// `true` when the token carries a valid signature for the configured key.
    pub fn validate(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }

    /// Verify the token and return its claims, reporting why it was rejected.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                _ => AuthError::MalformedToken,
            })
    }

    /// Value of a single claim, read without verification.
    ///
    /// String claims are returned as-is; other JSON values in their text form.
    pub fn get_claim(token: &str, claim: &str) -> Result<String, AuthError> {
        let claims = jsonwebtoken::dangerous::insecure_decode::<Map<String, Value>>(token)
            .map_err(|_| AuthError::MalformedToken)?
            .claims;

        match claims.get(claim) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Null) | None => Err(AuthError::ClaimNotFound(claim.to_string())),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_aud = false;
        validation.validate_nbf = false;
        match self.expiry_policy {
            ExpiryPolicy::Ignore => {
                validation.validate_exp = false;
                validation.required_spec_claims = HashSet::new();
            }
            ExpiryPolicy::Enforce => {
                validation.validate_exp = true;
                validation.leeway = 0;
            }
        }
        validation
    }
}
