//! Request authorizer.
//!
//! Resolves the credential on an inbound request to a principal and produces an allow
//! decision scoped to exactly one resource. Every failure ends up as one of two errors:
//! `NotSignedIn` when no credential was offered, `Unauthorized` for everything else.
//! Causes are logged here and never handed to the caller.
use std::{fmt, str::FromStr};

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AppEnv, Config};
use crate::services::auth::credential::{
    self, AuthorizationValue, Credential, CredentialSource,
};
use crate::services::auth::key_material::{self, KeyMaterialError};
use crate::services::auth::policy::{AuthorizerResponse, Effect};

/// Session value that skips verification in development builds.
pub const DEV_BYPASS_TOKEN: &str = "dev-session";
/// Principal bound to the development bypass.
pub const DEV_PRINCIPAL: &str = "dev@localhost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizerMode {
    /// `Authorization` header only.
    Bearer,
    /// Session cookie first, then `Authorization`.
    Session,
}

impl FromStr for AuthorizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(Self::Bearer),
            "session" | "cookie" => Ok(Self::Session),
            other => Err(format!("unknown authorizer mode: {other}")),
        }
    }
}

/// What the caller gets to see.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizerError {
    #[error("Not Signed In")]
    NotSignedIn,
    #[error("Unauthorized")]
    Unauthorized,
}

/// Why a credential was rejected. Logged, then collapsed to `Unauthorized`.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("authorization header is not `<scheme> <token>`")]
    MalformedAuthorization,
    #[error("verified token has no usable '{0}' claim")]
    MissingClaim(&'static str),
    #[error("no resource identifier to scope the decision to")]
    MissingResource,
}

/// Claims read from the identity provider's session token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub sid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalSource {
    Bearer,
    Session,
    DevBypass,
}

impl From<CredentialSource> for PrincipalSource {
    fn from(source: CredentialSource) -> Self {
        match source {
            CredentialSource::Bearer => Self::Bearer,
            CredentialSource::Session => Self::Session,
        }
    }
}

/// The authenticated caller for one request.
///
/// `id` is the email claim and is what downstream handlers filter rows by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub subject: Option<String>,
    pub session_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub source: PrincipalSource,
}

impl Principal {
    fn development() -> Self {
        Self {
            id: DEV_PRINCIPAL.to_string(),
            subject: None,
            session_id: None,
            expires_at: None,
            source: PrincipalSource::DevBypass,
        }
    }
}

/// Inputs for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizerRequest<'a> {
    pub headers: &'a HeaderMap,
    /// Credential the platform already lifted out of the request (token-type gateway events).
    pub authorization_token: Option<&'a str>,
    /// Resource the allow decision is scoped to.
    pub resource: &'a str,
}

impl<'a> AuthorizerRequest<'a> {
    pub fn new(headers: &'a HeaderMap, resource: &'a str) -> Self {
        Self {
            headers,
            authorization_token: None,
            resource,
        }
    }

    pub fn with_authorization_token(mut self, token: Option<&'a str>) -> Self {
        self.authorization_token = token;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub principal: Principal,
    pub effect: Effect,
    pub resource: String,
}

impl Decision {
    pub fn to_response(&self) -> AuthorizerResponse {
        AuthorizerResponse::single(self.principal.id.clone(), self.effect, self.resource.clone())
    }
}

/// Built once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct Authorizer {
    decoding_key: DecodingKey,
    validation: Validation,
    mode: AuthorizerMode,
    session_cookie_name: String,
    app_env: AppEnv,
    dev_bypass_compiled: bool,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Authorizer")
            .field("validation", &self.validation)
            .field("mode", &self.mode)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("app_env", &self.app_env)
            .field("dev_bypass_compiled", &self.dev_bypass_compiled)
            .finish()
    }
}

impl Authorizer {
    pub fn new(config: &Config) -> Result<Self, KeyMaterialError> {
        let decoding_key =
            key_material::decoding_key(&config.jwt_public_key_pem, config.jwt_algorithm)?;

        // exp is required and checked by default
        let mut validation = Validation::new(config.jwt_algorithm);
        validation.leeway = config.access_token_leeway_seconds;
        validation.validate_nbf = true;
        if let Some(issuer) = &config.auth_issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.auth_audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
            mode: config.auth_mode,
            session_cookie_name: config.session_cookie_name.clone(),
            app_env: config.app_env,
            dev_bypass_compiled: cfg!(feature = "dev-bypass"),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_dev_bypass_compiled(mut self) -> Self {
        self.dev_bypass_compiled = true;
        self
    }

    pub fn dev_bypass_active(&self) -> bool {
        self.dev_bypass_compiled
            && self.mode == AuthorizerMode::Session
            && self.app_env == AppEnv::Development
    }

    /// Evaluates one request.
    pub fn authorize(&self, request: &AuthorizerRequest<'_>) -> Result<Decision, AuthorizerError> {
        let credential = self.extract(request)?;
        let principal = self.authenticate(&credential)?;

        let resource = request.resource.trim();
        if resource.is_empty() {
            tracing::warn!(
                error = %VerifyError::MissingResource,
                principal = %principal.id,
                "refusing unscoped authorization"
            );
            return Err(AuthorizerError::Unauthorized);
        }

        tracing::debug!(
            principal = %principal.id,
            source = ?principal.source,
            resource = %resource,
            "request authorized"
        );

        Ok(Decision {
            principal,
            effect: Effect::Allow,
            resource: resource.to_string(),
        })
    }

    fn extract(&self, request: &AuthorizerRequest<'_>) -> Result<Credential, AuthorizerError> {
        if self.mode == AuthorizerMode::Session
            && let Some(token) = credential::session_cookie(request.headers, &self.session_cookie_name)
        {
            return Ok(Credential {
                token: token.to_string(),
                source: CredentialSource::Session,
            });
        }

        match credential::authorization_value(request.headers, request.authorization_token) {
            AuthorizationValue::Token(token) => Ok(Credential {
                token: token.to_string(),
                source: CredentialSource::Bearer,
            }),
            AuthorizationValue::Malformed => {
                tracing::warn!(error = %VerifyError::MalformedAuthorization, "credential rejected");
                Err(AuthorizerError::Unauthorized)
            }
            AuthorizationValue::Absent => Err(AuthorizerError::NotSignedIn),
        }
    }

    fn authenticate(&self, credential: &Credential) -> Result<Principal, AuthorizerError> {
        if credential.source == CredentialSource::Session
            && credential.token == DEV_BYPASS_TOKEN
            && self.dev_bypass_active()
        {
            tracing::warn!(principal = DEV_PRINCIPAL, "development session bypass used");
            return Ok(Principal::development());
        }

        self.verify(credential).map_err(|err| {
            tracing::warn!(
                error = %err,
                source = ?credential.source,
                "credential verification failed"
            );
            AuthorizerError::Unauthorized
        })
    }

    /// Signature and time checks, then principal extraction.
    pub fn verify(&self, credential: &Credential) -> Result<Principal, VerifyError> {
        let data = jsonwebtoken::decode::<SessionClaims>(
            &credential.token,
            &self.decoding_key,
            &self.validation,
        )?;
        let claims = data.claims;

        let email = claims
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(VerifyError::MissingClaim("email"))?;

        let expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        Ok(Principal {
            id: email,
            subject: claims.sub,
            session_id: claims.sid,
            expires_at,
            source: credential.source.into(),
        })
    }
}
