/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 検証鍵 (PEM) の組み立てはここで一度だけ行う
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::services::auth::{AuthorizerMode, key_material};

pub const DEFAULT_SESSION_COOKIE: &str = "__session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    /// Only an explicit development marker counts as development.
    /// Unset or unknown values fall back to production.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("development" | "dev" | "local") => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth_mode: AuthorizerMode,
    pub session_cookie_name: String,
    pub jwt_algorithm: Algorithm,
    pub jwt_public_key_pem: String,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,

    pub clerk_webhook_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (process env in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let auth_mode = match non_empty("AUTH_MODE") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("AUTH_MODE"))?,
            None => AuthorizerMode::Bearer,
        };

        let session_cookie_name =
            non_empty("SESSION_COOKIE_NAME").unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string());

        let jwt_algorithm = match non_empty("AUTH_JWT_ALGORITHM") {
            Some(v) => Algorithm::from_str(v.trim())
                .ok()
                .filter(key_material::is_asymmetric)
                .ok_or(ConfigError::Invalid("AUTH_JWT_ALGORITHM"))?,
            None => Algorithm::RS256,
        };

        let raw_key = non_empty("CLERK_JWT_VERIFICATION_KEY")
            .ok_or(ConfigError::Missing("CLERK_JWT_VERIFICATION_KEY"))?;
        let jwt_public_key_pem = key_material::assemble_public_key_pem(&raw_key)
            .map_err(|_| ConfigError::Invalid("CLERK_JWT_VERIFICATION_KEY"))?;

        let access_token_leeway_seconds = match non_empty("ACCESS_TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("ACCESS_TOKEN_LEEWAY_SECONDS"))?,
            None => 60,
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth_mode,
            session_cookie_name,
            jwt_algorithm,
            jwt_public_key_pem,
            auth_issuer: non_empty("AUTH_ISSUER"),
            auth_audience: non_empty("AUTH_AUDIENCE"),
            access_token_leeway_seconds,
            // CLERK_SECRET is the older name still set by existing deployments
            clerk_webhook_key: non_empty("CLERK_WEBHOOK_KEY").or_else(|| non_empty("CLERK_SECRET")),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::test_support;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DATABASE_URL", "postgres://localhost/learn"),
            ("CLERK_JWT_VERIFICATION_KEY", test_support::PUBLIC_KEY_BODY),
        ]
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = Config::from_lookup(lookup(&base())).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Production);
        assert_eq!(config.auth_mode, AuthorizerMode::Bearer);
        assert_eq!(config.session_cookie_name, "__session");
        assert_eq!(config.jwt_algorithm, Algorithm::RS256);
        assert_eq!(config.access_token_leeway_seconds, 60);
        assert!(config.auth_issuer.is_none());
        assert!(config.clerk_webhook_key.is_none());
        assert!(config.jwt_public_key_pem.starts_with("-----BEGIN PUBLIC KEY-----\n"));
    }

    #[test]
    fn missing_verification_key_fails_startup() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CLERK_JWT_VERIFICATION_KEY")));
    }

    #[test]
    fn garbage_key_body_is_invalid() {
        let mut pairs = base();
        pairs[1] = ("CLERK_JWT_VERIFICATION_KEY", "not base64 at all!!");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("CLERK_JWT_VERIFICATION_KEY")));
    }

    #[test]
    fn symmetric_algorithms_are_rejected() {
        let mut pairs = base();
        pairs.push(("AUTH_JWT_ALGORITHM", "HS256"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("AUTH_JWT_ALGORITHM")));
    }

    #[test]
    fn session_mode_and_overrides_are_read() {
        let mut pairs = base();
        pairs.extend([
            ("AUTH_MODE", "session"),
            ("APP_ENV", "Development"),
            ("PORT", "8080"),
            ("AUTH_ISSUER", "https://clerk.example.com"),
            ("CLERK_WEBHOOK_KEY", "whsec"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.auth_mode, AuthorizerMode::Session);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.auth_issuer.as_deref(), Some("https://clerk.example.com"));
        assert_eq!(config.clerk_webhook_key.as_deref(), Some("whsec"));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn app_env_requires_an_explicit_development_marker() {
        assert_eq!(AppEnv::parse(None), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some("")), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some("staging")), AppEnv::Production);
        assert_eq!(AppEnv::parse(Some(" dev ")), AppEnv::Development);
        assert_eq!(AppEnv::parse(Some("local")), AppEnv::Development);
    }

    #[test]
    fn legacy_webhook_secret_name_is_read() {
        let mut pairs = base();
        pairs.push(("CLERK_SECRET", "legacy"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.clerk_webhook_key.as_deref(), Some("legacy"));

        pairs.push(("CLERK_WEBHOOK_KEY", "current"));
        let config = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.clerk_webhook_key.as_deref(), Some("current"));
    }
}
