/*
 * Responsibility
 * - 起動時の設定読み込み (PORT, ENVIRONMENT, REGION, token validation options)
 * - リクエスト毎の環境解決 (session cookie name / public key identifier)
 * - tier -> default の対応表
 */
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const SESSION_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
pub const PUBLIC_KEY_NAME: &str = "RDS_BACKEND_PUBLIC_KEY_NAME";

/// Where environment-style settings are read from.
///
/// Production reads the process environment; tests hand in a map so they never
/// touch process-global state.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

// Empty values count as unset.
fn non_empty(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentTier {
    Local,
    Development,
    Production,
}

impl DeploymentTier {
    /// Exact match on PRODUCTION / DEVELOPMENT; anything else is LOCAL.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("PRODUCTION") => Self::Production,
            Some("DEVELOPMENT") => Self::Development,
            _ => Self::Local,
        }
    }

    pub fn from_env(env: &dyn EnvSource) -> Self {
        Self::parse(env.var(ENVIRONMENT).as_deref())
    }

    pub fn defaults(self) -> &'static TierDefaults {
        TIER_DEFAULTS
            .iter()
            .find(|d| d.tier == self)
            .unwrap_or(&LOCAL_DEFAULTS)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TierDefaults {
    pub tier: DeploymentTier,
    pub cookie_name: &'static str,
    pub key_identifier: &'static str,
}

const LOCAL_DEFAULTS: TierDefaults = TierDefaults {
    tier: DeploymentTier::Local,
    cookie_name: "rds-session-local",
    key_identifier: "LOCAL_RDS_BACKEND_PUBLIC_KEY",
};

/// Fallback policy, one row per tier.
pub const TIER_DEFAULTS: &[TierDefaults] = &[
    TierDefaults {
        tier: DeploymentTier::Production,
        cookie_name: "rds-session",
        key_identifier: "PROD_RDS_BACKEND_PUBLIC_KEY",
    },
    TierDefaults {
        tier: DeploymentTier::Development,
        cookie_name: "rds-session-development",
        key_identifier: "STAGING_RDS_BACKEND_PUBLIC_KEY",
    },
    LOCAL_DEFAULTS,
];

/// Environment as seen by a single request.
///
/// Not cached: resolved again on every call, only derived state (the verifier
/// key) lives for the whole process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub cookie_name: Option<String>,
    pub environment_tier: DeploymentTier,
    pub key_identifier: Option<String>,
}

impl EnvironmentConfig {
    pub fn resolve() -> Self {
        Self::resolve_from(&ProcessEnv)
    }

    pub fn resolve_from(env: &dyn EnvSource) -> Self {
        Self {
            cookie_name: non_empty(env, SESSION_COOKIE_NAME),
            environment_tier: DeploymentTier::from_env(env),
            key_identifier: non_empty(env, PUBLIC_KEY_NAME),
        }
    }

    /// Override if present, otherwise the tier default.
    pub fn effective_cookie_name(&self) -> &str {
        self.cookie_name
            .as_deref()
            .unwrap_or(self.environment_tier.defaults().cookie_name)
    }

    pub fn effective_key_identifier(&self) -> &str {
        self.key_identifier
            .as_deref()
            .unwrap_or(self.environment_tier.defaults().key_identifier)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub tier: DeploymentTier,

    // AWS region override for the parameter store client
    pub region: Option<String>,

    pub token_leeway_seconds: u64,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let port: u16 = match non_empty(env, "PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let tier = DeploymentTier::from_env(env);

        let region = non_empty(env, "REGION");

        let token_leeway_seconds = match non_empty(env, "TOKEN_LEEWAY_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let auth_issuer = non_empty(env, "AUTH_ISSUER");
        let auth_audience = non_empty(env, "AUTH_AUDIENCE");

        Ok(Self {
            addr,
            tier,
            region,
            token_leeway_seconds,
            auth_issuer,
            auth_audience,
        })
    }
}
