//! Typed session configuration

use chrono::Duration;
use session_shared::constants::{DEFAULT_SESSION_MAX_AGE_SECS, MAX_SESSION_MAX_AGE_SECS};
use session_shared::SessionSettings;
use std::str::FromStr;

use crate::error::SessionError;

/// Persistence backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Remote,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for StoreKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "remote" | "redis" => Ok(Self::Remote),
            other => Err(SessionError::BackendUnavailable(format!(
                "unsupported session store type: {}",
                other
            ))),
        }
    }
}

/// Cross-site policy written on the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSitePolicy {
    Strict,
    Lax,
    None,
    /// Attribute omitted; the browser applies its default
    #[default]
    Unset,
}

impl SameSitePolicy {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strict" => Self::Strict,
            "lax" => Self::Lax,
            "none" => Self::None,
            _ => Self::Unset,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session_id".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: SameSitePolicy::Lax,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub enabled: bool,
    pub store: StoreKind,
    pub max_age: Duration,
    pub cleanup_interval: std::time::Duration,
    pub cookie: CookieConfig,
}

impl SessionConfig {
    /// Cookie `Max-Age` in seconds. Falls back to 24 hours when the
    /// configured max-age is not positive.
    pub fn cookie_max_age_secs(&self) -> i64 {
        let secs = self.max_age.num_seconds();
        if secs <= 0 {
            DEFAULT_SESSION_MAX_AGE_SECS
        } else {
            secs
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store: StoreKind::Memory,
            max_age: Duration::seconds(DEFAULT_SESSION_MAX_AGE_SECS),
            cleanup_interval: std::time::Duration::from_secs(300),
            cookie: CookieConfig::default(),
        }
    }
}

impl TryFrom<&SessionSettings> for SessionConfig {
    type Error = SessionError;

    fn try_from(settings: &SessionSettings) -> Result<Self, Self::Error> {
        let secs = if settings.max_age_seconds > 0 {
            settings.max_age_seconds
        } else {
            DEFAULT_SESSION_MAX_AGE_SECS
        };
        let max_age = Duration::try_seconds(secs)
            .filter(|_| secs <= MAX_SESSION_MAX_AGE_SECS)
            .ok_or_else(|| {
                SessionError::InvalidArgument(format!(
                    "session max age {}s exceeds the {}s limit",
                    secs, MAX_SESSION_MAX_AGE_SECS
                ))
            })?;

        let domain = Some(settings.domain.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            enabled: settings.enabled,
            store: settings.store.parse()?,
            max_age,
            cleanup_interval: std::time::Duration::from_secs(settings.cleanup_interval_seconds.max(1)),
            cookie: CookieConfig {
                name: settings.cookie_name.clone(),
                path: settings.path.clone(),
                domain,
                secure: settings.secure,
                http_only: settings.http_only,
                same_site: SameSitePolicy::parse(&settings.same_site),
            },
        })
    }
}
