// ============================================================================
// Session API - Session Binding Middleware
// File: crates/session-api/src/middleware.rs
// ============================================================================
//! Binds a session to every request passing through the layer.
//!
//! Install with `axum::middleware::from_fn_with_state(manager, session_middleware)`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use session_core::{SameSitePolicy, Session, SessionConfig, SessionError};
use time::OffsetDateTime;
use tracing::{debug, error, warn};

use crate::context::SessionContext;
use crate::state::SharedSessionManager;

pub async fn session_middleware(
    State(manager): State<SharedSessionManager>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let config = manager.config();
    if !config.enabled {
        return next.run(request).await;
    }

    let presented = jar.get(&config.cookie.name).map(|c| c.value().to_string());

    let session = match resolve_session(&manager, presented.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            error!("Session backend unavailable, serving request without a session: {}", e);
            return next.run(request).await;
        }
    };

    let context = SessionContext::bind(manager.clone(), session);
    request.extensions_mut().insert(context.clone());

    let response = next.run(request).await;

    if context.is_destroyed() {
        return (jar.add(clearing_cookie(config)), response).into_response();
    }

    let Some(mut session) = context.session() else {
        return response;
    };

    if let Err(e) = manager.save_session(&mut session).await {
        error!("Failed to save session {}: {}", session.id(), e);
    }

    let cookie = session_cookie(config, session.id().to_string());
    (jar.add(cookie), response).into_response()
}

/// Load the presented session, or start a new one when it cannot be used.
async fn resolve_session(
    manager: &SharedSessionManager,
    presented: Option<&str>,
) -> Result<Session, SessionError> {
    if let Some(id) = presented {
        match manager.get_session(id).await {
            Ok(session) => return Ok(session),
            Err(
                SessionError::NotFound(_)
                | SessionError::SessionExpired(_)
                | SessionError::InvalidArgument(_),
            ) => {
                debug!("Presented session {} not usable, creating a new one", id);
            }
            Err(SessionError::Serialization(e)) => {
                warn!("Stored session {} is unreadable, replacing it: {}", id, e);
            }
            Err(e) => return Err(e),
        }
    }

    manager.create_session().await
}

fn same_site(policy: SameSitePolicy) -> Option<SameSite> {
    match policy {
        SameSitePolicy::Strict => Some(SameSite::Strict),
        SameSitePolicy::Lax => Some(SameSite::Lax),
        SameSitePolicy::None => Some(SameSite::None),
        SameSitePolicy::Unset => None,
    }
}

fn base_cookie(config: &SessionConfig, value: String) -> Cookie<'static> {
    let attrs = &config.cookie;

    let mut cookie = Cookie::new(attrs.name.clone(), value);
    cookie.set_path(attrs.path.clone());
    cookie.set_secure(attrs.secure);
    cookie.set_http_only(attrs.http_only);
    if let Some(domain) = &attrs.domain {
        cookie.set_domain(domain.clone());
    }
    if let Some(policy) = same_site(attrs.same_site) {
        cookie.set_same_site(policy);
    }
    cookie
}

pub(crate) fn session_cookie(config: &SessionConfig, id: String) -> Cookie<'static> {
    let mut cookie = base_cookie(config, id);
    cookie.set_max_age(time::Duration::seconds(config.cookie_max_age_secs()));
    cookie
}

pub(crate) fn clearing_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.set_max_age(time::Duration::ZERO);
    cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
    cookie
}
