use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, header, request::Parts};

use crate::auth::jwt::JwtManager;
use crate::auth::session::{SessionContext, SessionStore};
use crate::error::AppError;

const BEARER: &str = "Bearer ";

/// Récupère le token de `Authorization: Bearer <JWT>`
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_str = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::InvalidTokenFormat)?
        .to_str()
        .map_err(|_| AppError::InvalidTokenFormat)?;

    auth_str
        .strip_prefix(BEARER)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::InvalidTokenFormat)
}

/// First address of `X-Forwarded-For`, as set by API Gateway or a proxy.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Extracteur pour les routes protégées.
/// Le JWT doit être valide ET la session qu'il désigne encore vivante:
/// un token d'une session fermée ou expirée est refusé.
impl<S> FromRequestParts<S> for SessionContext
where
    JwtManager: FromRef<S>,
    Arc<SessionStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let jwt_manager = JwtManager::from_ref(state);
        let claims = jwt_manager.verify_token(token)?;

        let sessions = Arc::<SessionStore>::from_ref(state);
        let session = sessions
            .get(claims.sid)
            .filter(|s| s.user_id == claims.sub)
            .ok_or_else(|| AppError::unauthorized("Session expired or logged out"))?;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};
    use travel_manager_api::Role;

    #[derive(Clone)]
    struct TestState {
        jwt: JwtManager,
        sessions: Arc<SessionStore>,
    }

    impl FromRef<TestState> for JwtManager {
        fn from_ref(state: &TestState) -> Self {
            state.jwt.clone()
        }
    }

    impl FromRef<TestState> for Arc<SessionStore> {
        fn from_ref(state: &TestState) -> Self {
            Arc::clone(&state.sessions)
        }
    }

    fn state() -> TestState {
        TestState {
            jwt: JwtManager::new("extractor_test_secret"),
            sessions: Arc::new(SessionStore::default()),
        }
    }

    async fn extract(state: &TestState, auth: Option<&str>) -> Result<SessionContext, AppError> {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        SessionContext::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_a_bad_request() {
        let state = state();
        assert!(matches!(extract(&state, None).await, Err(AppError::InvalidTokenFormat)));
        assert!(matches!(
            extract(&state, Some("Basic abc")).await,
            Err(AppError::InvalidTokenFormat)
        ));
        assert!(matches!(
            extract(&state, Some("Bearer ")).await,
            Err(AppError::InvalidTokenFormat)
        ));
    }

    #[tokio::test]
    async fn live_session_is_extracted() {
        let state = state();
        let session = state.sessions.create("acc", "Accountant", Role::Accountant, None);
        let token = state.jwt.generate_session_token(&session).unwrap();

        let extracted = extract(&state, Some(&format!("Bearer {token}"))).await.unwrap();
        assert_eq!(extracted, session);
    }

    #[tokio::test]
    async fn token_of_a_closed_session_is_refused() {
        let state = state();
        let session = state.sessions.create("acc", "Accountant", Role::Accountant, None);
        let token = state.jwt.generate_session_token(&session).unwrap();
        state.sessions.remove(session.session_id);

        assert!(matches!(
            extract(&state, Some(&format!("Bearer {token}"))).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = state();
        assert!(matches!(
            extract(&state, Some("Bearer not.a.jwt")).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn client_ip_takes_first_forwarded_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), None);

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }
}
