use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use travel_manager_api::{Role, SessionInfoResponse};
use uuid::Uuid;

use super::roles::{Capability, has_capability};
use crate::error::AppError;

pub const DEFAULT_SESSION_TIMEOUT_MINUTES: i64 = 30;

/// Who is acting, with which role, for how long.
/// Created at login, dropped at logout or once `expires_at` passes.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn can(&self, capability: Capability) -> bool {
        has_capability(self.role, capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.can(capability) {
            Ok(())
        } else {
            tracing::debug!(user_id = %self.user_id, role = %self.role, ?capability, "Capability denied");
            Err(AppError::forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role
            )))
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl From<SessionContext> for SessionInfoResponse {
    fn from(session: SessionContext) -> Self {
        SessionInfoResponse {
            session_id: session.session_id,
            user_id: session.user_id,
            name: session.name,
            role: session.role,
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

/// In-process registry of live sessions. Not shared between instances.
#[derive(Debug)]
pub struct SessionStore {
    timeout: Duration,
    sessions: Mutex<HashMap<Uuid, SessionContext>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT_MINUTES)
    }
}

impl SessionStore {
    pub fn new(timeout_minutes: i64) -> Self {
        Self {
            timeout: Duration::minutes(timeout_minutes),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn create(
        &self,
        user_id: &str,
        name: &str,
        role: Role,
        ip_address: Option<String>,
    ) -> SessionContext {
        self.create_at(user_id, name, role, ip_address, Utc::now())
    }

    pub fn create_at(
        &self,
        user_id: &str,
        name: &str,
        role: Role,
        ip_address: Option<String>,
        now: DateTime<Utc>,
    ) -> SessionContext {
        let session = SessionContext {
            session_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            role,
            ip_address,
            created_at: now,
            expires_at: now + self.timeout,
        };

        let mut sessions = self.lock();
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.session_id, session.clone());
        session
    }

    pub fn get(&self, session_id: Uuid) -> Option<SessionContext> {
        self.get_at(session_id, Utc::now())
    }

    /// Live session for `session_id`; an expired one is removed on the way.
    pub fn get_at(&self, session_id: Uuid, now: DateTime<Utc>) -> Option<SessionContext> {
        let mut sessions = self.lock();
        match sessions.get(&session_id) {
            Some(session) if session.is_expired_at(now) => {
                tracing::info!(user_id = %session.user_id, "Session timed out");
                sessions.remove(&session_id);
                None
            }
            Some(session) => Some(session.clone()),
            None => None,
        }
    }

    pub fn remove(&self, session_id: Uuid) -> Option<SessionContext> {
        self.lock().remove(&session_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionContext>> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
