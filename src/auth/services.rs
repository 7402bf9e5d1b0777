// src/auth/services.rs

use std::sync::Arc;

use diesel::PgConnection;
use travel_manager_api::{CreateFacultyRequest, FacultyResponse, LoginRequest, SessionResponse};

use super::jwt::JwtManager;
use super::password::PasswordManager;
use super::rate_limit::{LOCKOUT_MINUTES, RateLimiter};
use super::session::{SessionContext, SessionStore};
use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::models::activity::{ActivityType, NewActivity};
use crate::db::models::faculty::NewFaculty;
use crate::db::repositories::activity_repository::ActivityRepository;
use crate::db::repositories::faculty_repository::FacultyRepository;
use crate::error::AppError;

pub struct AuthService {
    pool: DbPool,
    jwt_manager: JwtManager,
    rate_limiter: Arc<RateLimiter>,
    sessions: Arc<SessionStore>,
}

/// Minutes restantes, arrondies au supérieur
fn minutes_remaining(seconds: i64) -> i64 {
    (seconds + 59) / 60
}

impl AuthService {
    pub fn new(
        pool: DbPool,
        jwt_manager: JwtManager,
        rate_limiter: Arc<RateLimiter>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            pool,
            jwt_manager,
            rate_limiter,
            sessions,
        }
    }

    /// Connexion: rate limit, vérification du mot de passe, création de session
    pub fn login(
        &self,
        login_request: &LoginRequest,
        ip_address: Option<String>,
    ) -> Result<SessionResponse, AppError> {
        let user_id = login_request.user_id.trim();

        // Un compte verrouillé ne touche pas à la base
        let (blocked, seconds_left) = self.rate_limiter.is_blocked(user_id);
        if blocked {
            return Err(AppError::too_many_attempts(format!(
                "Account temporarily locked. Try again in {} minute(s).",
                minutes_remaining(seconds_left)
            )));
        }

        if user_id.is_empty() || login_request.password.is_empty() {
            return Err(AppError::validation("User ID and password are required"));
        }

        let mut conn = get_connection(&self.pool)?;

        let faculty = FacultyRepository::find_by_id(&mut conn, user_id)?;
        let verified = match &faculty {
            Some(f) => PasswordManager::verify(&login_request.password, &f.password_hash)?,
            None => false,
        };

        let Some(faculty) = faculty.filter(|_| verified) else {
            return Err(self.failed_login(&mut conn, user_id, ip_address.as_deref()));
        };

        self.rate_limiter.record_attempt(user_id, true);

        let role = faculty.role().map_err(AppError::internal)?;
        let session = self
            .sessions
            .create(&faculty.user_id, &faculty.name, role, ip_address);
        let access_token = self.jwt_manager.generate_session_token(&session)?;

        Self::log_activity(
            &mut conn,
            &session.user_id,
            ActivityType::Login,
            serde_json::json!({ "session_id": session.session_id, "role": role }),
            session.ip_address.as_deref(),
        );
        tracing::info!(user_id = %session.user_id, %role, "User logged in");

        Ok(SessionResponse {
            access_token,
            expires_in: self.sessions.timeout().num_seconds(),
            user: faculty.into_response().map_err(AppError::internal)?,
        })
    }

    /// Enregistre l'échec et construit l'erreur à renvoyer (401 ou 429)
    fn failed_login(
        &self,
        conn: &mut PgConnection,
        user_id: &str,
        ip_address: Option<&str>,
    ) -> AppError {
        let (blocked, attempts_left) = self.rate_limiter.record_attempt(user_id, false);

        Self::log_activity(
            conn,
            user_id,
            ActivityType::LoginFailed,
            serde_json::json!({ "attempts_left": attempts_left, "locked": blocked }),
            ip_address,
        );

        if blocked {
            AppError::too_many_attempts(format!(
                "Too many failed attempts. Account locked for {LOCKOUT_MINUTES} minutes."
            ))
        } else {
            tracing::debug!(user_id, attempts_left, "Failed login attempt");
            AppError::invalid_credentials(format!(
                "Invalid user ID or password. {attempts_left} attempt(s) remaining."
            ))
        }
    }

    /// Déconnexion: détruit la session côté serveur
    pub fn logout(&self, session: &SessionContext) {
        self.sessions.remove(session.session_id);
        tracing::info!(user_id = %session.user_id, "User logged out");

        match get_connection(&self.pool) {
            Ok(mut conn) => Self::log_activity(
                &mut conn,
                &session.user_id,
                ActivityType::Logout,
                serde_json::json!({ "session_id": session.session_id }),
                session.ip_address.as_deref(),
            ),
            Err(e) => tracing::warn!(error = %e, "Logout not recorded in activity log"),
        }
    }

    /// Création d'un compte par un administrateur
    pub fn create_faculty(&self, request: CreateFacultyRequest) -> Result<FacultyResponse, AppError> {
        let user_id = request.user_id.trim();
        if user_id.is_empty() || request.name.trim().is_empty() || request.department.trim().is_empty()
        {
            return Err(AppError::validation(
                "user_id, name and department are required",
            ));
        }

        if !PasswordManager::is_strong(&request.password) {
            return Err(AppError::WeakPassword(
                "Password must be at least 8 characters with uppercase, lowercase and numbers"
                    .to_string(),
            ));
        }

        let mut conn = get_connection(&self.pool)?;
        if FacultyRepository::find_by_id(&mut conn, user_id)?.is_some() {
            return Err(AppError::duplicate(format!("Faculty '{user_id}'")));
        }

        let password_hash = PasswordManager::hash(&request.password)?;
        let faculty = FacultyRepository::create(
            &mut conn,
            &NewFaculty {
                user_id: user_id.to_string(),
                name: request.name.trim().to_string(),
                department: request.department.trim().to_string(),
                role: request.role.as_str().to_string(),
                password_hash,
            },
        )?;

        tracing::info!(user_id = %faculty.user_id, role = %faculty.role, "Faculty account created");
        faculty.into_response().map_err(AppError::internal)
    }

    /// Journal d'activité: un échec est tracé, jamais propagé
    fn log_activity(
        conn: &mut PgConnection,
        user_id: &str,
        activity_type: ActivityType,
        details: serde_json::Value,
        ip_address: Option<&str>,
    ) {
        let activity = NewActivity {
            user_id,
            activity_type: activity_type.as_str(),
            details: details.to_string(),
            ip_address,
        };

        if let Err(e) = ActivityRepository::record(conn, &activity) {
            tracing::warn!(user_id, activity = activity_type.as_str(), error = %e, "Failed to record user activity");
        }
    }
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::db::connection::test_pool;
    use travel_manager_api::Role;
    use uuid::Uuid;

    struct Fixture {
        pool: DbPool,
        service: AuthService,
        sessions: Arc<SessionStore>,
        user_id: String,
    }

    impl Fixture {
        fn new(max_attempts: u32) -> Self {
            let pool = test_pool();
            let sessions = Arc::new(SessionStore::default());
            let service = AuthService::new(
                pool.clone(),
                JwtManager::new("auth_service_db_test_secret"),
                Arc::new(RateLimiter::new(max_attempts, 300)),
                Arc::clone(&sessions),
            );
            let user_id = format!("auth_{}", Uuid::new_v4().simple());
            service
                .create_faculty(CreateFacultyRequest {
                    user_id: user_id.clone(),
                    name: "Auth Test".to_string(),
                    department: "CS".to_string(),
                    role: Role::Approval,
                    password: "Travel2026".to_string(),
                })
                .expect("faculty creation should succeed");

            Self {
                pool,
                service,
                sessions,
                user_id,
            }
        }

        fn login(&self, password: &str) -> Result<SessionResponse, AppError> {
            self.service.login(
                &LoginRequest {
                    user_id: self.user_id.clone(),
                    password: password.to_string(),
                },
                Some("127.0.0.1".to_string()),
            )
        }

        fn activity_count(&self, activity_type: ActivityType) -> i64 {
            let mut conn = get_connection(&self.pool).unwrap();
            ActivityRepository::count_for_user(&mut conn, &self.user_id, activity_type.as_str())
                .unwrap()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            if let Ok(mut conn) = get_connection(&self.pool) {
                let _ = FacultyRepository::delete(&mut conn, &self.user_id);
            }
        }
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn login_creates_a_session_and_logout_destroys_it() {
        let fx = Fixture::new(5);

        let response = fx.login("Travel2026").expect("login should succeed");
        assert_eq!(response.user.role, Role::Approval);
        assert_eq!(response.expires_in, 30 * 60);
        assert_eq!(fx.sessions.len(), 1);

        let claims = JwtManager::new("auth_service_db_test_secret")
            .verify_token(&response.access_token)
            .unwrap();
        let session = fx.sessions.get(claims.sid).expect("session should be live");

        fx.service.logout(&session);
        assert!(fx.sessions.get(claims.sid).is_none());
        assert_eq!(fx.activity_count(ActivityType::Login), 1);
        assert_eq!(fx.activity_count(ActivityType::Logout), 1);
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn repeated_failures_lock_the_account() {
        let fx = Fixture::new(3);

        let first = fx.login("Wrong1234").unwrap_err();
        assert!(first.to_string().contains("2 attempt(s) remaining"));
        assert!(matches!(fx.login("Wrong1234"), Err(AppError::InvalidCredentials(_))));
        assert!(matches!(fx.login("Wrong1234"), Err(AppError::TooManyAttempts(_))));

        // Même le bon mot de passe est refusé pendant le verrouillage
        assert!(matches!(fx.login("Travel2026"), Err(AppError::TooManyAttempts(_))));
        assert_eq!(fx.activity_count(ActivityType::LoginFailed), 3);
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn duplicate_faculty_is_a_conflict() {
        let fx = Fixture::new(5);
        let err = fx
            .service
            .create_faculty(CreateFacultyRequest {
                user_id: fx.user_id.clone(),
                name: "Again".to_string(),
                department: "CS".to_string(),
                role: Role::Professor,
                password: "Travel2026".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));
    }
}
