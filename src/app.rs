// src/app.rs

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtManager;
use crate::auth::rate_limit::RateLimiter;
use crate::auth::services::AuthService;
use crate::auth::session::SessionStore;
use crate::budget::ledger::BudgetLedger;
use crate::db::DbPool;
use crate::handlers::auth::{login, logout, me};
use crate::handlers::budget::{
    budget_history, budget_summary, department_spending, get_budget, set_budget,
};
use crate::handlers::documents::{download_document, list_documents, upload_document};
use crate::handlers::faculty::create_faculty;
use crate::handlers::health::health;
use crate::handlers::notifications::{
    delete_notification, list_notifications, mark_all_notifications_read, mark_notification_read,
};
use crate::handlers::requests::{
    approve_request, destination_stats, faculty_stats, get_request, monthly_stats, my_requests,
    pending_requests, reject_request, request_stats, search_requests, submit_request,
};
use crate::notifications::services::NotificationService;
use crate::travel::analytics::AnalyticsService;
use crate::travel::documents::{DocumentService, MAX_DOCUMENT_BYTES};
use crate::travel::services::TravelRequestService;

/// Everything the handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub jwt_manager: JwtManager,
    pub sessions: Arc<SessionStore>,
    pub auth_service: Arc<AuthService>,
    pub ledger: Arc<BudgetLedger>,
    pub travel_requests: Arc<TravelRequestService>,
    pub analytics: Arc<AnalyticsService>,
    pub documents: Arc<DocumentService>,
    pub notifications: Arc<NotificationService>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        jwt_manager: JwtManager,
        rate_limiter: RateLimiter,
        sessions: SessionStore,
    ) -> Self {
        let sessions = Arc::new(sessions);
        let ledger = Arc::new(BudgetLedger::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(
            pool.clone(),
            jwt_manager.clone(),
            Arc::new(rate_limiter),
            Arc::clone(&sessions),
        ));
        let travel_requests = Arc::new(TravelRequestService::new(pool.clone(), Arc::clone(&ledger)));
        let analytics = Arc::new(AnalyticsService::new(pool.clone()));
        let documents = Arc::new(DocumentService::new(pool.clone()));
        let notifications = Arc::new(NotificationService::new(pool));

        Self {
            jwt_manager,
            sessions,
            auth_service,
            ledger,
            travel_requests,
            analytics,
            documents,
            notifications,
        }
    }
}

impl FromRef<AppState> for JwtManager {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_manager.clone()
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.sessions)
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth_service)
    }
}

impl FromRef<AppState> for Arc<BudgetLedger> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.ledger)
    }
}

impl FromRef<AppState> for Arc<TravelRequestService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.travel_requests)
    }
}

impl FromRef<AppState> for Arc<AnalyticsService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.analytics)
    }
}

impl FromRef<AppState> for Arc<DocumentService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.documents)
    }
}

impl FromRef<AppState> for Arc<NotificationService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.notifications)
    }
}

/// Routes d'authentification
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Budget: consultation et ajustement
pub fn budget_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_budget).put(set_budget))
        .route("/history", get(budget_history))
        .route("/summary", get(budget_summary))
        .route("/spending", get(department_spending))
}

/// Demandes de déplacement: soumission, consultation, revue
pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_request))
        .route("/mine", get(my_requests))
        .route("/pending", get(pending_requests))
        .route("/search", get(search_requests))
        .route("/stats", get(request_stats))
        .route("/stats/monthly", get(monthly_stats))
        .route("/stats/destinations", get(destination_stats))
        .route("/stats/faculty", get(faculty_stats))
        .route("/{id}", get(get_request))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
        .route("/{id}/documents", get(list_documents))
        .route(
            "/{id}/documents/{file_type}",
            get(download_document)
                .post(upload_document)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
}

/// Notifications de l'utilisateur connecté
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/read", post(mark_all_notifications_read))
        .route("/{id}", delete(delete_notification))
        .route("/{id}/read", post(mark_notification_read))
}

/// Construit l'application complète
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .nest("/budget", budget_routes())
        .nest("/requests", request_routes())
        .nest("/notifications", notification_routes())
        .route("/faculty", post(create_faculty))
        .with_state(state)
        // Middleware global de tracing
        .layer(TraceLayer::new_for_http())
}
