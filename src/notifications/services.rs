// src/notifications/services.rs

use diesel::PgConnection;
use travel_manager_api::NotificationType;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::notification::{NewNotification, Notification};
use crate::db::repositories::notification_repository::NotificationRepository;
use crate::error::AppError;

/// Older notifications beyond this count are dropped on insert.
pub const MAX_NOTIFICATIONS_PER_USER: i64 = 100;
pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 20;

pub fn submitted_message(conference_name: &str) -> String {
    format!("Your travel request for {conference_name} has been submitted")
}

pub fn pending_review_message(conference_name: &str) -> String {
    format!("New travel request pending approval: {conference_name}")
}

pub fn approved_message(conference_name: &str) -> String {
    format!("Your travel request for {conference_name} has been approved")
}

pub fn rejected_message(conference_name: &str, comments: Option<&str>) -> String {
    match comments {
        Some(reason) => {
            format!("Your travel request for {conference_name} has been rejected: {reason}")
        }
        None => format!("Your travel request for {conference_name} has been rejected"),
    }
}

/// Writes one notification on `conn`, so it commits or rolls back with the
/// caller's transaction.
pub fn notify(
    conn: &mut PgConnection,
    user_id: &str,
    kind: NotificationType,
    message: String,
    request_id: Uuid,
) -> Result<(), RepositoryError> {
    let notification = NewNotification::new(user_id, kind, message).about(request_id);
    NotificationRepository::create(conn, &notification)?;
    NotificationRepository::trim(conn, user_id, MAX_NOTIFICATIONS_PER_USER)?;
    Ok(())
}

/// Lecture et acquittement des notifications d'un utilisateur
pub struct NotificationService {
    pool: DbPool,
}

impl NotificationService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn list(
        &self,
        user_id: &str,
        include_read: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, AppError> {
        let mut conn = get_connection(&self.pool)?;
        Ok(NotificationRepository::list_for_user(
            &mut conn,
            user_id,
            include_read,
            limit,
        )?)
    }

    /// Unknown ids and other users' notifications are both "not found".
    pub fn mark_read(&self, user_id: &str, notification_id: i64) -> Result<(), AppError> {
        let mut conn = get_connection(&self.pool)?;
        let updated = NotificationRepository::mark_read(&mut conn, user_id, notification_id)?;
        if updated == 0 {
            return Err(AppError::not_found(format!("Notification {notification_id}")));
        }
        Ok(())
    }

    pub fn mark_all_read(&self, user_id: &str) -> Result<usize, AppError> {
        let mut conn = get_connection(&self.pool)?;
        let updated = NotificationRepository::mark_all_read(&mut conn, user_id)?;
        tracing::debug!(user_id, updated, "Notifications marked as read");
        Ok(updated)
    }

    pub fn delete(&self, user_id: &str, notification_id: i64) -> Result<(), AppError> {
        let mut conn = get_connection(&self.pool)?;
        let deleted = NotificationRepository::delete(&mut conn, user_id, notification_id)?;
        if deleted == 0 {
            return Err(AppError::not_found(format!("Notification {notification_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_carries_the_reason() {
        assert_eq!(
            rejected_message("ICSE", Some("Budget freeze")),
            "Your travel request for ICSE has been rejected: Budget freeze"
        );
        assert_eq!(
            rejected_message("ICSE", None),
            "Your travel request for ICSE has been rejected"
        );
    }

    #[test]
    fn messages_name_the_conference() {
        assert!(submitted_message("PLDI").contains("PLDI"));
        assert!(pending_review_message("PLDI").ends_with("PLDI"));
        assert!(approved_message("PLDI").contains("approved"));
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::db::connection::test_pool;
    use crate::db::models::faculty::NewFaculty;
    use crate::db::repositories::faculty_repository::FacultyRepository;

    fn service_with_user() -> (NotificationService, DbPool, String) {
        let pool = test_pool();
        let user_id = format!("notif_{}", Uuid::new_v4().simple());
        let mut conn = get_connection(&pool).unwrap();
        FacultyRepository::create(
            &mut conn,
            &NewFaculty {
                user_id: user_id.clone(),
                name: "Notified".to_string(),
                department: "Math".to_string(),
                role: "professor".to_string(),
                password_hash: "x".to_string(),
            },
        )
        .unwrap();
        (NotificationService::new(pool.clone()), pool, user_id)
    }

    fn cleanup(pool: &DbPool, user_id: &str) {
        if let Ok(mut conn) = get_connection(pool) {
            let _ = FacultyRepository::delete(&mut conn, user_id);
        }
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn read_notifications_leave_the_unread_list() {
        let (service, pool, user_id) = service_with_user();
        let mut conn = get_connection(&pool).unwrap();
        let request_id = Uuid::new_v4();
        notify(&mut conn, &user_id, NotificationType::Info, "first".to_string(), request_id).unwrap();
        notify(&mut conn, &user_id, NotificationType::Success, "second".to_string(), request_id).unwrap();

        let unread = service.list(&user_id, false, 10).unwrap();
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].message, "second");

        service.mark_read(&user_id, unread[0].id).unwrap();
        assert_eq!(service.list(&user_id, false, 10).unwrap().len(), 1);
        assert_eq!(service.list(&user_id, true, 10).unwrap().len(), 2);

        assert!(matches!(
            service.mark_read("someone_else", unread[1].id),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.mark_all_read(&user_id).unwrap(), 1);

        service.delete(&user_id, unread[1].id).unwrap();
        assert_eq!(service.list(&user_id, true, 10).unwrap().len(), 1);

        cleanup(&pool, &user_id);
    }

    #[test]
    #[ignore = "requires DATABASE_URL"]
    fn only_the_newest_notifications_are_kept() {
        let (service, pool, user_id) = service_with_user();
        let mut conn = get_connection(&pool).unwrap();
        let request_id = Uuid::new_v4();
        for i in 0..=MAX_NOTIFICATIONS_PER_USER {
            notify(&mut conn, &user_id, NotificationType::Info, format!("n{i}"), request_id).unwrap();
        }

        let all = service.list(&user_id, true, 1000).unwrap();
        assert_eq!(all.len(), 100);
        assert_eq!(all[0].message, format!("n{MAX_NOTIFICATIONS_PER_USER}"));
        assert!(all.iter().all(|n| n.message != "n0"));

        cleanup(&pool, &user_id);
    }
}
