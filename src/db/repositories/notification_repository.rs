use crate::db::error::RepositoryError;
use crate::db::models::notification::{NewNotification, Notification};
use crate::db::schema::notifications;
use diesel::prelude::*;

pub struct NotificationRepository;

impl NotificationRepository {
    pub fn create(
        conn: &mut PgConnection,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        diesel::insert_into(notifications::table)
            .values(notification)
            .returning(Notification::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    /// Les plus récentes d'abord
    pub fn list_for_user(
        conn: &mut PgConnection,
        user_id: &str,
        include_read: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .into_boxed();

        if !include_read {
            query = query.filter(notifications::is_read.eq(false));
        }

        query
            .order_by(notifications::id.desc())
            .limit(limit)
            .select(Notification::as_select())
            .load(conn)
            .map_err(Into::into)
    }

    /// Rows touched: 0 when the notification is unknown or belongs to someone else.
    pub fn mark_read(
        conn: &mut PgConnection,
        user_id: &str,
        notification_id: i64,
    ) -> Result<usize, RepositoryError> {
        diesel::update(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .set(notifications::is_read.eq(true))
        .execute(conn)
        .map_err(Into::into)
    }

    pub fn mark_all_read(conn: &mut PgConnection, user_id: &str) -> Result<usize, RepositoryError> {
        diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(conn)
        .map_err(Into::into)
    }

    pub fn delete(
        conn: &mut PgConnection,
        user_id: &str,
        notification_id: i64,
    ) -> Result<usize, RepositoryError> {
        diesel::delete(
            notifications::table
                .filter(notifications::id.eq(notification_id))
                .filter(notifications::user_id.eq(user_id)),
        )
        .execute(conn)
        .map_err(Into::into)
    }

    /// Ne garde que les `keep` notifications les plus récentes de l'utilisateur
    pub fn trim(conn: &mut PgConnection, user_id: &str, keep: i64) -> Result<usize, RepositoryError> {
        let oldest_kept: Option<i64> = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order_by(notifications::id.desc())
            .offset(keep - 1)
            .select(notifications::id)
            .first(conn)
            .optional()?;

        let Some(oldest_kept) = oldest_kept else {
            return Ok(0);
        };

        diesel::delete(
            notifications::table
                .filter(notifications::user_id.eq(user_id))
                .filter(notifications::id.lt(oldest_kept)),
        )
        .execute(conn)
        .map_err(Into::into)
    }
}
