use crate::db::schema::notifications;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use travel_manager_api::{NotificationResponse, NotificationType};
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = notifications)]
pub struct NewNotification<'a> {
    pub user_id: &'a str,
    pub message: String,
    pub notification_type: &'a str,
    pub related_id: Option<Uuid>,
}

impl<'a> NewNotification<'a> {
    pub fn new(user_id: &'a str, kind: NotificationType, message: String) -> Self {
        Self {
            user_id,
            message,
            notification_type: kind.as_str(),
            related_id: None,
        }
    }

    pub fn about(mut self, request_id: Uuid) -> Self {
        self.related_id = Some(request_id);
        self
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    pub message: String,
    pub notification_type: String,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn into_response(self) -> Result<NotificationResponse, String> {
        Ok(NotificationResponse {
            id: self.id,
            notification_type: self.notification_type.parse()?,
            message: self.message,
            related_id: self.related_id,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}
