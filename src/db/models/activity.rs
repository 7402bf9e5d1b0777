use crate::db::schema::user_activity_log;
use diesel::Insertable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Login,
    LoginFailed,
    Logout,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::LoginFailed => "login_failed",
            Self::Logout => "logout",
        }
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_activity_log)]
pub struct NewActivity<'a> {
    pub user_id: &'a str,
    pub activity_type: &'a str,
    pub details: String,
    pub ip_address: Option<&'a str>,
}
