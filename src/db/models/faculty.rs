use crate::db::schema::faculty;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use travel_manager_api::{FacultyResponse, Role};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = faculty)]
pub struct NewFaculty {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub role: String,
    pub password_hash: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = faculty)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Faculty {
    pub user_id: String,
    pub name: String,
    pub department: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Faculty {
    /// Role column parsed into the closed enum; the column carries a CHECK constraint.
    pub fn role(&self) -> Result<Role, String> {
        self.role.parse()
    }

    pub fn into_response(self) -> Result<FacultyResponse, String> {
        let role = self.role()?;
        Ok(FacultyResponse {
            user_id: self.user_id,
            name: self.name,
            department: self.department,
            role,
            created_at: self.created_at,
        })
    }
}
