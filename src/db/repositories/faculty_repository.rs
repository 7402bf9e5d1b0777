use crate::db::error::RepositoryError;
use crate::db::models::faculty::{Faculty, NewFaculty};
use crate::db::schema::faculty;
use diesel::prelude::*;

pub struct FacultyRepository;

impl FacultyRepository {
    pub fn find_by_id(
        conn: &mut PgConnection,
        user_id: &str,
    ) -> Result<Option<Faculty>, RepositoryError> {
        faculty::table
            .filter(faculty::user_id.eq(user_id))
            .select(Faculty::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn create(conn: &mut PgConnection, new_faculty: &NewFaculty) -> Result<Faculty, RepositoryError> {
        diesel::insert_into(faculty::table)
            .values(new_faculty)
            .returning(Faculty::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }

    pub fn user_ids_with_role(conn: &mut PgConnection, role: &str) -> Result<Vec<String>, RepositoryError> {
        faculty::table
            .filter(faculty::role.eq(role))
            .order_by(faculty::user_id.asc())
            .select(faculty::user_id)
            .load(conn)
            .map_err(Into::into)
    }

    #[cfg(test)]
    /// Supprime un compte (et ses demandes, via ON DELETE CASCADE)
    pub fn delete(conn: &mut PgConnection, user_id: &str) -> Result<(), RepositoryError> {
        diesel::delete(faculty::table.filter(faculty::user_id.eq(user_id))).execute(conn)?;
        Ok(())
    }
}
