use crate::db::error::RepositoryError;
use crate::db::models::activity::NewActivity;
use crate::db::schema::user_activity_log;
use diesel::prelude::*;

pub struct ActivityRepository;

impl ActivityRepository {
    pub fn record(conn: &mut PgConnection, activity: &NewActivity<'_>) -> Result<(), RepositoryError> {
        diesel::insert_into(user_activity_log::table)
            .values(activity)
            .execute(conn)?;
        Ok(())
    }

    #[cfg(test)]
    pub fn count_for_user(
        conn: &mut PgConnection,
        user_id: &str,
        activity_type: &str,
    ) -> Result<i64, RepositoryError> {
        user_activity_log::table
            .filter(user_activity_log::user_id.eq(user_id))
            .filter(user_activity_log::activity_type.eq(activity_type))
            .count()
            .get_result(conn)
            .map_err(Into::into)
    }
}
