use crate::domain;
use crate::domain::user::TrackerUser;
use crate::domain::user::driven_ports::NewUserRecord;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;

pub struct DbUserReader;

#[derive(sqlx::FromRow)]
struct TrackerUserRow {
    id: i32,
    name: String,
    email: String,
}

impl From<TrackerUserRow> for TrackerUser {
    fn from(value: TrackerUserRow) -> Self {
        TrackerUser {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbUserReader {
    async fn user_by_id(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TrackerUser>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let user = sqlx::query_as::<_, TrackerUserRow>(
            "SELECT tu.id, tu.name, tu.email FROM tracker_user tu WHERE tu.id = $1",
        )
        .bind(user_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a user by ID")?;

        Ok(user.map(TrackerUser::from))
    }
}

pub struct DbUserWriter;

impl domain::user::driven_ports::UserWriter for DbUserWriter {
    async fn create_user(
        &self,
        user: &NewUserRecord<'_>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id: i32 = sqlx::query_scalar(
            "INSERT INTO tracker_user(name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING tracker_user.id",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new user into the database")?;

        Ok(new_id)
    }
}

pub struct DbDetectUser;

impl domain::user::driven_ports::DetectUser for DbDetectUser {
    async fn user_exists(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let users_with_id: i64 =
            sqlx::query_scalar("SELECT count(*) FROM tracker_user tu WHERE tu.id = $1")
                .bind(user_id)
                .fetch_one(cxn.borrow_connection())
                .await
                .context("detecting a user by ID")?;

        Ok(users_with_id > 0)
    }

    async fn user_with_email_exists(
        &self,
        email: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let users_with_email: i64 =
            sqlx::query_scalar("SELECT count(*) FROM tracker_user tu WHERE tu.email = $1")
                .bind(email)
                .fetch_one(cxn.borrow_connection())
                .await
                .context("detecting a user by email")?;

        Ok(users_with_email > 0)
    }
}
