use crate::domain;
use crate::domain::project::Project;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::Context;

pub struct DbProjectReader;

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    user_id: i32,
    project_name: String,
}

impl From<ProjectRow> for Project {
    fn from(value: ProjectRow) -> Self {
        Project {
            id: value.id,
            owner_user_id: value.user_id,
            name: value.project_name,
        }
    }
}

impl domain::project::driven_ports::ProjectReader for DbProjectReader {
    async fn project_for_user(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Project>, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        // The schema technically permits several projects per user; the
        // oldest one is the user's active project
        let project = sqlx::query_as::<_, ProjectRow>(
            "SELECT p.id, p.user_id, p.project_name FROM project p \
             WHERE p.user_id = $1 \
             ORDER BY p.id ASC \
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a user's project")?;

        Ok(project.map(Project::from))
    }
}

pub struct DbProjectWriter;

impl domain::project::driven_ports::ProjectWriter for DbProjectWriter {
    async fn create_project(
        &self,
        user_id: i32,
        project_name: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let new_id: i32 = sqlx::query_scalar(
            "INSERT INTO project(user_id, project_name) VALUES ($1, $2) RETURNING project.id",
        )
        .bind(user_id)
        .bind(project_name)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new project into the database")?;

        Ok(new_id)
    }
}

pub struct DbDetectProject;

impl domain::project::driven_ports::DetectProject for DbDetectProject {
    async fn project_exists(
        &self,
        project_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, anyhow::Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let projects_with_id: i64 =
            sqlx::query_scalar("SELECT count(*) FROM project p WHERE p.id = $1")
                .bind(project_id)
                .fetch_one(cxn.borrow_connection())
                .await
                .context("detecting a project by ID")?;

        Ok(projects_with_id > 0)
    }
}
