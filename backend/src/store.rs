// backend/src/store.rs
//
// SQLite persistence for tracker configurations. The workflow list is kept as
// a JSON column and always written back whole.

use cycletime_shared::{Configuration, Credentials, NewConfiguration, WorkflowState};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("stored workflow is not valid JSON: {0}")]
    Workflow(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ConfigStore {
    db: SqlitePool,
}

impl ConfigStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS configurations (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT    NOT NULL,
                base_url     TEXT    NOT NULL,
                email        TEXT    NOT NULL,
                api_token    TEXT    NOT NULL,
                project_key  TEXT    NOT NULL,
                workflow     TEXT    NOT NULL  -- JSON array of workflow states
            );
            "#,
        )
        .execute(&self.db)
        .await?;
        Ok(())
    }

    pub async fn create(&self, cfg: &NewConfiguration) -> Result<Configuration, StoreError> {
        let workflow = serde_json::to_string(&cfg.workflow)?;
        let id = sqlx::query(
            r#"
            INSERT INTO configurations (name, base_url, email, api_token, project_key, workflow)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(cfg.name.trim())
        .bind(cfg.credentials.base())
        .bind(cfg.credentials.email.trim())
        .bind(&cfg.credentials.api_token)
        .bind(cfg.project_key.trim())
        .bind(workflow)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        tracing::info!(id, name = %cfg.name, "configuration created");
        Ok(Configuration {
            id,
            name: cfg.name.trim().to_string(),
            credentials: Credentials {
                base_url: cfg.credentials.base().to_string(),
                email: cfg.credentials.email.trim().to_string(),
                api_token: cfg.credentials.api_token.clone(),
            },
            project_key: cfg.project_key.trim().to_string(),
            workflow: cfg.workflow.clone(),
        })
    }

    /// Replace a configuration; `None` when the id does not exist.
    pub async fn update(
        &self,
        id: i64,
        cfg: &NewConfiguration,
    ) -> Result<Option<Configuration>, StoreError> {
        let workflow = serde_json::to_string(&cfg.workflow)?;
        let affected = sqlx::query(
            r#"
            UPDATE configurations
               SET name = ?, base_url = ?, email = ?, api_token = ?, project_key = ?, workflow = ?
             WHERE id = ?
            "#,
        )
        .bind(cfg.name.trim())
        .bind(cfg.credentials.base())
        .bind(cfg.credentials.email.trim())
        .bind(&cfg.credentials.api_token)
        .bind(cfg.project_key.trim())
        .bind(workflow)
        .bind(id)
        .execute(&self.db)
        .await?
        .rows_affected();

        if affected == 0 {
            return Ok(None);
        }
        tracing::info!(id, "configuration updated");
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Configuration>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, base_url, email, api_token, project_key, workflow
            FROM configurations
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(config_from_row).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Configuration>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, base_url, email, api_token, project_key, workflow
            FROM configurations
            ORDER BY name COLLATE NOCASE ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(config_from_row).collect()
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let affected = sqlx::query("DELETE FROM configurations WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();
        if affected > 0 {
            tracing::info!(id, "configuration deleted");
        }
        Ok(affected > 0)
    }
}

fn config_from_row(row: &SqliteRow) -> Result<Configuration, StoreError> {
    let workflow: Vec<WorkflowState> = serde_json::from_str(&row.get::<String, _>("workflow"))?;
    Ok(Configuration {
        id: row.get::<i64, _>("id"),
        name: row.get::<String, _>("name"),
        credentials: Credentials {
            base_url: row.get::<String, _>("base_url"),
            email: row.get::<String, _>("email"),
            api_token: row.get::<String, _>("api_token"),
        },
        project_key: row.get::<String, _>("project_key"),
        workflow,
    })
}
