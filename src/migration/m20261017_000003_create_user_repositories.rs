//! Migration: Create user_repositories table.
//!
//! Append-only; every login writes a new snapshot.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE user_repositories (
                    id BIGSERIAL PRIMARY KEY,
                    user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    provider SMALLINT NOT NULL CHECK (provider IN (0, 1)),
                    repository_id BIGINT NOT NULL,
                    name VARCHAR(255) NOT NULL,
                    url VARCHAR(500) NOT NULL,
                    description TEXT,
                    fork BOOLEAN NOT NULL DEFAULT FALSE,
                    forks_count BIGINT NOT NULL DEFAULT 0,
                    stars_count BIGINT NOT NULL DEFAULT 0,
                    owner_username VARCHAR(100) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    last_activity_at TIMESTAMPTZ NOT NULL,
                    snapshot_at TIMESTAMPTZ NOT NULL
                );

                -- Latest snapshot lookup
                CREATE INDEX idx_user_repositories_user_snapshot
                    ON user_repositories(user_id, snapshot_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS user_repositories CASCADE;")
            .await?;

        Ok(())
    }
}
