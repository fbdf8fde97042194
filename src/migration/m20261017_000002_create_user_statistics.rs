//! Migration: Create user_statistics table.

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
                CREATE TABLE user_statistics (
                    user_id BIGINT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
                    avatar_url VARCHAR(500),
                    location VARCHAR(255),
                    -- -1 when the provider does not report it
                    public_repositories BIGINT NOT NULL DEFAULT 0,
                    followers BIGINT NOT NULL DEFAULT 0,
                    following BIGINT NOT NULL DEFAULT 0,

                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_user_statistics_updated_at
                    BEFORE UPDATE ON user_statistics
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_user_statistics_updated_at ON user_statistics;
                DROP TABLE IF EXISTS user_statistics CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
