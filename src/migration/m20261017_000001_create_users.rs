//! Migration: Create users table.
//!
//! One row per provider account. Also installs the shared `updated_at` trigger
//! function used by later tables.

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE users (
                    id BIGSERIAL PRIMARY KEY,
                    provider SMALLINT NOT NULL CHECK (provider IN (0, 1)),
                    provider_id BIGINT NOT NULL,
                    node_id VARCHAR(100) NOT NULL DEFAULT '',
                    name VARCHAR(255) NOT NULL,
                    username VARCHAR(100) NOT NULL,
                    email VARCHAR(255),
                    profile_url VARCHAR(500) NOT NULL,

                    created_at TIMESTAMPTZ NOT NULL,
                    registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE UNIQUE INDEX idx_users_provider_id
                    ON users(provider, provider_id);

                CREATE UNIQUE INDEX idx_users_provider_username
                    ON users(provider, username);

                -- Email is optional; uniqueness only applies when present
                CREATE UNIQUE INDEX idx_users_provider_email
                    ON users(provider, email)
                    WHERE email IS NOT NULL;

                CREATE INDEX idx_users_username ON users(username);
                CREATE INDEX idx_users_email ON users(email) WHERE email IS NOT NULL;

                CREATE TRIGGER update_users_updated_at
                    BEFORE UPDATE ON users
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
                DROP TRIGGER IF EXISTS update_users_updated_at ON users;
                DROP TABLE IF EXISTS users CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
