//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261017_000001_create_users;
mod m20261017_000002_create_user_statistics;
mod m20261017_000003_create_user_repositories;
mod m20261017_000004_create_user_accesstoken;
mod m20261017_000005_create_user_sessions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261017_000001_create_users::Migration),
            Box::new(m20261017_000002_create_user_statistics::Migration),
            Box::new(m20261017_000003_create_user_repositories::Migration),
            Box::new(m20261017_000004_create_user_accesstoken::Migration),
            Box::new(m20261017_000005_create_user_sessions::Migration),
        ]
    }
}
