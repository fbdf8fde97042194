//! PostgreSQL-backed [`UserStore`].

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseTransaction;
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, warn};

use super::{StoreError, UserStore};
use crate::db::{
    self, DbPool, user_access_tokens, user_repositories, user_statistics, users,
    users::UserRow,
};
use crate::entity::{user, user_repository, user_statistics as stats_entity};
use crate::models::{Provider, ProviderToken, Repository, User};
use crate::services::cipher::SymmetricCipher;

pub struct PostgresUserStore {
    pool: DbPool,
    cipher: SymmetricCipher,
}

impl PostgresUserStore {
    pub fn new(pool: DbPool, cipher: SymmetricCipher) -> Self {
        Self { pool, cipher }
    }
}

/// Commit on success, roll back on failure. A failing rollback is reported
/// together with the error that caused it.
async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            txn.commit().await.map_err(StoreError::Commit)?;
            Ok(value)
        }
        Err(err) => match txn.rollback().await {
            Ok(()) => Err(err),
            Err(rollback) => {
                error!("Transaction rollback failed: {} (cause: {})", rollback, err);
                Err(StoreError::Rollback {
                    source: Box::new(err),
                    rollback,
                })
            }
        },
    }
}

/// Statistics are joined as if by INNER JOIN: a user without them is not found.
fn row_to_user(row: Option<UserRow>) -> Result<User, StoreError> {
    match row {
        Some((user, Some(stats))) => assemble_user(user, Some(stats)),
        _ => Err(StoreError::UserNotFound),
    }
}

/// Identity lookup for login. A user row whose statistics were never written
/// is still the same identity; it comes back with zeroed statistics so the
/// caller refreshes them instead of inserting the user again.
fn row_to_identity(row: Option<UserRow>) -> Result<User, StoreError> {
    match row {
        Some((user, stats)) => {
            if stats.is_none() {
                warn!(user_id = user.id, "User has no statistics row");
            }
            assemble_user(user, stats)
        }
        None => Err(StoreError::UserNotFound),
    }
}

fn assemble_user(
    user: user::Model,
    stats: Option<stats_entity::Model>,
) -> Result<User, StoreError> {
    let provider = Provider::try_from(user.provider)
        .map_err(|v| StoreError::Corrupted(format!("user {} has provider {}", user.id, v)))?;

    let (avatar_url, location, public_repositories, followers, following) = match stats {
        Some(s) => (s.avatar_url, s.location, s.public_repositories, s.followers, s.following),
        None => (None, None, 0, 0, 0),
    };

    Ok(User {
        id: user.id,
        provider,
        provider_id: user.provider_id,
        node_id: user.node_id,
        name: user.name,
        username: user.username,
        avatar_url,
        profile_url: user.profile_url,
        location,
        email: user.email,
        public_repositories,
        followers,
        following,
        created_at: user.created_at,
        registered_at: Some(user.registered_at),
    })
}

fn model_to_repository(model: user_repository::Model) -> Result<Repository, StoreError> {
    let provider = Provider::try_from(model.provider).map_err(|v| {
        StoreError::Corrupted(format!("repository {} has provider {}", model.id, v))
    })?;

    Ok(Repository {
        id: model.repository_id,
        provider,
        name: model.name,
        url: model.url,
        description: model.description,
        fork: model.fork,
        forks_count: model.forks_count,
        stars_count: model.stars_count,
        owner_username: model.owner_username,
        created_at: model.created_at,
        last_activity_at: model.last_activity_at,
    })
}

async fn insert_repositories(
    txn: &DatabaseTransaction,
    user_id: i64,
    repositories: &[Repository],
) -> Result<(), StoreError> {
    let snapshot_at = Utc::now();
    for repository in repositories {
        user_repositories::insert(txn, user_id, repository, snapshot_at).await?;
    }
    Ok(())
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn create_user(&self, user: &User) -> Result<i64, StoreError> {
        let txn = db::begin_write(self.pool.connection()).await?;
        let result = users::insert(&txn, user).await.map_err(StoreError::from);
        finish(txn, result).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User, StoreError> {
        let txn = db::begin_read(self.pool.connection()).await?;
        let result = users::find_by_id(&txn, id)
            .await
            .map_err(StoreError::from)
            .and_then(row_to_user);
        finish(txn, result).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        if username.is_empty() {
            return Err(StoreError::ParameterEmpty);
        }

        let txn = db::begin_read(self.pool.connection()).await?;
        let result = users::find_by_username(&txn, username)
            .await
            .map_err(StoreError::from)
            .and_then(row_to_user);
        finish(txn, result).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        if email.is_empty() {
            return Err(StoreError::ParameterEmpty);
        }

        let txn = db::begin_read(self.pool.connection()).await?;
        let result = users::find_by_email(&txn, email)
            .await
            .map_err(StoreError::from)
            .and_then(row_to_user);
        finish(txn, result).await
    }

    async fn get_user_by_provider_id(
        &self,
        provider: Provider,
        provider_id: i64,
    ) -> Result<User, StoreError> {
        let txn = db::begin_read(self.pool.connection()).await?;
        let result = users::find_by_provider_id(&txn, provider.as_i16(), provider_id)
            .await
            .map_err(StoreError::from)
            .and_then(row_to_identity);
        finish(txn, result).await
    }

    async fn create_user_statistics(&self, user_id: i64, user: &User) -> Result<(), StoreError> {
        let txn = db::begin_write(self.pool.connection()).await?;
        let result = user_statistics::insert(&txn, user_id, user)
            .await
            .map_err(StoreError::from);
        finish(txn, result).await
    }

    async fn refresh_user_statistics(
        &self,
        user_id: i64,
        user: &User,
    ) -> Result<(), StoreError> {
        let txn = db::begin_write(self.pool.connection()).await?;
        let result = user_statistics::upsert(&txn, user_id, user)
            .await
            .map_err(StoreError::from);
        finish(txn, result).await
    }

    async fn create_user_repository(
        &self,
        user_id: i64,
        repositories: &[Repository],
    ) -> Result<(), StoreError> {
        if repositories.is_empty() {
            return Ok(());
        }

        let txn = db::begin_write(self.pool.connection()).await?;
        let result = insert_repositories(&txn, user_id, repositories).await;
        finish(txn, result).await
    }

    async fn get_user_repository_by_user_id(
        &self,
        user_id: i64,
    ) -> Result<Vec<Repository>, StoreError> {
        let txn = db::begin_read(self.pool.connection()).await?;
        let result = match user_repositories::find_latest_snapshot(&txn, user_id).await {
            Ok(models) => models.into_iter().map(model_to_repository).collect(),
            Err(e) => Err(StoreError::from(e)),
        };
        finish(txn, result).await
    }

    async fn create_user_access_token(
        &self,
        user_id: i64,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), StoreError> {
        let access = self.cipher.encrypt(access_token.expose_secret())?;
        let refresh = refresh_token
            .map(|t| self.cipher.encrypt(t.expose_secret()))
            .transpose()?;

        let txn = db::begin_snapshot(self.pool.connection()).await?;
        let result = user_access_tokens::upsert(&txn, user_id, access, refresh)
            .await
            .map_err(StoreError::from);
        finish(txn, result).await
    }

    async fn get_user_access_token(&self, user_id: i64) -> Result<ProviderToken, StoreError> {
        let txn = db::begin_read(self.pool.connection()).await?;
        let result = user_access_tokens::find_by_user_id(&txn, user_id)
            .await
            .map_err(StoreError::from);
        let stored = finish(txn, result).await?.ok_or(StoreError::TokenNotFound)?;

        let access = self.cipher.decrypt(&stored.access_token)?;
        let refresh = stored
            .refresh_token
            .map(|t| self.cipher.decrypt(&t))
            .transpose()?;

        Ok(ProviderToken::new(access, refresh))
    }
}
