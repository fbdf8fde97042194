//! Database operations for durable sessions.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use sha2::{Digest, Sha256};

use crate::entity::user_session;

/// Hash a session token using SHA-256.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create or replace the session for `user_id`. The previous token stops working.
pub async fn upsert(
    db: &impl ConnectionTrait,
    user_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), DbErr> {
    let model = user_session::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(token_hash.to_string()),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now()),
    };

    user_session::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user_session::Column::UserId)
                .update_columns([
                    user_session::Column::TokenHash,
                    user_session::Column::ExpiresAt,
                    user_session::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Find an unexpired session by its hash. Returns the user_id if valid.
pub async fn find_valid_by_hash(
    db: &impl ConnectionTrait,
    token_hash: &str,
) -> Result<Option<i64>, DbErr> {
    let result = user_session::Entity::find()
        .filter(user_session::Column::TokenHash.eq(token_hash))
        .filter(user_session::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?;

    Ok(result.map(|m| m.user_id))
}

/// Delete a session by its hash. Returns `true` if a row was removed.
pub async fn delete_by_hash(
    db: &impl ConnectionTrait,
    token_hash: &str,
) -> Result<bool, DbErr> {
    let result = user_session::Entity::delete_many()
        .filter(user_session::Column::TokenHash.eq(token_hash))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Delete expired sessions (cleanup job).
pub async fn delete_expired(db: &impl ConnectionTrait) -> Result<u64, DbErr> {
    let result = user_session::Entity::delete_many()
        .filter(user_session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
