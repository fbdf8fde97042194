//! Database operations for repository snapshots.

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::entity::user_repository;
use crate::models::Repository;

/// Insert one repository row belonging to the snapshot taken at `snapshot_at`.
pub async fn insert(
    db: &impl ConnectionTrait,
    user_id: i64,
    repository: &Repository,
    snapshot_at: DateTime<Utc>,
) -> Result<(), DbErr> {
    let model = user_repository::ActiveModel {
        user_id: Set(user_id),
        provider: Set(repository.provider.as_i16()),
        repository_id: Set(repository.id),
        name: Set(repository.name.clone()),
        url: Set(repository.url.clone()),
        description: Set(repository.description.clone()),
        fork: Set(repository.fork),
        forks_count: Set(repository.forks_count),
        stars_count: Set(repository.stars_count),
        owner_username: Set(repository.owner_username.clone()),
        created_at: Set(repository.created_at),
        last_activity_at: Set(repository.last_activity_at),
        snapshot_at: Set(snapshot_at),
        ..Default::default()
    };

    user_repository::Entity::insert(model)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Rows of the most recent snapshot for a user, oldest insert first.
pub async fn find_latest_snapshot(
    db: &impl ConnectionTrait,
    user_id: i64,
) -> Result<Vec<user_repository::Model>, DbErr> {
    let latest = user_repository::Entity::find()
        .filter(user_repository::Column::UserId.eq(user_id))
        .order_by_desc(user_repository::Column::SnapshotAt)
        .one(db)
        .await?;

    let Some(latest) = latest else {
        return Ok(Vec::new());
    };

    user_repository::Entity::find()
        .filter(user_repository::Column::UserId.eq(user_id))
        .filter(user_repository::Column::SnapshotAt.eq(latest.snapshot_at))
        .order_by_asc(user_repository::Column::Id)
        .all(db)
        .await
}
