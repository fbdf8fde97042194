//! Database operations for user statistics.

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::user_statistics;
use crate::models::User;

fn active_model(user_id: i64, profile: &User) -> user_statistics::ActiveModel {
    user_statistics::ActiveModel {
        user_id: Set(user_id),
        avatar_url: Set(profile.avatar_url.clone()),
        location: Set(profile.location.clone()),
        public_repositories: Set(profile.public_repositories),
        followers: Set(profile.followers),
        following: Set(profile.following),
        ..Default::default()
    }
}

/// Insert the first statistics row for a user.
pub async fn insert(
    db: &impl ConnectionTrait,
    user_id: i64,
    profile: &User,
) -> Result<(), DbErr> {
    user_statistics::Entity::insert(active_model(user_id, profile))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Insert or overwrite the statistics row for a user.
pub async fn upsert(
    db: &impl ConnectionTrait,
    user_id: i64,
    profile: &User,
) -> Result<(), DbErr> {
    user_statistics::Entity::insert(active_model(user_id, profile))
        .on_conflict(
            OnConflict::column(user_statistics::Column::UserId)
                .update_columns([
                    user_statistics::Column::AvatarUrl,
                    user_statistics::Column::Location,
                    user_statistics::Column::PublicRepositories,
                    user_statistics::Column::Followers,
                    user_statistics::Column::Following,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}
