//! Database operations for users.

use chrono::Utc;
use sea_orm::*;

use crate::entity::{user, user_statistics};
use crate::models::User;

/// Joined user and statistics rows.
pub type UserRow = (user::Model, Option<user_statistics::Model>);

/// Insert a new user and return its id. `registered_at` is set to now.
pub async fn insert(db: &impl ConnectionTrait, profile: &User) -> Result<i64, DbErr> {
    let model = user::ActiveModel {
        provider: Set(profile.provider.as_i16()),
        provider_id: Set(profile.provider_id),
        node_id: Set(profile.node_id.clone()),
        name: Set(profile.name.clone()),
        username: Set(profile.username.clone()),
        email: Set(profile.email.clone()),
        profile_url: Set(profile.profile_url.clone()),
        created_at: Set(profile.created_at),
        registered_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model).exec(db).await?;
    Ok(result.last_insert_id)
}

async fn find_one(
    db: &impl ConnectionTrait,
    condition: Condition,
) -> Result<Option<UserRow>, DbErr> {
    user::Entity::find()
        .filter(condition)
        .order_by_asc(user::Column::Id)
        .find_also_related(user_statistics::Entity)
        .one(db)
        .await
}

pub async fn find_by_id(
    db: &impl ConnectionTrait,
    id: i64,
) -> Result<Option<UserRow>, DbErr> {
    find_one(db, Condition::all().add(user::Column::Id.eq(id))).await
}

/// Usernames are unique per provider; across providers the oldest account wins.
pub async fn find_by_username(
    db: &impl ConnectionTrait,
    username: &str,
) -> Result<Option<UserRow>, DbErr> {
    find_one(db, Condition::all().add(user::Column::Username.eq(username))).await
}

pub async fn find_by_email(
    db: &impl ConnectionTrait,
    email: &str,
) -> Result<Option<UserRow>, DbErr> {
    find_one(db, Condition::all().add(user::Column::Email.eq(email))).await
}

pub async fn find_by_provider_id(
    db: &impl ConnectionTrait,
    provider: i16,
    provider_id: i64,
) -> Result<Option<UserRow>, DbErr> {
    find_one(
        db,
        Condition::all()
            .add(user::Column::Provider.eq(provider))
            .add(user::Column::ProviderId.eq(provider_id)),
    )
    .await
}
