//! Database operations for encrypted provider tokens.

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entity::user_access_token;

/// Store the (already encrypted) token pair, replacing any previous one.
pub async fn upsert(
    db: &impl ConnectionTrait,
    user_id: i64,
    access_token: String,
    refresh_token: Option<String>,
) -> Result<(), DbErr> {
    let model = user_access_token::ActiveModel {
        user_id: Set(user_id),
        access_token: Set(access_token),
        refresh_token: Set(refresh_token),
        ..Default::default()
    };

    user_access_token::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user_access_token::Column::UserId)
                .update_columns([
                    user_access_token::Column::AccessToken,
                    user_access_token::Column::RefreshToken,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

pub async fn find_by_user_id(
    db: &impl ConnectionTrait,
    user_id: i64,
) -> Result<Option<user_access_token::Model>, DbErr> {
    user_access_token::Entity::find_by_id(user_id).one(db).await
}
