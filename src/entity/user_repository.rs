//! Public repository snapshot row. All rows written by one login share
//! `snapshot_at`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_repositories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub provider: i16,
    pub repository_id: i64,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub forks_count: i64,
    pub stars_count: i64,
    pub owner_username: String,
    pub created_at: DateTimeUtc,
    pub last_activity_at: DateTimeUtc,
    pub snapshot_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
