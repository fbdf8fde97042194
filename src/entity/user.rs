//! Local user identity, one row per provider account.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub provider: i16,
    pub provider_id: i64,
    pub node_id: String,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub profile_url: String,
    /// Account creation time at the provider.
    pub created_at: DateTimeUtc,
    pub registered_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::user_statistics::Entity")]
    Statistics,
    #[sea_orm(has_many = "super::user_repository::Entity")]
    Repositories,
}

impl Related<super::user_statistics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statistics.def()
    }
}

impl Related<super::user_repository::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repositories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
