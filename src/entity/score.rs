//! Score entity: one append-only row per finished game.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub github_user_id: Option<i32>,
    pub score: i32,
    pub avg_speed: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::github_user::Entity",
        from = "Column::GithubUserId",
        to = "super::github_user::Column::Id",
        on_delete = "SetNull"
    )]
    GithubUser,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::github_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GithubUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
