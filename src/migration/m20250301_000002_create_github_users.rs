//! Create github_users table.
//!
//! GitHub identities live in their own namespace; the row id is the session
//! principal for OAuth logins.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GithubUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GithubUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GithubUsers::GithubId).big_integer().not_null())
                    .col(ColumnDef::new(GithubUsers::Username).string().not_null())
                    .col(
                        ColumnDef::new(GithubUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_github_users_github_id")
                    .table(GithubUsers::Table)
                    .col(GithubUsers::GithubId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(GithubUsers::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub enum GithubUsers {
    Table,
    Id,
    GithubId,
    Username,
    CreatedAt,
}
