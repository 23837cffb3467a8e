//! SeaORM database migrations.
//!
//! Migrations are additive and tracked in `seaql_migrations`; running the
//! migrator against an up-to-date database is a no-op.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users;
mod m20250301_000002_create_github_users;
mod m20250301_000003_create_scores;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users::Migration),
            Box::new(m20250301_000002_create_github_users::Migration),
            Box::new(m20250301_000003_create_scores::Migration),
        ]
    }
}
