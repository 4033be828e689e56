pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250101_000001_create_short_urls;
mod m20250101_000002_owner_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_short_urls::Migration),
            Box::new(m20250101_000002_owner_index::Migration),
        ]
    }
}
