//! Database schema migrations.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_tables;
mod m20240201_000002_create_search_keywords;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_tables::Migration),
            Box::new(m20240201_000002_create_search_keywords::Migration),
        ]
    }
}
