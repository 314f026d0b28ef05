pub use sea_orm_migration::prelude::*;

mod m20251016_000001_create_wiki_tables;
mod m20251016_000002_create_session_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251016_000001_create_wiki_tables::Migration),
            Box::new(m20251016_000002_create_session_tables::Migration),
        ]
    }
}
