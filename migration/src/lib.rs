pub use sea_orm_migration::prelude::*;

mod m20250601_090000_create_catalog_tables;
mod m20250601_090100_add_trigram_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_090000_create_catalog_tables::Migration),
            Box::new(m20250601_090100_add_trigram_indexes::Migration),
        ]
    }
}
