pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_schema_and_base_db_setup;
mod m20251001_000002_create_calls_table;
mod m20251001_000003_add_transcript_tsv_gin_index;
mod m20251001_000004_create_call_insights_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_schema_and_base_db_setup::Migration),
            Box::new(m20251001_000002_create_calls_table::Migration),
            Box::new(m20251001_000003_add_transcript_tsv_gin_index::Migration),
            Box::new(m20251001_000004_create_call_insights_table::Migration),
        ]
    }
}
