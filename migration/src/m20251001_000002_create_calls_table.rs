use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // call_id is the id of the first agent message of the thread, so it
        // is assigned by ingestion rather than generated here.
        let create_table_sql = "CREATE TABLE IF NOT EXISTS call_analytics.calls (
            call_id VARCHAR PRIMARY KEY,
            agent_id VARCHAR NOT NULL,
            customer_id VARCHAR NOT NULL,
            language VARCHAR NOT NULL DEFAULT 'en',
            start_time TIMESTAMP NOT NULL,
            duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
            transcript TEXT NOT NULL
        )";

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("calls_agent_id")
                    .table((Alias::new("call_analytics"), Alias::new("calls")))
                    .col(Alias::new("agent_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("calls_start_time")
                    .table((Alias::new("call_analytics"), Alias::new("calls")))
                    .col(Alias::new("start_time"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Dropping the table also drops its indexes
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS call_analytics.calls")
            .await?;

        Ok(())
    }
}
