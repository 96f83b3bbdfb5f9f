use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Generated column so every insert keeps the search vector current
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE call_analytics.calls
                    ADD COLUMN IF NOT EXISTS transcript_tsv tsvector
                    GENERATED ALWAYS AS (to_tsvector('english', transcript)) STORED",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS calls_transcript_tsv
                    ON call_analytics.calls USING GIN (transcript_tsv)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "COMMENT ON INDEX call_analytics.calls_transcript_tsv
                    IS 'GIN index over english tsvector for fast full-text search'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS call_analytics.calls_transcript_tsv")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE call_analytics.calls DROP COLUMN IF EXISTS transcript_tsv")
            .await?;

        Ok(())
    }
}
