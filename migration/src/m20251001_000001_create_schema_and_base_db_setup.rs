use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS call_analytics;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO call_analytics, public;")
            .await?;

        // The application connects as `calls`
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL ON SCHEMA call_analytics TO calls;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA call_analytics GRANT ALL ON TABLES TO calls;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA call_analytics GRANT ALL ON SEQUENCES TO calls;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA call_analytics REVOKE ALL ON SEQUENCES FROM calls;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA call_analytics REVOKE ALL ON TABLES FROM calls;
                    REVOKE ALL ON SCHEMA call_analytics FROM calls;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS call_analytics CASCADE;")
            .await?;

        Ok(())
    }
}
