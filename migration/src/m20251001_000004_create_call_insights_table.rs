use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One insight per call: the primary key doubles as the foreign key.
        let create_table_sql = "CREATE TABLE IF NOT EXISTS call_analytics.call_insights (
            call_id VARCHAR PRIMARY KEY,
            embedding DOUBLE PRECISION[] NOT NULL,
            customer_sentiment DOUBLE PRECISION NOT NULL
                CHECK (customer_sentiment BETWEEN -1.0 AND 1.0),
            agent_talk_ratio DOUBLE PRECISION NOT NULL
                CHECK (agent_talk_ratio BETWEEN 0.0 AND 1.0),
            CONSTRAINT fk_call_insights_call
                FOREIGN KEY (call_id)
                REFERENCES call_analytics.calls(call_id)
                ON DELETE CASCADE
        )";

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("call_insights_customer_sentiment")
                    .table((Alias::new("call_analytics"), Alias::new("call_insights")))
                    .col(Alias::new("customer_sentiment"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("call_insights_agent_talk_ratio")
                    .table((Alias::new("call_analytics"), Alias::new("call_insights")))
                    .col(Alias::new("agent_talk_ratio"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS call_analytics.call_insights")
            .await?;

        Ok(())
    }
}
