use crate::error::Error;
use entity_api::call_insight;
use sea_orm::DatabaseConnection;

pub use entity_api::call_insight::AgentRollup;

/// Per-agent averages over every call that has an insight, busiest agents first.
pub async fn agent_rollup(db: &DatabaseConnection) -> Result<Vec<AgentRollup>, Error> {
    Ok(call_insight::agent_rollup(db).await?)
}
