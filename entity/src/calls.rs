//! SeaORM Entity for the calls table.
//! One row per reconstructed conversation thread.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::calls::Model)]
#[sea_orm(schema_name = "call_analytics", table_name = "calls")]
pub struct Model {
    /// Identifier of the first agent message of the thread
    #[sea_orm(primary_key, auto_increment = false)]
    pub call_id: Id,

    pub agent_id: String,

    pub customer_id: String,

    /// Language code (default: en)
    pub language: String,

    /// Timestamp of the first message in the thread
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTime,

    /// Seconds between the first and last message, never negative
    pub duration_seconds: i32,

    /// Speaker-labeled transcript, one message per line
    #[sea_orm(column_type = "Text")]
    pub transcript: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::call_insights::Entity")]
    CallInsights,
}

impl Related<super::call_insights::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallInsights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
