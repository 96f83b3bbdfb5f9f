//! SeaORM Entity for the call_insights table.
//! Holds the ML-derived metrics of exactly one call.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_insights::Model)]
#[sea_orm(schema_name = "call_analytics", table_name = "call_insights")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub call_id: Id,

    /// Mean sentence embedding of the transcript; empty when it had no sentences
    pub embedding: Vec<f64>,

    /// Signed sentiment score (-1.0 - 1.0)
    pub customer_sentiment: f64,

    /// Share of non-filler words spoken by the agent (0.0 - 1.0)
    pub agent_talk_ratio: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::calls::Entity",
        from = "Column::CallId",
        to = "super::calls::Column::CallId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Calls,
}

impl Related<super::calls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Calls.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
