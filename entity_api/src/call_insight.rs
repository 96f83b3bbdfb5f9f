//! Operations for the call_insights table and the per-agent rollup built on it.

use super::error::{EntityApiErrorKind, Error};
use entity::call_insights::{ActiveModel, Column, Entity, Model};
use entity::{calls, Id};
use log::*;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, FromQueryResult, Order, QueryOrder, QuerySelect,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Aggregated metrics for one agent across all of their calls that have insights.
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize, ToSchema)]
pub struct AgentRollup {
    pub agent_id: String,
    pub avg_sentiment: f64,
    pub avg_talk_ratio: f64,
    pub total_calls: i64,
}

/// Inserts the insight of a call. Insights are write-once: there is no update path.
pub async fn create(db: &impl ConnectionTrait, insight_model: Model) -> Result<Model, Error> {
    debug!(
        "New CallInsight to be inserted for call {}: sentiment={}, talk_ratio={}, embedding_len={}",
        insight_model.call_id,
        insight_model.customer_sentiment,
        insight_model.agent_talk_ratio,
        insight_model.embedding.len()
    );

    let active_model = ActiveModel {
        call_id: Set(insight_model.call_id.clone()),
        embedding: Set(insight_model.embedding.clone()),
        customer_sentiment: Set(insight_model.customer_sentiment),
        agent_talk_ratio: Set(insight_model.agent_talk_ratio),
    };

    let rows = Entity::insert(active_model)
        .exec_without_returning(db)
        .await?;
    if rows == 0 {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotInserted,
        });
    }

    Ok(insight_model)
}

pub async fn find_by_call_id(
    db: &impl ConnectionTrait,
    call_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find_by_id(call_id.to_owned()).one(db).await?)
}

/// Every stored embedding keyed by call id.
pub async fn find_embeddings(db: &impl ConnectionTrait) -> Result<Vec<(Id, Vec<f64>)>, Error> {
    Ok(Entity::find()
        .select_only()
        .column(Column::CallId)
        .column(Column::Embedding)
        .into_tuple::<(Id, Vec<f64>)>()
        .all(db)
        .await?)
}

/// Average sentiment, average talk ratio and call count per agent, busiest agents first.
pub async fn agent_rollup(db: &impl ConnectionTrait) -> Result<Vec<AgentRollup>, Error> {
    let call_count =
        SimpleExpr::FunctionCall(Func::count(Expr::col((calls::Entity, calls::Column::CallId))));

    Ok(calls::Entity::find()
        .select_only()
        .column(calls::Column::AgentId)
        .column_as(
            SimpleExpr::FunctionCall(Func::avg(Expr::col((
                Entity,
                Column::CustomerSentiment,
            )))),
            "avg_sentiment",
        )
        .column_as(
            SimpleExpr::FunctionCall(Func::avg(Expr::col((Entity, Column::AgentTalkRatio)))),
            "avg_talk_ratio",
        )
        .column_as(call_count.clone(), "total_calls")
        .inner_join(Entity)
        .group_by(calls::Column::AgentId)
        .order_by(call_count, Order::Desc)
        .into_model::<AgentRollup>()
        .all(db)
        .await?)
}
