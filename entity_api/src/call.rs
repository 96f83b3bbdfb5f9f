//! CRUD and query operations for the calls table.

use super::error::{EntityApiErrorKind, Error};
use entity::call_insights;
use entity::calls::{ActiveModel, Column, Entity, Model};
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, Condition, PaginatorTrait, QueryOrder, QuerySelect,
};

/// Filters accepted when listing calls. Every field is optional and all
/// provided filters must hold.
#[derive(Debug, Clone, Default)]
pub struct CallFilter {
    pub agent_id: Option<String>,
    /// Inclusive lower bound on `start_time`
    pub from_date: Option<DateTime>,
    /// Inclusive upper bound on `start_time`
    pub to_date: Option<DateTime>,
    pub min_sentiment: Option<f64>,
    pub max_sentiment: Option<f64>,
}

impl CallFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(agent_id) = &self.agent_id {
            condition = condition.add(Column::AgentId.eq(agent_id.clone()));
        }
        if let Some(from_date) = self.from_date {
            condition = condition.add(Column::StartTime.gte(from_date));
        }
        if let Some(to_date) = self.to_date {
            condition = condition.add(Column::StartTime.lte(to_date));
        }
        if let Some(min_sentiment) = self.min_sentiment {
            condition = condition.add(call_insights::Column::CustomerSentiment.gte(min_sentiment));
        }
        if let Some(max_sentiment) = self.max_sentiment {
            condition = condition.add(call_insights::Column::CustomerSentiment.lte(max_sentiment));
        }

        condition
    }
}

/// Inserts a new call. The caller decides which connection or transaction the
/// write belongs to.
pub async fn create(db: &impl ConnectionTrait, call_model: Model) -> Result<Model, Error> {
    debug!("New Call Model to be inserted: {}", call_model.call_id);

    let active_model = ActiveModel {
        call_id: Set(call_model.call_id.clone()),
        agent_id: Set(call_model.agent_id.clone()),
        customer_id: Set(call_model.customer_id.clone()),
        language: Set(call_model.language.clone()),
        start_time: Set(call_model.start_time),
        duration_seconds: Set(call_model.duration_seconds),
        transcript: Set(call_model.transcript.clone()),
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

    Ok(call_model)
}

pub async fn find_by_id(db: &impl ConnectionTrait, call_id: &str) -> Result<Model, Error> {
    Entity::find_by_id(call_id.to_owned())
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// Identifier equality is the only duplicate criterion for calls.
pub async fn exists(db: &impl ConnectionTrait, call_id: &str) -> Result<bool, Error> {
    Ok(Entity::find_by_id(call_id.to_owned())
        .one(db)
        .await?
        .is_some())
}

/// Finds a call together with its insight, if one has been computed yet.
pub async fn find_by_id_with_insight(
    db: &impl ConnectionTrait,
    call_id: &str,
) -> Result<(Model, Option<call_insights::Model>), Error> {
    Entity::find_by_id(call_id.to_owned())
        .find_also_related(call_insights::Entity)
        .one(db)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })
}

/// Lists calls that have an insight, newest first, returning the total number
/// of matches alongside the requested page.
pub async fn find_with_insights(
    db: &impl ConnectionTrait,
    filter: &CallFilter,
    limit: u64,
    offset: u64,
) -> Result<(u64, Vec<(Model, call_insights::Model)>), Error> {
    let query = Entity::find()
        .inner_join(call_insights::Entity)
        .filter(filter.condition());

    let total = query.clone().count(db).await?;

    let rows = query
        .select_also(call_insights::Entity)
        .order_by_desc(Column::StartTime)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await?;

    // The inner join guarantees an insight on every row.
    let page = rows
        .into_iter()
        .filter_map(|(call, insight)| insight.map(|insight| (call, insight)))
        .collect();

    Ok((total, page))
}

/// Calls for which no insight row exists.
pub async fn find_without_insight(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .left_join(call_insights::Entity)
        .filter(call_insights::Column::CallId.is_null())
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn call_model(call_id: &str) -> Model {
        Model {
            call_id: call_id.to_owned(),
            agent_id: "AppleSupport".to_owned(),
            customer_id: "115712".to_owned(),
            language: "en".to_owned(),
            start_time: chrono::NaiveDate::from_ymd_opt(2017, 10, 31)
                .unwrap()
                .and_hms_opt(22, 10, 47)
                .unwrap(),
            duration_seconds: 120,
            transcript: "Customer (115712): my phone died\nAgent (AppleSupport): sorry to hear"
                .to_owned(),
        }
    }

    #[tokio::test]
    async fn create_inserts_the_call_and_returns_it() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let model = call_model("119237");
        let created = create(&db, model.clone()).await?;

        assert_eq!(created, model);
        assert_eq!(db.into_transaction_log().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_unknown_call() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, "missing").await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn exists_is_true_only_when_a_row_comes_back() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![call_model("119237")], Vec::<Model>::new()])
            .into_connection();

        assert!(exists(&db, "119237").await?);
        assert!(!exists(&db, "119238").await?);

        assert_eq!(db.into_transaction_log().len(), 2);

        Ok(())
    }
}
