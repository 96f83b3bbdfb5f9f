//! Ingestion of raw messages into calls and call insights.
//!
//! Three entry points share the same building blocks:
//! - [`ingest_batch`] runs a whole message table inside one transaction.
//! - [`insert_call_with_insights`] stores a single thread in its own transaction.
//! - [`backfill`] computes insights for stored calls that are missing one.

use crate::archive::RawArchive;
use crate::error::Error;
use crate::message::{self, RawMessage};
use crate::providers::Providers;
use crate::thread::{self, Thread};
use crate::{call_builder, calls, metrics};
use entity_api::{call, call_insight};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;

/// Counters describing one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct IngestReport {
    /// Threads reconstructed from the input messages
    pub threads: usize,
    /// Calls written to the database
    pub inserted: usize,
    /// Calls skipped because their id was already stored
    pub duplicates: usize,
    /// Threads lacking either a customer or an agent message
    pub ungeneratable: usize,
    /// Inserted calls whose metrics could not be computed; left for the backfill
    pub missing_insights: usize,
    /// Threads that failed on their own (bad timestamps, archive or metric errors)
    pub failed: usize,
}

/// What happened to a single thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Inserted { call: calls::Model, with_insight: bool },
    Duplicate(String),
    Ungeneratable,
}

impl IngestReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Inserted { with_insight, .. } => {
                self.inserted += 1;
                if !with_insight {
                    self.missing_insights += 1;
                }
            }
            Outcome::Duplicate(_) => self.duplicates += 1,
            Outcome::Ungeneratable => self.ungeneratable += 1,
        }
    }
}

/// Counters describing one backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BackfillReport {
    /// Calls found without an insight
    pub candidates: usize,
    pub created: usize,
    pub failed: usize,
}

/// Loads the CSV at `path` and ingests it as one batch.
pub async fn ingest_file(
    db: &DatabaseConnection,
    providers: &Providers,
    archive: &RawArchive,
    path: &Path,
) -> Result<IngestReport, Error> {
    let messages = message::load_messages_from_path(path)?;
    ingest_batch(db, providers, archive, &messages).await
}

/// Ingests every thread of `messages` inside one transaction committed at the end.
///
/// Thread-local failures are counted and logged without stopping the batch. A
/// call whose metrics fail is still stored, without an insight. Database
/// failures abort the batch and roll back everything written by it.
pub async fn ingest_batch(
    db: &DatabaseConnection,
    providers: &Providers,
    archive: &RawArchive,
    messages: &[RawMessage],
) -> Result<IngestReport, Error> {
    let threads = thread::reconstruct(messages);
    let mut report = IngestReport {
        threads: threads.len(),
        ..Default::default()
    };
    info!("{} threads found", threads.len());

    let txn = db.begin().await?;

    for thread in &threads {
        let Some(call_model) = build_or_skip(thread, &mut report) else {
            continue;
        };
        let call_id = call_model.call_id.clone();

        if call::exists(&txn, &call_id).await? {
            info!("Skipping duplicate call_id {call_id}");
            report.record(&Outcome::Duplicate(call_id));
            continue;
        }

        if let Err(err) = archive.store(&call_id, &thread.messages).await {
            error!("Failed to archive call {call_id}: {err}");
            report.failed += 1;
            continue;
        }

        let insight = match metrics::extract(providers, &call_id, &call_model.transcript).await {
            Ok(insight) => Some(insight),
            Err(err) => {
                warn!("Metrics unavailable for call {call_id}, leaving it for backfill: {err}");
                None
            }
        };

        let with_insight = insight.is_some();
        let call_model = call::create(&txn, call_model).await.map_err(|err| {
            error!("Failed to insert call {call_id}: {err}");
            err
        })?;
        if let Some(insight) = insight {
            call_insight::create(&txn, insight).await.map_err(|err| {
                error!("Failed to insert insight for call {call_id}: {err}");
                err
            })?;
        }

        debug!("Added call {call_id} to batch");
        report.record(&Outcome::Inserted {
            call: call_model,
            with_insight,
        });
    }

    txn.commit().await?;
    info!(
        "Committed {} calls ({} without insight, {} duplicates, {} ungeneratable, {} failed)",
        report.inserted,
        report.missing_insights,
        report.duplicates,
        report.ungeneratable,
        report.failed
    );

    Ok(report)
}

/// Runs `messages` through the single-call path thread by thread. One
/// thread's failure is counted and does not affect the others.
pub async fn ingest_threads(
    db: &DatabaseConnection,
    providers: &Providers,
    archive: &RawArchive,
    messages: &[RawMessage],
) -> Result<IngestReport, Error> {
    let threads = thread::reconstruct(messages);
    let mut report = IngestReport {
        threads: threads.len(),
        ..Default::default()
    };

    for thread in &threads {
        match insert_call_with_insights(db, providers, archive, thread).await {
            Ok(outcome) => report.record(&outcome),
            Err(err) => {
                error!("Failed to ingest thread: {err}");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Stores one thread as a call plus its insight, committed immediately.
///
/// Metrics are computed before the transaction opens; any failure returns an
/// error and leaves nothing behind in the database.
pub async fn insert_call_with_insights(
    db: &DatabaseConnection,
    providers: &Providers,
    archive: &RawArchive,
    thread: &Thread,
) -> Result<Outcome, Error> {
    let Some(call_model) = call_builder::build(thread)? else {
        debug!("Skipping thread without both a customer and an agent message");
        return Ok(Outcome::Ungeneratable);
    };
    let call_id = call_model.call_id.clone();
    debug!("Preparing to insert call {call_id}");

    if call::exists(db, &call_id).await? {
        info!("Skipping duplicate call_id {call_id}");
        return Ok(Outcome::Duplicate(call_id));
    }

    archive.store(&call_id, &thread.messages).await?;
    let insight = metrics::extract(providers, &call_id, &call_model.transcript).await?;

    let txn = db.begin().await?;
    let call_model = call::create(&txn, call_model).await?;
    call_insight::create(&txn, insight).await?;
    txn.commit().await.map_err(|err| {
        error!("Failed to commit call {call_id}: {err}");
        err
    })?;

    info!("Inserted call {call_id}");
    Ok(Outcome::Inserted {
        call: call_model,
        with_insight: true,
    })
}

/// Creates the missing insight of every stored call that lacks one. Existing
/// insights are never touched.
pub async fn backfill(
    db: &DatabaseConnection,
    providers: &Providers,
) -> Result<BackfillReport, Error> {
    let pending = call::find_without_insight(db).await?;
    let mut report = BackfillReport {
        candidates: pending.len(),
        ..Default::default()
    };
    info!("{} calls without insights", pending.len());

    for call_model in pending {
        let call_id = call_model.call_id;
        let insight = match metrics::extract(providers, &call_id, &call_model.transcript).await {
            Ok(insight) => insight,
            Err(err) => {
                warn!("Could not compute metrics for call {call_id}: {err}");
                report.failed += 1;
                continue;
            }
        };

        match call_insight::create(db, insight).await {
            Ok(_) => {
                debug!("Backfilled insight for call {call_id}");
                report.created += 1;
            }
            Err(err) => {
                error!("Failed to insert insight for call {call_id}: {err}");
                report.failed += 1;
            }
        }
    }

    info!(
        "Backfill finished: {} created, {} failed",
        report.created, report.failed
    );
    Ok(report)
}

fn build_or_skip(thread: &Thread, report: &mut IngestReport) -> Option<calls::Model> {
    match call_builder::build(thread) {
        Ok(Some(call_model)) => Some(call_model),
        Ok(None) => {
            report.record(&Outcome::Ungeneratable);
            None
        }
        Err(err) => {
            error!("Skipping thread: {err}");
            report.failed += 1;
            None
        }
    }
}
