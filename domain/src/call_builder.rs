//! Turns a reconstructed thread into a normalized call record.

use crate::calls;
use crate::error::{Error, IngestErrorKind};
use crate::message::RawMessage;
use crate::thread::Thread;
use log::*;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Builds the call for `thread`.
///
/// Returns `Ok(None)` when the thread is ungeneratable, i.e. it lacks either a
/// customer or an agent message. Timestamps are only parsed once both roles
/// are present; a parse failure or a message older than the one it answers
/// fails this thread alone.
pub fn build(thread: &Thread) -> Result<Option<calls::Model>, Error> {
    let agent = thread.messages.iter().find(|m| m.is_outbound());
    let customer = thread.messages.iter().find(|m| m.inbound);
    let (Some(agent), Some(customer)) = (agent, customer) else {
        return Ok(None);
    };

    let timestamps = thread
        .messages
        .iter()
        .map(RawMessage::timestamp)
        .collect::<Result<Vec<_>, Error>>()?;
    let (Some(&start_time), Some(&end_time)) = (timestamps.first(), timestamps.last()) else {
        return Ok(None);
    };

    if let Some(step) = timestamps.windows(2).position(|pair| pair[1] < pair[0]) {
        warn!(
            "Message {} of thread {} is older than the message it answers",
            thread.messages[step + 1].message_id,
            agent.message_id
        );
        return Err(Error::ingest(IngestErrorKind::OrderingViolation(
            agent.message_id.clone(),
        )));
    }
    let elapsed = (end_time - start_time).num_seconds();
    let duration_seconds = i32::try_from(elapsed)
        .map_err(|_| Error::ingest(IngestErrorKind::OrderingViolation(agent.message_id.clone())))?;

    Ok(Some(calls::Model {
        call_id: agent.message_id.clone(),
        agent_id: agent.author_id.clone(),
        customer_id: customer.author_id.clone(),
        language: DEFAULT_LANGUAGE.to_string(),
        start_time,
        duration_seconds,
        transcript: transcript(thread),
    }))
}

/// `Agent (<author>): <text>` / `Customer (<author>): <text>` lines in thread order.
pub fn transcript(thread: &Thread) -> String {
    thread
        .messages
        .iter()
        .map(|m| {
            let role = if m.inbound { "Customer" } else { "Agent" };
            format!("{role} ({}): {}", m.author_id, m.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    fn message(id: &str, author: &str, inbound: bool, created_at: &str, text: &str) -> RawMessage {
        RawMessage {
            message_id: id.to_string(),
            author_id: author.to_string(),
            inbound,
            created_at: created_at.to_string(),
            text: text.to_string(),
            parent_id: None,
        }
    }

    #[test]
    fn customer_question_and_agent_answer_build_a_call() {
        let thread = Thread {
            messages: vec![
                message("1", "C", true, "Mon Jan 01 10:00:00 +0000 2024", "hi"),
                message("2", "A", false, "Mon Jan 01 10:00:30 +0000 2024", "hello"),
            ],
        };

        let call = build(&thread).unwrap().unwrap();

        assert_eq!(call.call_id, "2");
        assert_eq!(call.agent_id, "A");
        assert_eq!(call.customer_id, "C");
        assert_eq!(call.language, "en");
        assert_eq!(call.duration_seconds, 30);
        assert_eq!(call.start_time.to_string(), "2024-01-01 10:00:00");
        assert_eq!(call.transcript, "Customer (C): hi\nAgent (A): hello");
    }

    #[test]
    fn agent_only_thread_is_ungeneratable() {
        let thread = Thread {
            messages: vec![
                message("1", "A", false, "Mon Jan 01 10:00:00 +0000 2024", "ping"),
                message("2", "A", false, "Mon Jan 01 10:01:00 +0000 2024", "pong"),
            ],
        };

        assert_eq!(build(&thread).unwrap(), None);
    }

    #[test]
    fn roles_are_checked_before_timestamps() {
        let thread = Thread {
            messages: vec![message("1", "C", true, "not a timestamp", "hello?")],
        };

        assert_eq!(build(&thread).unwrap(), None);
    }

    #[test]
    fn backwards_thread_is_an_ordering_violation() {
        let thread = Thread {
            messages: vec![
                message("1", "C", true, "Mon Jan 01 10:00:30 +0000 2024", "hi"),
                message("2", "A", false, "Mon Jan 01 10:00:00 +0000 2024", "hello"),
            ],
        };

        let err = build(&thread).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Ingest(
                IngestErrorKind::OrderingViolation("2".to_string())
            ))
        );
    }

    #[test]
    fn out_of_order_middle_message_is_an_ordering_violation() {
        let thread = Thread {
            messages: vec![
                message("1", "C", true, "Mon Jan 01 10:00:00 +0000 2024", "hi"),
                message("2", "A", false, "Mon Jan 01 10:05:00 +0000 2024", "hello"),
                message("3", "C", true, "Mon Jan 01 10:02:00 +0000 2024", "still there?"),
            ],
        };

        let err = build(&thread).unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Ingest(
                IngestErrorKind::OrderingViolation("2".to_string())
            ))
        );
    }

    #[test]
    fn reconstructed_reply_pair_becomes_a_call() {
        let question = message("1", "C", true, "Mon Jan 01 10:00:00 +0000 2024", "hi");
        let mut answer = message("2", "A", false, "Mon Jan 01 10:02:15 +0000 2024", "hello");
        answer.parent_id = Some("1".to_string());

        let threads = crate::thread::reconstruct(&[question, answer]);
        assert_eq!(threads.len(), 1);

        let call = build(&threads[0]).unwrap().unwrap();

        assert_eq!(call.call_id, "2");
        assert_eq!(call.agent_id, "A");
        assert_eq!(call.customer_id, "C");
        assert_eq!(call.duration_seconds, 135);
    }

    #[test]
    fn unparseable_timestamp_fails_the_thread() {
        let thread = Thread {
            messages: vec![
                message("1", "C", true, "yesterday", "hi"),
                message("2", "A", false, "Mon Jan 01 10:00:00 +0000 2024", "hello"),
            ],
        };

        let err = build(&thread).unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Ingest(IngestErrorKind::Timestamp(_)))
        ));
    }
}
