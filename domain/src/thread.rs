//! Groups an unordered message table into ordered conversation threads.

use crate::message::RawMessage;
use log::*;
use std::collections::HashMap;

/// Messages of one conversation, oldest first. Every message after the first
/// replies to the one before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Thread {
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Visited,
}

/// Reconstructs threads from `messages`, scanning in input order.
///
/// A thread ends at an agent reply (an outbound message that answers
/// something). From there the walk follows parent links back until a message
/// has no parent, its parent is not in the table, or its parent already
/// belongs to an earlier thread. No message ever lands in two threads.
pub fn reconstruct(messages: &[RawMessage]) -> Vec<Thread> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(messages.len());
    for (position, message) in messages.iter().enumerate() {
        index.entry(message.message_id.as_str()).or_insert(position);
    }

    let mut state = vec![NodeState::Unseen; messages.len()];
    let mut threads = Vec::new();

    for (position, message) in messages.iter().enumerate() {
        if state[position] == NodeState::Visited
            || !message.is_outbound()
            || message.parent_id.is_none()
        {
            continue;
        }

        let mut walk = Vec::new();
        let mut cursor = Some(position);
        while let Some(current) = cursor {
            if state[current] == NodeState::Visited {
                break;
            }
            state[current] = NodeState::Visited;
            walk.push(current);

            cursor = messages[current]
                .parent_id
                .as_deref()
                .and_then(|parent_id| index.get(parent_id).copied());
        }

        walk.reverse();
        threads.push(Thread {
            messages: walk.into_iter().map(|i| messages[i].clone()).collect(),
        });
    }

    debug!(
        "Reconstructed {} threads from {} messages",
        threads.len(),
        messages.len()
    );
    threads
}
