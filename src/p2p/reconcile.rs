//! Decide what to do with a chain response from a peer.
//!
//! This is epidemic reconciliation, not a quorum protocol: two nodes that
//! keep gossiping converge on the longer valid chain either has seen.

use crate::blockchain::Block;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    Empty,
    NotAhead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Nothing to do; local state is at least as far along.
    Ignore(IgnoreReason),
    /// The remote head links directly onto ours.
    Append(Block),
    /// A lone block we cannot place: ask everyone for full history.
    QueryAll,
    /// A longer history that does not extend ours: fork choice by length.
    Replace(Vec<Block>),
}

pub fn reconcile(local_head: &Block, received: Vec<Block>) -> Reconciliation {
    let Some(remote_head) = received.last() else {
        return Reconciliation::Ignore(IgnoreReason::Empty);
    };
    if remote_head.index <= local_head.index {
        return Reconciliation::Ignore(IgnoreReason::NotAhead);
    }
    if remote_head.previous_hash == local_head.hash {
        return Reconciliation::Append(remote_head.clone());
    }
    if received.len() == 1 {
        return Reconciliation::QueryAll;
    }
    Reconciliation::Replace(received)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: u64, hash: &str, previous_hash: &str) -> Block {
        Block {
            index,
            hash: hash.into(),
            previous_hash: previous_hash.into(),
            timestamp: 0,
            data: String::new(),
            difficulty: 0,
            nonce: 0,
        }
    }

    #[test]
    fn empty_response_is_ignored() {
        assert_eq!(
            reconcile(&Block::genesis(), vec![]),
            Reconciliation::Ignore(IgnoreReason::Empty)
        );
    }

    #[test]
    fn behind_or_equal_is_ignored() {
        let local = block(3, "h3", "h2");
        for index in [1, 3] {
            assert_eq!(
                reconcile(&local, vec![block(index, "x", "y")]),
                Reconciliation::Ignore(IgnoreReason::NotAhead)
            );
        }
    }

    #[test]
    fn linking_head_is_appended() {
        let local = block(3, "h3", "h2");
        let remote = block(4, "h4", "h3");
        assert_eq!(
            reconcile(&local, vec![block(3, "h3", "h2"), remote.clone()]),
            Reconciliation::Append(remote)
        );
    }

    #[test]
    fn lone_unlinked_block_asks_for_history() {
        let local = block(3, "h3", "h2");
        assert_eq!(
            reconcile(&local, vec![block(5, "h5", "h4")]),
            Reconciliation::QueryAll
        );
    }

    #[test]
    fn longer_unlinked_history_is_a_replace_candidate() {
        let local = block(1, "a1", "");
        let remote = vec![Block::genesis(), block(1, "b1", ""), block(2, "b2", "b1")];
        assert_eq!(
            reconcile(&local, remote.clone()),
            Reconciliation::Replace(remote)
        );
    }
}
