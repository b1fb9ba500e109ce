//! Write batching: groups the records touched by one engine operation so a
//! backend can apply them in a single atomic step.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.put_vote(vote);
//! batch.put_proposal(updated_proposal);
//! store.commit(batch)?;
//! ```
//!
//! A batch that is dropped without being committed has no effect.

use crate::{ProposalRecord, ShareholderAccount, TieResolution, TokenBudget, VoteRecord};

/// A single staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerWrite {
    /// Insert or replace a shareholder account.
    Shareholder(ShareholderAccount),
    /// Insert or replace a proposal (including its running totals).
    Proposal(ProposalRecord),
    /// Insert a vote. Never replaces an existing one.
    Vote(VoteRecord),
    /// Insert or replace a token budget.
    Budget(TokenBudget),
    /// Insert a tie resolution. Never replaces an existing one.
    Resolution(TieResolution),
}

/// An ordered list of writes applied all-or-nothing by
/// [`LedgerStore::commit`](crate::LedgerStore::commit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<LedgerWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_shareholder(&mut self, account: ShareholderAccount) {
        self.writes.push(LedgerWrite::Shareholder(account));
    }

    pub fn put_proposal(&mut self, proposal: ProposalRecord) {
        self.writes.push(LedgerWrite::Proposal(proposal));
    }

    pub fn put_vote(&mut self, vote: VoteRecord) {
        self.writes.push(LedgerWrite::Vote(vote));
    }

    pub fn put_budget(&mut self, budget: TokenBudget) {
        self.writes.push(LedgerWrite::Budget(budget));
    }

    pub fn put_resolution(&mut self, resolution: TieResolution) {
        self.writes.push(LedgerWrite::Resolution(resolution));
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[LedgerWrite] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<LedgerWrite> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::{Choice, ProposalId, Timestamp, VoterId};

    #[test]
    fn test_batch_preserves_write_order() {
        let mut batch = WriteBatch::new();
        assert!(batch.is_empty());
        let voter = VoterId::new("alice");
        batch.put_budget(TokenBudget::new(ProposalId::FIRST, voter.clone(), 10));
        batch.put_vote(VoteRecord {
            proposal: ProposalId::FIRST,
            voter,
            choice: Choice::Yes,
            weight: 3,
            cast_at: Timestamp::new(5),
        });
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch.writes()[0], LedgerWrite::Budget(_)));
        assert!(matches!(batch.writes()[1], LedgerWrite::Vote(_)));
    }
}
