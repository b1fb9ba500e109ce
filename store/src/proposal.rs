//! Proposal records.

use crate::StoreError;
use ballot_types::{Choice, ProposalId, TallyVariant, Timestamp, VoterId};
use serde::{Deserialize, Serialize};

/// A stored proposal with its running yes/no totals.
///
/// Lifecycle status is not stored; it is derived from the window and the
/// caller-supplied time on every read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub title: String,
    /// Voting opens at this instant (inclusive).
    pub start_time: Timestamp,
    /// Voting closes at this instant (exclusive).
    pub end_time: Timestamp,
    pub variant: TallyVariant,
    /// Default per-voter token allotment for the quadratic variant.
    /// Zero for simple proposals.
    pub base_tokens: u64,
    /// Shares (simple) or vote counts (quadratic) cast for yes.
    pub yes_total: u64,
    /// Shares (simple) or vote counts (quadratic) cast for no.
    pub no_total: u64,
    pub created_by: VoterId,
    pub created_at: Timestamp,
}

impl ProposalRecord {
    /// Add voting power to one side, or `None` on overflow.
    pub fn checked_add_power(&self, choice: Choice, power: u64) -> Option<Self> {
        let mut updated = self.clone();
        match choice {
            Choice::Yes => updated.yes_total = self.yes_total.checked_add(power)?,
            Choice::No => updated.no_total = self.no_total.checked_add(power)?,
        }
        Some(updated)
    }
}

pub trait ProposalStore {
    fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, StoreError>;

    /// All proposals in id order.
    fn iter_proposals(&self) -> Result<Vec<ProposalRecord>, StoreError>;

    /// Number of proposals ever stored. Ids are dense, so the next id is
    /// `proposal_count() + 1`.
    fn proposal_count(&self) -> Result<u64, StoreError>;
}
