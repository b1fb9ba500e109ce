//! Simple-variant vote records.

use crate::StoreError;
use ballot_types::{Choice, ProposalId, Timestamp, VoterId};
use serde::{Deserialize, Serialize};

/// One shareholder's vote on a simple proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub proposal: ProposalId,
    pub voter: VoterId,
    pub choice: Choice,
    /// The voter's shares at the moment the vote was cast.
    pub weight: u64,
    pub cast_at: Timestamp,
}

pub trait VoteStore {
    fn get_vote(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, StoreError>;

    fn get_votes(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, StoreError>;
}
