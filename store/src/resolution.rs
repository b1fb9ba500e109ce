//! Tie resolutions.

use crate::StoreError;
use ballot_types::{ProposalId, ResolutionType, Timestamp, VoterId};
use serde::{Deserialize, Serialize};

/// The terminal decision recorded for a tied proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieResolution {
    pub proposal: ProposalId,
    pub resolution: ResolutionType,
    pub resolved_by: VoterId,
    pub resolved_at: Timestamp,
}

pub trait ResolutionStore {
    fn get_resolution(&self, proposal: ProposalId) -> Result<Option<TieResolution>, StoreError>;
}
