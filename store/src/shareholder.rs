//! Shareholder registry records.

use crate::StoreError;
use ballot_types::{Timestamp, VoterId};
use serde::{Deserialize, Serialize};

/// A registered shareholder and their voting weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholderAccount {
    pub id: VoterId,
    /// Voting weight in the simple tally.
    pub shares: u64,
    /// Inactive accounts keep their vote history but may not vote.
    pub active: bool,
    pub registered_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShareholderAccount {
    /// Whether this account may cast votes.
    pub fn can_vote(&self) -> bool {
        self.active && self.shares > 0
    }
}

pub trait ShareholderStore {
    fn get_shareholder(&self, id: &VoterId) -> Result<Option<ShareholderAccount>, StoreError>;
    fn iter_shareholders(&self) -> Result<Vec<ShareholderAccount>, StoreError>;
}
