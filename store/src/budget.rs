//! Quadratic-variant token budgets.

use crate::StoreError;
use ballot_types::{Choice, ProposalId, VoterId};
use serde::{Deserialize, Serialize};

/// A voter's token budget on one quadratic proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBudget {
    pub proposal: ProposalId,
    pub voter: VoterId,
    /// Fixed when the budget is initialised.
    pub total_tokens: u64,
    /// Always `votes_cast²`.
    pub tokens_spent: u64,
    pub votes_cast: u64,
    /// Set by the first successful vote, then immutable.
    pub direction: Option<Choice>,
}

impl TokenBudget {
    pub fn new(proposal: ProposalId, voter: VoterId, total_tokens: u64) -> Self {
        Self {
            proposal,
            voter,
            total_tokens,
            tokens_spent: 0,
            votes_cast: 0,
            direction: None,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.total_tokens.saturating_sub(self.tokens_spent)
    }

    pub fn has_voted(&self) -> bool {
        self.votes_cast > 0
    }
}

pub trait BudgetStore {
    fn get_budget(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<Option<TokenBudget>, StoreError>;

    fn get_budgets(&self, proposal: ProposalId) -> Result<Vec<TokenBudget>, StoreError>;
}
