//! Quadratic cost engine.
//!
//! Each voter gets a per-proposal token budget. Holding `v` votes costs `v²`
//! tokens in total, so buying `n` more votes on top of `c` costs
//! `(c + n)² − c²`. Votes may be bought in several steps; the cumulative
//! spend always equals what a single purchase of the same count would cost:
//!
//! ```text
//! tokens_spent == votes_cast²     after every successful vote
//! tokens_spent <= total_tokens
//! ```
//!
//! The first successful vote fixes the voter's direction for the proposal.
//! The proposal totals count votes, not tokens.

use crate::engine::VotingEngine;
use crate::error::VotingError;
use crate::tally::{Ballot, Tally};
use ballot_store::{LedgerStore, ProposalRecord, ShareholderAccount, TokenBudget, WriteBatch};
use ballot_types::{Choice, ProposalId, TallyVariant, Timestamp, VoterId};
use serde::Serialize;
use tracing::{debug, info};

/// Token cost of buying `additional_votes` on top of `current_votes`.
///
/// Computed in 128-bit arithmetic; fails with `Overflow` rather than wrap
/// when the result does not fit in a `u64`.
pub fn calculate_cost(current_votes: u64, additional_votes: u64) -> Result<u64, VotingError> {
    let current = u128::from(current_votes);
    let total = current + u128::from(additional_votes);
    let cost = total
        .checked_mul(total)
        .ok_or(VotingError::Overflow)?
        - current * current;
    u64::try_from(cost).map_err(|_| VotingError::Overflow)
}

/// Largest `n` with `calculate_cost(current_votes, n) <= remaining_tokens`.
///
/// Closed form: `floor(sqrt(current² + remaining)) − current`.
pub fn max_affordable_votes(current_votes: u64, remaining_tokens: u64) -> u64 {
    let current = u128::from(current_votes);
    let ceiling = current * current + u128::from(remaining_tokens);
    let n = isqrt(ceiling) - current;
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Integer square root (floor) by Newton's method.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    // Start at a power of two no smaller than sqrt(n); iterates decrease monotonically.
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// A request to buy more votes in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadraticRequest {
    pub direction: Choice,
    pub additional_votes: u64,
}

/// Voter state after a successful quadratic vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuadraticReceipt {
    pub votes_cast: u64,
    pub tokens_spent: u64,
}

/// Read-only projection of a voter's budget on a quadratic proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoterStatus {
    pub has_voted: bool,
    pub direction: Option<Choice>,
    pub votes_cast: u64,
    pub tokens_spent: u64,
    pub tokens_remaining: u64,
    pub total_tokens: u64,
}

impl From<&TokenBudget> for VoterStatus {
    fn from(budget: &TokenBudget) -> Self {
        Self {
            has_voted: budget.has_voted(),
            direction: budget.direction,
            votes_cast: budget.votes_cast,
            tokens_spent: budget.tokens_spent,
            tokens_remaining: budget.remaining(),
            total_tokens: budget.total_tokens,
        }
    }
}

impl VoterStatus {
    fn empty() -> Self {
        Self {
            has_voted: false,
            direction: None,
            votes_cast: 0,
            tokens_spent: 0,
            tokens_remaining: 0,
            total_tokens: 0,
        }
    }
}

/// Vote counts bought from a token budget at quadratic cost.
pub struct QuadraticTally;

impl Tally for QuadraticTally {
    const VARIANT: TallyVariant = TallyVariant::Quadratic;

    type Request = QuadraticRequest;
    type Receipt = QuadraticReceipt;

    fn prepare<S: LedgerStore + ?Sized>(
        store: &S,
        proposal: &ProposalRecord,
        voter: &ShareholderAccount,
        request: &QuadraticRequest,
        _now: Timestamp,
    ) -> Result<Ballot<QuadraticReceipt>, VotingError> {
        let budget = store
            .get_budget(proposal.id, &voter.id)?
            .ok_or_else(|| VotingError::BudgetNotInitialized(voter.id.to_string()))?;
        if request.additional_votes == 0 {
            return Err(VotingError::InvalidAmount);
        }
        if let Some(locked) = budget.direction {
            if locked != request.direction {
                return Err(VotingError::DirectionLocked { locked });
            }
        }

        let cost = calculate_cost(budget.votes_cast, request.additional_votes)?;
        let tokens_spent = budget
            .tokens_spent
            .checked_add(cost)
            .ok_or(VotingError::Overflow)?;
        if tokens_spent > budget.total_tokens {
            return Err(VotingError::InsufficientTokens {
                needed: cost,
                available: budget.remaining(),
            });
        }
        let votes_cast = budget
            .votes_cast
            .checked_add(request.additional_votes)
            .ok_or(VotingError::Overflow)?;
        debug_assert_eq!(
            u128::from(tokens_spent),
            u128::from(votes_cast) * u128::from(votes_cast)
        );

        let updated = TokenBudget {
            tokens_spent,
            votes_cast,
            direction: Some(request.direction),
            ..budget
        };
        let mut batch = WriteBatch::new();
        batch.put_budget(updated);
        Ok(Ballot {
            choice: request.direction,
            power: request.additional_votes,
            batch,
            receipt: QuadraticReceipt {
                votes_cast,
                tokens_spent,
            },
        })
    }
}

impl<S: LedgerStore> VotingEngine<S> {
    /// Give a voter a token budget for a quadratic proposal. One-time.
    ///
    /// The amount comes from an external allotment policy; the engine only
    /// enforces it.
    pub fn initialize_budget(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        total_tokens: u64,
    ) -> Result<TokenBudget, VotingError> {
        let _writer = self.write_guard()?;
        self.initialize_budget_locked(proposal, voter, total_tokens)
            .inspect_err(|e| {
                debug!(proposal = %proposal, voter = %voter, error = e.kind(), "budget rejected")
            })
    }

    /// Give a voter the proposal's own `base_tokens` as budget.
    pub fn initialize_base_budget(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<TokenBudget, VotingError> {
        let base_tokens = self
            .require_variant(proposal, TallyVariant::Quadratic)?
            .base_tokens;
        self.initialize_budget(proposal, voter, base_tokens)
    }

    fn initialize_budget_locked(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        total_tokens: u64,
    ) -> Result<TokenBudget, VotingError> {
        self.require_variant(proposal, TallyVariant::Quadratic)?;
        if self.store().get_budget(proposal, voter)?.is_some() {
            return Err(VotingError::AlreadyInitialized(voter.to_string()));
        }
        if total_tokens == 0 {
            return Err(VotingError::InvalidBudget);
        }
        let budget = TokenBudget::new(proposal, voter.clone(), total_tokens);
        let mut batch = WriteBatch::new();
        batch.put_budget(budget.clone());
        self.store().commit(batch)?;
        info!(proposal = %proposal, voter = %voter, total_tokens, "budget initialized");
        Ok(budget)
    }

    /// Buy `additional_votes` more votes in `direction`, paying the
    /// quadratic cost from the voter's budget. All-or-nothing.
    pub fn cast_quadratic_vote(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        direction: Choice,
        additional_votes: u64,
        now: Timestamp,
    ) -> Result<QuadraticReceipt, VotingError> {
        let request = QuadraticRequest {
            direction,
            additional_votes,
        };
        match self.cast::<QuadraticTally>(proposal, voter, &request, now) {
            Ok((_, receipt)) => {
                info!(
                    proposal = %proposal,
                    voter = %voter,
                    %direction,
                    additional_votes,
                    votes_cast = receipt.votes_cast,
                    tokens_spent = receipt.tokens_spent,
                    "quadratic vote cast"
                );
                Ok(receipt)
            }
            Err(e) => {
                debug!(
                    proposal = %proposal,
                    voter = %voter,
                    additional_votes,
                    error = e.kind(),
                    "quadratic vote rejected"
                );
                Err(e)
            }
        }
    }

    fn require_budget(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<TokenBudget, VotingError> {
        self.require_variant(proposal, TallyVariant::Quadratic)?;
        self.store()
            .get_budget(proposal, voter)?
            .ok_or_else(|| VotingError::BudgetNotInitialized(voter.to_string()))
    }

    /// The most votes the voter can still afford on this proposal.
    pub fn max_affordable_additional_votes(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<u64, VotingError> {
        let budget = self.require_budget(proposal, voter)?;
        Ok(max_affordable_votes(budget.votes_cast, budget.remaining()))
    }

    /// Cost of buying `additional_votes` more from the voter's current count.
    /// Pure preview; affordability is not checked.
    pub fn preview_cost(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        additional_votes: u64,
    ) -> Result<u64, VotingError> {
        self.require_variant(proposal, TallyVariant::Quadratic)?;
        let current = self
            .store()
            .get_budget(proposal, voter)?
            .map_or(0, |b| b.votes_cast);
        calculate_cost(current, additional_votes)
    }

    /// Every budget allotted on a quadratic proposal.
    pub fn list_budgets(&self, proposal: ProposalId) -> Result<Vec<TokenBudget>, VotingError> {
        self.require_variant(proposal, TallyVariant::Quadratic)?;
        Ok(self.store().get_budgets(proposal)?)
    }

    /// The voter's budget position. A voter without a budget reads as all
    /// zeros.
    pub fn get_voter_status(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<VoterStatus, VotingError> {
        self.require_variant(proposal, TallyVariant::Quadratic)?;
        Ok(self
            .store()
            .get_budget(proposal, voter)?
            .as_ref()
            .map_or_else(VoterStatus::empty, VoterStatus::from))
    }
}
