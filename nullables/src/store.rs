//! Nullable ledger: thread-safe in-memory storage for testing.

use ballot_store::{
    BudgetStore, LedgerStore, LedgerWrite, ProposalRecord, ProposalStore, ResolutionStore,
    ShareholderAccount, ShareholderStore, StoreError, TieResolution, TokenBudget, VoteRecord,
    VoteStore, WriteBatch,
};
use ballot_types::{ProposalId, VoterId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Serializable copy of every record held by a [`NullLedger`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub shareholders: BTreeMap<VoterId, ShareholderAccount>,
    pub proposals: BTreeMap<ProposalId, ProposalRecord>,
    pub votes: BTreeMap<(ProposalId, VoterId), VoteRecord>,
    pub budgets: BTreeMap<(ProposalId, VoterId), TokenBudget>,
    pub resolutions: BTreeMap<ProposalId, TieResolution>,
}

/// An in-memory ledger for testing.
///
/// All records sit behind one mutex, so every read sees a committed state and
/// every [`WriteBatch`] lands in a single critical section.
pub struct NullLedger {
    state: Mutex<LedgerSnapshot>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerSnapshot::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerSnapshot>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("ledger mutex poisoned".to_string()))
    }

    /// Serialize every record to bytes.
    pub fn save_state(&self) -> Result<Vec<u8>, StoreError> {
        let state = self.lock()?;
        bincode::serialize(&*state).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Rebuild a ledger from bytes produced by [`NullLedger::save_state`].
    pub fn load_state(data: &[u8]) -> Result<Self, StoreError> {
        let snapshot: LedgerSnapshot =
            bincode::deserialize(data).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            state: Mutex::new(snapshot),
        })
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareholderStore for NullLedger {
    fn get_shareholder(&self, id: &VoterId) -> Result<Option<ShareholderAccount>, StoreError> {
        Ok(self.lock()?.shareholders.get(id).cloned())
    }

    fn iter_shareholders(&self) -> Result<Vec<ShareholderAccount>, StoreError> {
        Ok(self.lock()?.shareholders.values().cloned().collect())
    }
}

impl ProposalStore for NullLedger {
    fn get_proposal(&self, id: ProposalId) -> Result<Option<ProposalRecord>, StoreError> {
        Ok(self.lock()?.proposals.get(&id).cloned())
    }

    fn iter_proposals(&self) -> Result<Vec<ProposalRecord>, StoreError> {
        Ok(self.lock()?.proposals.values().cloned().collect())
    }

    fn proposal_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.proposals.len() as u64)
    }
}

impl VoteStore for NullLedger {
    fn get_vote(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, StoreError> {
        Ok(self
            .lock()?
            .votes
            .get(&(proposal, voter.clone()))
            .cloned())
    }

    fn get_votes(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, StoreError> {
        Ok(self
            .lock()?
            .votes
            .values()
            .filter(|v| v.proposal == proposal)
            .cloned()
            .collect())
    }
}

impl BudgetStore for NullLedger {
    fn get_budget(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<Option<TokenBudget>, StoreError> {
        Ok(self
            .lock()?
            .budgets
            .get(&(proposal, voter.clone()))
            .cloned())
    }

    fn get_budgets(&self, proposal: ProposalId) -> Result<Vec<TokenBudget>, StoreError> {
        Ok(self
            .lock()?
            .budgets
            .values()
            .filter(|b| b.proposal == proposal)
            .cloned()
            .collect())
    }
}

impl ResolutionStore for NullLedger {
    fn get_resolution(&self, proposal: ProposalId) -> Result<Option<TieResolution>, StoreError> {
        Ok(self.lock()?.resolutions.get(&proposal).cloned())
    }
}

impl LedgerStore for NullLedger {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        // Validate insert-once keys before touching anything.
        for write in batch.writes() {
            match write {
                LedgerWrite::Vote(v) if state.votes.contains_key(&(v.proposal, v.voter.clone())) => {
                    return Err(StoreError::Duplicate(format!(
                        "vote {} by {}",
                        v.proposal, v.voter
                    )));
                }
                LedgerWrite::Resolution(r) if state.resolutions.contains_key(&r.proposal) => {
                    return Err(StoreError::Duplicate(format!("resolution {}", r.proposal)));
                }
                _ => {}
            }
        }

        for write in batch.into_writes() {
            match write {
                LedgerWrite::Shareholder(a) => {
                    state.shareholders.insert(a.id.clone(), a);
                }
                LedgerWrite::Proposal(p) => {
                    state.proposals.insert(p.id, p);
                }
                LedgerWrite::Vote(v) => {
                    state.votes.insert((v.proposal, v.voter.clone()), v);
                }
                LedgerWrite::Budget(b) => {
                    state.budgets.insert((b.proposal, b.voter.clone()), b);
                }
                LedgerWrite::Resolution(r) => {
                    state.resolutions.insert(r.proposal, r);
                }
            }
        }
        Ok(())
    }
}
