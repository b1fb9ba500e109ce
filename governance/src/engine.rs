//! Core voting engine. Owns the ledger handle and the single-writer lock.
//!
//! The operations themselves are grouped by concern in sibling modules
//! (`lifecycle`, `registry`, `tally`, `quadratic`, `outcome`, `tie`), each
//! adding an `impl` block to [`VotingEngine`].

use crate::config::EngineConfig;
use crate::error::VotingError;
use ballot_store::{LedgerStore, ProposalRecord, ShareholderAccount, StoreError};
use ballot_types::{ProposalId, TallyVariant, VoterId};
use std::sync::{Mutex, MutexGuard};

/// The voting ledger and outcome engine.
///
/// Every mutating operation takes the writer lock for its whole
/// check-then-commit sequence, so two votes by the same voter can never both
/// pass the duplicate check. Queries read the store directly and may run
/// concurrently with each other and with a writer.
pub struct VotingEngine<S: LedgerStore> {
    store: S,
    config: EngineConfig,
    writer: Mutex<()>,
}

impl<S: LedgerStore> VotingEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
            writer: Mutex::new(()),
        }
    }

    /// Build an engine with an explicit config, rejecting the same values
    /// that a TOML load would.
    pub fn with_config(store: S, config: EngineConfig) -> Result<Self, VotingError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            writer: Mutex::new(()),
        })
    }

    /// The underlying ledger.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn write_guard(&self) -> Result<MutexGuard<'_, ()>, VotingError> {
        self.writer
            .lock()
            .map_err(|_| VotingError::Store(StoreError::Backend("writer lock poisoned".to_string())))
    }

    pub(crate) fn require_proposal(&self, id: ProposalId) -> Result<ProposalRecord, VotingError> {
        self.store
            .get_proposal(id)?
            .ok_or_else(|| VotingError::NotFound(format!("proposal {id}")))
    }

    /// Load a proposal and check that it uses the given tally variant.
    pub(crate) fn require_variant(
        &self,
        id: ProposalId,
        expected: TallyVariant,
    ) -> Result<ProposalRecord, VotingError> {
        let proposal = self.require_proposal(id)?;
        if proposal.variant != expected {
            return Err(VotingError::WrongVariant {
                expected,
                actual: proposal.variant,
            });
        }
        Ok(proposal)
    }

    /// Load a shareholder that is currently allowed to vote.
    pub(crate) fn require_voter(&self, id: &VoterId) -> Result<ShareholderAccount, VotingError> {
        match self.store.get_shareholder(id)? {
            Some(account) if account.can_vote() => Ok(account),
            Some(_) => Err(VotingError::NotAuthorized(format!(
                "{id} is not an active shareholder"
            ))),
            None => Err(VotingError::NotAuthorized(format!(
                "{id} is not a registered shareholder"
            ))),
        }
    }
}
