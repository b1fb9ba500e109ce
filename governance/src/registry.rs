//! Shareholder registry: identity → voting weight.
//!
//! Accounts are never deleted. Deactivation is a soft removal that keeps
//! every vote already cast, and re-registering reactivates the account.

use crate::caller::Caller;
use crate::engine::VotingEngine;
use crate::error::VotingError;
use ballot_store::{LedgerStore, ShareholderAccount, WriteBatch};
use ballot_types::{Timestamp, VoterId};
use tracing::{debug, info};

impl<S: LedgerStore> VotingEngine<S> {
    /// Register a shareholder, or update the shares of an existing one.
    ///
    /// Votes already cast keep the weight they were cast with.
    pub fn register_shareholder(
        &self,
        caller: &Caller,
        id: &VoterId,
        shares: u64,
        now: Timestamp,
    ) -> Result<ShareholderAccount, VotingError> {
        let _writer = self.write_guard()?;
        self.register_locked(caller, id, shares, now)
            .inspect_err(|e| debug!(shareholder = %id, error = e.kind(), "registration rejected"))
    }

    fn register_locked(
        &self,
        caller: &Caller,
        id: &VoterId,
        shares: u64,
        now: Timestamp,
    ) -> Result<ShareholderAccount, VotingError> {
        require_admin(caller, "manage shareholders")?;
        if shares == 0 {
            return Err(VotingError::InvalidAmount);
        }
        let account = match self.store().get_shareholder(id)? {
            Some(existing) => ShareholderAccount {
                shares,
                active: true,
                updated_at: now,
                ..existing
            },
            None => ShareholderAccount {
                id: id.clone(),
                shares,
                active: true,
                registered_at: now,
                updated_at: now,
            },
        };
        let mut batch = WriteBatch::new();
        batch.put_shareholder(account.clone());
        self.store().commit(batch)?;
        info!(shareholder = %id, shares, "shareholder registered");
        Ok(account)
    }

    /// Mark a shareholder inactive. Their recorded votes stay in the tally.
    pub fn deactivate_shareholder(
        &self,
        caller: &Caller,
        id: &VoterId,
        now: Timestamp,
    ) -> Result<ShareholderAccount, VotingError> {
        let _writer = self.write_guard()?;
        require_admin(caller, "manage shareholders")?;
        let existing = self
            .store()
            .get_shareholder(id)?
            .ok_or_else(|| VotingError::NotFound(format!("shareholder {id}")))?;
        let account = ShareholderAccount {
            active: false,
            updated_at: now,
            ..existing
        };
        let mut batch = WriteBatch::new();
        batch.put_shareholder(account.clone());
        self.store().commit(batch)?;
        info!(shareholder = %id, "shareholder deactivated");
        Ok(account)
    }

    pub fn get_shareholder(&self, id: &VoterId) -> Result<Option<ShareholderAccount>, VotingError> {
        Ok(self.store().get_shareholder(id)?)
    }

    /// All accounts, active or not.
    pub fn list_shareholders(&self) -> Result<Vec<ShareholderAccount>, VotingError> {
        Ok(self.store().iter_shareholders()?)
    }

    /// Sum of shares over accounts that may currently vote.
    pub fn total_active_shares(&self) -> Result<u64, VotingError> {
        self.store()
            .iter_shareholders()?
            .iter()
            .filter(|a| a.can_vote())
            .try_fold(0u64, |acc, a| acc.checked_add(a.shares))
            .ok_or(VotingError::Overflow)
    }
}

pub(crate) fn require_admin(caller: &Caller, action: &str) -> Result<(), VotingError> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(VotingError::NotAuthorized(format!(
            "{} may not {action}",
            caller.id
        )))
    }
}
