//! Tie resolution protocol.
//!
//! A single-shot admin decision that breaks an exact tie once voting has
//! closed:
//!
//! ```text
//! UNRESOLVED ──resolve_tie──▶ RESOLVED   (terminal, no way back)
//! ```
//!
//! Only the aggregated yes/no totals are inspected, so the protocol is the
//! same for simple and quadratic proposals.

use crate::caller::Caller;
use crate::engine::VotingEngine;
use crate::error::VotingError;
use crate::lifecycle::{proposal_status, ProposalStatus};
use crate::registry::require_admin;
use ballot_store::{LedgerStore, TieResolution, WriteBatch};
use ballot_types::{ProposalId, ResolutionType, Timestamp};
use tracing::{debug, info};

impl<S: LedgerStore> VotingEngine<S> {
    /// Record the terminal resolution of a tied proposal.
    ///
    /// Preconditions, in order: the proposal exists (`NotFound`), the caller
    /// is an admin (`NotAuthorized`), the window has closed
    /// (`VotingStillOpen`), yes equals no (`NotTied`), `resolution` names a
    /// known type (`InvalidResolutionType`), and nothing was recorded yet
    /// (`AlreadyResolved`).
    pub fn resolve_tie(
        &self,
        proposal: ProposalId,
        caller: &Caller,
        resolution: &str,
        now: Timestamp,
    ) -> Result<TieResolution, VotingError> {
        let _writer = self.write_guard()?;
        match self.resolve_tie_locked(proposal, caller, resolution, now) {
            Ok(record) => {
                info!(
                    proposal = %proposal,
                    resolution = %record.resolution,
                    admin = %caller.id,
                    "tie resolved"
                );
                Ok(record)
            }
            Err(e) => {
                debug!(proposal = %proposal, caller = %caller.id, error = e.kind(), "tie resolution rejected");
                Err(e)
            }
        }
    }

    fn resolve_tie_locked(
        &self,
        proposal: ProposalId,
        caller: &Caller,
        resolution: &str,
        now: Timestamp,
    ) -> Result<TieResolution, VotingError> {
        let record = self.require_proposal(proposal)?;
        require_admin(caller, "resolve ties")?;
        let status = proposal_status(&record, now);
        if status != ProposalStatus::Ended {
            return Err(VotingError::VotingStillOpen(status));
        }
        if record.yes_total != record.no_total {
            return Err(VotingError::NotTied {
                yes: record.yes_total,
                no: record.no_total,
            });
        }
        let resolution: ResolutionType = resolution
            .parse()
            .map_err(|_| VotingError::InvalidResolutionType(resolution.to_string()))?;
        if let Some(existing) = self.store().get_resolution(proposal)? {
            return Err(VotingError::AlreadyResolved(existing.resolution));
        }

        let tie = TieResolution {
            proposal,
            resolution,
            resolved_by: caller.id.clone(),
            resolved_at: now,
        };
        let mut batch = WriteBatch::new();
        batch.put_resolution(tie.clone());
        self.store().commit(batch)?;
        Ok(tie)
    }

    /// The recorded resolution for a proposal, if any.
    pub fn get_tie_resolution(
        &self,
        proposal: ProposalId,
    ) -> Result<Option<TieResolution>, VotingError> {
        self.require_proposal(proposal)?;
        Ok(self.store().get_resolution(proposal)?)
    }
}
