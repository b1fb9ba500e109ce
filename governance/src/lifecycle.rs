//! Proposal lifecycle: creation and time-derived status.
//!
//! Status is never stored. It is a pure function of the proposal's window
//! and the `now` passed in by the caller:
//!
//! ```text
//! now < start_time              → Upcoming
//! start_time <= now < end_time  → Active
//! end_time <= now               → Ended
//! ```

use crate::caller::Caller;
use crate::engine::VotingEngine;
use crate::error::VotingError;
use crate::registry::require_admin;
use ballot_store::{LedgerStore, ProposalRecord, WriteBatch};
use ballot_types::{ProposalId, TallyVariant, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Lifecycle phase of a proposal at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Voting has not opened yet.
    Upcoming,
    /// Votes are accepted.
    Active,
    /// The window has closed; totals are final.
    Ended,
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upcoming => f.write_str("upcoming"),
            Self::Active => f.write_str("active"),
            Self::Ended => f.write_str("ended"),
        }
    }
}

/// Derive the status of a voting window at `now`.
pub fn window_status(start_time: Timestamp, end_time: Timestamp, now: Timestamp) -> ProposalStatus {
    if now < start_time {
        ProposalStatus::Upcoming
    } else if now < end_time {
        ProposalStatus::Active
    } else {
        ProposalStatus::Ended
    }
}

/// Derive the status of a stored proposal at `now`.
pub fn proposal_status(proposal: &ProposalRecord, now: Timestamp) -> ProposalStatus {
    window_status(proposal.start_time, proposal.end_time, now)
}

/// Parameters for a new proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub variant: TallyVariant,
    /// Quadratic only. Zero selects the configured default.
    #[serde(default)]
    pub base_tokens: u64,
}

impl NewProposal {
    pub fn simple(title: impl Into<String>, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            title: title.into(),
            start_time,
            end_time,
            variant: TallyVariant::Simple,
            base_tokens: 0,
        }
    }

    pub fn quadratic(
        title: impl Into<String>,
        start_time: Timestamp,
        end_time: Timestamp,
        base_tokens: u64,
    ) -> Self {
        Self {
            title: title.into(),
            start_time,
            end_time,
            variant: TallyVariant::Quadratic,
            base_tokens,
        }
    }
}

/// A proposal together with its status at query time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalSummary {
    pub proposal: ProposalRecord,
    pub status: ProposalStatus,
}

impl<S: LedgerStore> VotingEngine<S> {
    /// Create a proposal and assign it the next sequential id.
    ///
    /// A rejected request consumes no id.
    pub fn create_proposal(
        &self,
        caller: &Caller,
        request: NewProposal,
        now: Timestamp,
    ) -> Result<ProposalId, VotingError> {
        let _writer = self.write_guard()?;
        self.create_proposal_locked(caller, request, now)
            .inspect_err(|e| debug!(caller = %caller.id, error = e.kind(), "proposal rejected"))
    }

    fn create_proposal_locked(
        &self,
        caller: &Caller,
        request: NewProposal,
        now: Timestamp,
    ) -> Result<ProposalId, VotingError> {
        require_admin(caller, "create proposals")?;
        let title = request.title.trim();
        if title.is_empty() {
            return Err(VotingError::InvalidTitle("title is empty".to_string()));
        }
        if title.chars().count() > self.config().max_title_len {
            return Err(VotingError::InvalidTitle(format!(
                "title exceeds {} characters",
                self.config().max_title_len
            )));
        }
        if request.start_time >= request.end_time {
            return Err(VotingError::InvalidWindow {
                start: request.start_time,
                end: request.end_time,
            });
        }

        let id = ProposalId::new(self.store().proposal_count()?)
            .next()
            .ok_or(VotingError::Overflow)?;
        let base_tokens = match request.variant {
            TallyVariant::Simple => 0,
            TallyVariant::Quadratic if request.base_tokens == 0 => self.config().default_base_tokens,
            TallyVariant::Quadratic => request.base_tokens,
        };
        let record = ProposalRecord {
            id,
            title: title.to_string(),
            start_time: request.start_time,
            end_time: request.end_time,
            variant: request.variant,
            base_tokens,
            yes_total: 0,
            no_total: 0,
            created_by: caller.id.clone(),
            created_at: now,
        };
        let status = proposal_status(&record, now);

        let mut batch = WriteBatch::new();
        batch.put_proposal(record);
        self.store().commit(batch)?;

        info!(
            proposal = %id,
            variant = %request.variant,
            %status,
            window_secs = request.start_time.secs_until(request.end_time),
            "proposal created"
        );
        Ok(id)
    }

    /// Look up a proposal.
    pub fn get_proposal(&self, id: ProposalId) -> Result<ProposalRecord, VotingError> {
        self.require_proposal(id)
    }

    /// Lifecycle status of a proposal at `now`.
    pub fn get_status(&self, id: ProposalId, now: Timestamp) -> Result<ProposalStatus, VotingError> {
        Ok(proposal_status(&self.require_proposal(id)?, now))
    }

    /// Every proposal with its status at `now`, in id order.
    pub fn list_proposals(&self, now: Timestamp) -> Result<Vec<ProposalSummary>, VotingError> {
        Ok(self
            .store()
            .iter_proposals()?
            .into_iter()
            .map(|proposal| {
                let status = proposal_status(&proposal, now);
                ProposalSummary { proposal, status }
            })
            .collect())
    }

    pub fn proposal_count(&self) -> Result<u64, VotingError> {
        Ok(self.store().proposal_count()?)
    }
}
