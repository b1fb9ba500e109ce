//! Outcome queries: percentages, tie detection and the final verdict.
//!
//! Final-status derivation, in priority order:
//! 1. `now < start_time`                    → `NotStarted`
//! 2. `now < end_time`                      → `VotingActive`
//! 3. ended, tied, no resolution            → `TiePending`
//! 4. ended, tied, resolved                 → `Approved` for `CHAIRPERSON_YES`, else `Rejected`
//! 5. ended, not tied                       → `Approved` if yes > no, else `Rejected`

use crate::engine::VotingEngine;
use crate::error::VotingError;
use crate::lifecycle::{proposal_status, ProposalStatus};
use ballot_store::{LedgerStore, ProposalRecord};
use ballot_types::{ProposalId, ResolutionType, TallyVariant, Timestamp};
use serde::Serialize;

/// Percentages are carried in basis points (1/100 of a percent).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Running totals and percentages for a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TallyResult {
    pub proposal: ProposalId,
    pub variant: TallyVariant,
    pub status: ProposalStatus,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_votes: u64,
    /// Zero when no votes were cast.
    pub yes_bps: u32,
    /// `BPS_DENOMINATOR - yes_bps` when votes were cast, so the two always
    /// sum to exactly 100%.
    pub no_bps: u32,
    /// Only ever true once the window has closed.
    pub is_tied: bool,
}

impl TallyResult {
    pub fn yes_pct(&self) -> f64 {
        f64::from(self.yes_bps) / 100.0
    }

    pub fn no_pct(&self) -> f64 {
        f64::from(self.no_bps) / 100.0
    }
}

/// Verdict reported to the outside world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    NotStarted,
    VotingActive,
    Approved,
    Rejected,
    TiePending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinalResult {
    pub proposal: ProposalId,
    pub status: FinalStatus,
    pub yes_total: u64,
    pub no_total: u64,
    pub resolution: Option<ResolutionType>,
}

/// Split `yes` and `no` into basis points. Both are zero when nothing was cast.
pub fn split_bps(yes: u64, no: u64) -> Result<(u32, u32), VotingError> {
    let total = yes.checked_add(no).ok_or(VotingError::Overflow)?;
    if total == 0 {
        return Ok((0, 0));
    }
    let yes_bps = u128::from(yes) * u128::from(BPS_DENOMINATOR) / u128::from(total);
    // yes <= total, so the quotient is at most BPS_DENOMINATOR.
    let yes_bps = u32::try_from(yes_bps).map_err(|_| VotingError::Overflow)?;
    Ok((yes_bps, BPS_DENOMINATOR - yes_bps))
}

/// Derive the final verdict for a proposal at `now`.
pub fn final_status(
    proposal: &ProposalRecord,
    resolution: Option<ResolutionType>,
    now: Timestamp,
) -> FinalStatus {
    match proposal_status(proposal, now) {
        ProposalStatus::Upcoming => FinalStatus::NotStarted,
        ProposalStatus::Active => FinalStatus::VotingActive,
        ProposalStatus::Ended if proposal.yes_total == proposal.no_total => match resolution {
            None => FinalStatus::TiePending,
            Some(r) if r.approves() => FinalStatus::Approved,
            Some(_) => FinalStatus::Rejected,
        },
        ProposalStatus::Ended if proposal.yes_total > proposal.no_total => FinalStatus::Approved,
        ProposalStatus::Ended => FinalStatus::Rejected,
    }
}

impl<S: LedgerStore> VotingEngine<S> {
    /// Totals and percentages at `now`, for either variant.
    pub fn get_result(&self, id: ProposalId, now: Timestamp) -> Result<TallyResult, VotingError> {
        let proposal = self.require_proposal(id)?;
        let status = proposal_status(&proposal, now);
        let (yes_bps, no_bps) = split_bps(proposal.yes_total, proposal.no_total)?;
        Ok(TallyResult {
            proposal: id,
            variant: proposal.variant,
            status,
            yes_votes: proposal.yes_total,
            no_votes: proposal.no_total,
            total_votes: proposal.yes_total + proposal.no_total,
            yes_bps,
            no_bps,
            is_tied: status == ProposalStatus::Ended && proposal.yes_total == proposal.no_total,
        })
    }

    /// The verdict at `now`, taking any tie resolution into account.
    pub fn get_final_result(
        &self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<FinalResult, VotingError> {
        let proposal = self.require_proposal(id)?;
        let resolution = self.store().get_resolution(id)?.map(|r| r.resolution);
        Ok(FinalResult {
            proposal: id,
            status: final_status(&proposal, resolution, now),
            yes_total: proposal.yes_total,
            no_total: proposal.no_total,
            resolution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::VoterId;

    fn proposal(yes: u64, no: u64) -> ProposalRecord {
        ProposalRecord {
            id: ProposalId::new(1),
            title: "Dividend".to_string(),
            start_time: Timestamp::new(100),
            end_time: Timestamp::new(200),
            variant: TallyVariant::Simple,
            base_tokens: 0,
            yes_total: yes,
            no_total: no,
            created_by: VoterId::new("chair"),
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn test_split_bps_sums_to_whole() {
        assert_eq!(split_bps(0, 0).unwrap(), (0, 0));
        assert_eq!(split_bps(1, 1).unwrap(), (5_000, 5_000));
        assert_eq!(split_bps(1, 2).unwrap(), (3_333, 6_667));
        assert_eq!(split_bps(7, 0).unwrap(), (10_000, 0));
        assert_eq!(split_bps(0, 7).unwrap(), (0, 10_000));
        assert!(matches!(split_bps(u64::MAX, 1), Err(VotingError::Overflow)));
    }

    #[test]
    fn test_final_status_before_and_during() {
        let p = proposal(50, 50);
        assert_eq!(final_status(&p, None, Timestamp::new(99)), FinalStatus::NotStarted);
        // Equal totals mid-window are not a tie verdict.
        assert_eq!(final_status(&p, None, Timestamp::new(150)), FinalStatus::VotingActive);
    }

    #[test]
    fn test_final_status_after_close() {
        let end = Timestamp::new(200);
        assert_eq!(final_status(&proposal(60, 40), None, end), FinalStatus::Approved);
        assert_eq!(final_status(&proposal(40, 60), None, end), FinalStatus::Rejected);
        assert_eq!(final_status(&proposal(50, 50), None, end), FinalStatus::TiePending);
        assert_eq!(final_status(&proposal(0, 0), None, end), FinalStatus::TiePending);
    }

    #[test]
    fn test_final_status_resolved_tie() {
        let end = Timestamp::new(200);
        let tied = proposal(50, 50);
        assert_eq!(
            final_status(&tied, Some(ResolutionType::ChairpersonYes), end),
            FinalStatus::Approved
        );
        assert_eq!(
            final_status(&tied, Some(ResolutionType::ChairpersonNo), end),
            FinalStatus::Rejected
        );
        assert_eq!(
            final_status(&tied, Some(ResolutionType::StatusQuoReject), end),
            FinalStatus::Rejected
        );
    }

    #[test]
    fn test_final_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&FinalStatus::TiePending).unwrap();
        assert_eq!(json, "\"TIE_PENDING\"");
    }

    #[test]
    fn test_percent_accessors() {
        let result = TallyResult {
            proposal: ProposalId::new(1),
            variant: TallyVariant::Simple,
            status: ProposalStatus::Ended,
            yes_votes: 3,
            no_votes: 1,
            total_votes: 4,
            yes_bps: 7_500,
            no_bps: 2_500,
            is_tied: false,
        };
        assert_eq!(result.yes_pct(), 75.0);
        assert_eq!(result.no_pct(), 25.0);
    }
}
