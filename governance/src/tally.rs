//! Tally abstraction shared by the weighted and quadratic variants.
//!
//! Both variants feed the same per-proposal yes/no totals and share the
//! lifecycle and tie-resolution code. A [`Tally`] only decides how much
//! voting power a request carries and which per-voter records it writes;
//! the engine performs the common checks and commits everything in one
//! batch.
//!
//! Common checks, in order (first failure wins):
//! 1. the proposal exists (`NotFound`) and uses this variant (`WrongVariant`)
//! 2. the voter is an active shareholder (`NotAuthorized`)
//! 3. the proposal is active at `now` (`VotingClosed`)
//!
//! followed by the variant's own checks in [`Tally::prepare`].

use crate::engine::VotingEngine;
use crate::error::VotingError;
use crate::lifecycle::{proposal_status, ProposalStatus};
use ballot_store::{LedgerStore, ProposalRecord, ShareholderAccount, VoteRecord, WriteBatch};
use ballot_types::{Choice, ProposalId, TallyVariant, Timestamp, VoterId};
use tracing::{debug, info};

/// The planned effect of one accepted vote request.
pub struct Ballot<R> {
    /// Side whose total grows.
    pub choice: Choice,
    /// Amount added to that side's total.
    pub power: u64,
    /// Per-voter records to write alongside the updated proposal.
    pub batch: WriteBatch,
    /// What the caller gets back on success.
    pub receipt: R,
}

/// Per-variant vote mechanics.
pub trait Tally {
    /// The proposal variant this tally applies to.
    const VARIANT: TallyVariant;

    type Request;
    type Receipt;

    /// Validate a request against the voter's existing records and plan its
    /// writes. Must not mutate the store.
    fn prepare<S: LedgerStore + ?Sized>(
        store: &S,
        proposal: &ProposalRecord,
        voter: &ShareholderAccount,
        request: &Self::Request,
        now: Timestamp,
    ) -> Result<Ballot<Self::Receipt>, VotingError>;
}

/// One vote per shareholder, weighted by shares at the moment of voting.
pub struct WeightedTally;

impl Tally for WeightedTally {
    const VARIANT: TallyVariant = TallyVariant::Simple;

    type Request = Choice;
    type Receipt = VoteRecord;

    fn prepare<S: LedgerStore + ?Sized>(
        store: &S,
        proposal: &ProposalRecord,
        voter: &ShareholderAccount,
        choice: &Choice,
        now: Timestamp,
    ) -> Result<Ballot<VoteRecord>, VotingError> {
        if store.get_vote(proposal.id, &voter.id)?.is_some() {
            return Err(VotingError::AlreadyVoted(voter.id.to_string()));
        }
        let record = VoteRecord {
            proposal: proposal.id,
            voter: voter.id.clone(),
            choice: *choice,
            weight: voter.shares,
            cast_at: now,
        };
        let mut batch = WriteBatch::new();
        batch.put_vote(record.clone());
        Ok(Ballot {
            choice: *choice,
            power: voter.shares,
            batch,
            receipt: record,
        })
    }
}

impl<S: LedgerStore> VotingEngine<S> {
    /// Run a vote request through the common checks, the variant's own
    /// checks, and a single atomic commit.
    pub(crate) fn cast<T: Tally>(
        &self,
        proposal_id: ProposalId,
        voter: &VoterId,
        request: &T::Request,
        now: Timestamp,
    ) -> Result<(Choice, T::Receipt), VotingError> {
        let _writer = self.write_guard()?;

        let proposal = self.require_variant(proposal_id, T::VARIANT)?;
        let account = self.require_voter(voter)?;
        let status = proposal_status(&proposal, now);
        if status != ProposalStatus::Active {
            return Err(VotingError::VotingClosed(status));
        }

        let Ballot {
            choice,
            power,
            mut batch,
            receipt,
        } = T::prepare(self.store(), &proposal, &account, request, now)?;
        let updated = proposal
            .checked_add_power(choice, power)
            .ok_or(VotingError::Overflow)?;
        batch.put_proposal(updated);
        self.store().commit(batch)?;
        Ok((choice, receipt))
    }

    /// Cast a one-time weighted vote on a simple proposal.
    ///
    /// The stored weight is the voter's shares now; later share changes do
    /// not touch it.
    pub fn cast_vote(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
        choice: Choice,
        now: Timestamp,
    ) -> Result<VoteRecord, VotingError> {
        match self.cast::<WeightedTally>(proposal, voter, &choice, now) {
            Ok((_, record)) => {
                info!(
                    proposal = %proposal,
                    voter = %voter,
                    %choice,
                    weight = record.weight,
                    "vote cast"
                );
                Ok(record)
            }
            Err(e) => {
                debug!(proposal = %proposal, voter = %voter, error = e.kind(), "vote rejected");
                Err(e)
            }
        }
    }

    /// A voter's recorded vote on a simple proposal, if any.
    pub fn get_vote(
        &self,
        proposal: ProposalId,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, VotingError> {
        self.require_variant(proposal, TallyVariant::Simple)?;
        Ok(self.store().get_vote(proposal, voter)?)
    }

    /// Every vote recorded on a simple proposal.
    pub fn list_votes(&self, proposal: ProposalId) -> Result<Vec<VoteRecord>, VotingError> {
        self.require_variant(proposal, TallyVariant::Simple)?;
        Ok(self.store().get_votes(proposal)?)
    }

    /// Whether the voter has cast any vote on the proposal, for either variant.
    pub fn has_voted(&self, proposal: ProposalId, voter: &VoterId) -> Result<bool, VotingError> {
        let record = self.require_proposal(proposal)?;
        Ok(match record.variant {
            TallyVariant::Simple => self.store().get_vote(proposal, voter)?.is_some(),
            TallyVariant::Quadratic => self
                .store()
                .get_budget(proposal, voter)?
                .is_some_and(|b| b.has_voted()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::Caller;
    use crate::lifecycle::NewProposal;
    use ballot_nullables::{NullClock, NullLedger};

    struct Fixture {
        engine: VotingEngine<NullLedger>,
        clock: NullClock,
        proposal: ProposalId,
    }

    fn admin() -> Caller {
        Caller::admin("chair")
    }

    fn voter(name: &str) -> VoterId {
        VoterId::new(name)
    }

    /// Simple proposal open over [100, 200), clock at 150, with alice (50)
    /// and bob (30) registered.
    fn fixture() -> Fixture {
        let engine = VotingEngine::new(NullLedger::new());
        let clock = NullClock::new(0);
        for (name, shares) in [("alice", 50), ("bob", 30)] {
            engine
                .register_shareholder(&admin(), &voter(name), shares, clock.now())
                .unwrap();
        }
        let proposal = engine
            .create_proposal(
                &admin(),
                NewProposal::simple("Adopt bylaws", Timestamp::new(100), Timestamp::new(200)),
                clock.now(),
            )
            .unwrap();
        clock.set(150);
        Fixture {
            engine,
            clock,
            proposal,
        }
    }

    #[test]
    fn test_vote_adds_weight_to_chosen_side() {
        let f = fixture();
        f.engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap();
        f.engine
            .cast_vote(f.proposal, &voter("bob"), Choice::No, f.clock.now())
            .unwrap();
        let p = f.engine.get_proposal(f.proposal).unwrap();
        assert_eq!((p.yes_total, p.no_total), (50, 30));
    }

    #[test]
    fn test_second_vote_fails_and_totals_unchanged() {
        let f = fixture();
        f.engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap();
        let err = f
            .engine
            .cast_vote(f.proposal, &voter("alice"), Choice::No, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::AlreadyVoted(_)));
        let p = f.engine.get_proposal(f.proposal).unwrap();
        assert_eq!((p.yes_total, p.no_total), (50, 0));
        let record = f.engine.get_vote(f.proposal, &voter("alice")).unwrap().unwrap();
        assert_eq!(record.choice, Choice::Yes);
    }

    #[test]
    fn test_weight_is_snapshotted() {
        let f = fixture();
        f.engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap();
        f.engine
            .register_shareholder(&admin(), &voter("alice"), 500, f.clock.now())
            .unwrap();
        let record = f.engine.get_vote(f.proposal, &voter("alice")).unwrap().unwrap();
        assert_eq!(record.weight, 50);
        assert_eq!(f.engine.get_proposal(f.proposal).unwrap().yes_total, 50);
    }

    #[test]
    fn test_unregistered_voter_not_authorized() {
        let f = fixture();
        let err = f
            .engine
            .cast_vote(f.proposal, &voter("mallory"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::NotAuthorized(_)));
    }

    #[test]
    fn test_inactive_shareholder_not_authorized() {
        let f = fixture();
        f.engine
            .deactivate_shareholder(&admin(), &voter("bob"), f.clock.now())
            .unwrap();
        let err = f
            .engine
            .cast_vote(f.proposal, &voter("bob"), Choice::No, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::NotAuthorized(_)));
    }

    #[test]
    fn test_voting_outside_window_closed() {
        let f = fixture();
        f.clock.set(99);
        let early = f
            .engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(early, VotingError::VotingClosed(ProposalStatus::Upcoming)));

        f.clock.set(200);
        let late = f
            .engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(late, VotingError::VotingClosed(ProposalStatus::Ended)));
    }

    #[test]
    fn test_precondition_order() {
        let f = fixture();
        // Unknown proposal beats unknown voter.
        let err = f
            .engine
            .cast_vote(ProposalId::new(99), &voter("mallory"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::NotFound(_)));

        // Unknown voter beats closed window.
        f.clock.set(500);
        let err = f
            .engine
            .cast_vote(f.proposal, &voter("mallory"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::NotAuthorized(_)));

        // Closed window beats duplicate vote.
        f.clock.set(150);
        f.engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap();
        f.clock.set(500);
        let err = f
            .engine
            .cast_vote(f.proposal, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(err, VotingError::VotingClosed(_)));
    }

    #[test]
    fn test_simple_vote_on_quadratic_proposal_wrong_variant() {
        let f = fixture();
        let q = f
            .engine
            .create_proposal(
                &admin(),
                NewProposal::quadratic("Quadratic", Timestamp::new(100), Timestamp::new(200), 0),
                f.clock.now(),
            )
            .unwrap();
        let err = f
            .engine
            .cast_vote(q, &voter("alice"), Choice::Yes, f.clock.now())
            .unwrap_err();
        assert!(matches!(
            err,
            VotingError::WrongVariant {
                expected: TallyVariant::Simple,
                actual: TallyVariant::Quadratic
            }
        ));
    }

    #[test]
    fn test_has_voted() {
        let f = fixture();
        assert!(!f.engine.has_voted(f.proposal, &voter("alice")).unwrap());
        f.engine
            .cast_vote(f.proposal, &voter("alice"), Choice::No, f.clock.now())
            .unwrap();
        assert!(f.engine.has_voted(f.proposal, &voter("alice")).unwrap());
        assert!(!f.engine.has_voted(f.proposal, &voter("bob")).unwrap());

        let votes = f.engine.list_votes(f.proposal).unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].voter, voter("alice"));
    }
}
