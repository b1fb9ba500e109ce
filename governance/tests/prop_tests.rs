use proptest::prelude::*;

use ballot_governance::{
    calculate_cost, max_affordable_votes, Caller, NewProposal, VotingEngine, VotingError,
};
use ballot_nullables::NullLedger;
use ballot_types::{Choice, ProposalId, ResolutionType, Timestamp, VoterId};

const NOW: Timestamp = Timestamp::new(50);

fn chair() -> Caller {
    Caller::admin("chair")
}

/// Quadratic proposal open over [0, 100) with one voter holding `tokens`.
fn quadratic_engine(tokens: u64) -> (VotingEngine<NullLedger>, ProposalId, VoterId) {
    let engine = VotingEngine::new(NullLedger::new());
    let voter = VoterId::new("voter");
    engine
        .register_shareholder(&chair(), &voter, 1, Timestamp::EPOCH)
        .unwrap();
    let id = engine
        .create_proposal(
            &chair(),
            NewProposal::quadratic("QV", Timestamp::new(0), Timestamp::new(100), 1),
            Timestamp::EPOCH,
        )
        .unwrap();
    engine.initialize_budget(id, &voter, tokens).unwrap();
    (engine, id, voter)
}

fn resolution_strategy() -> impl Strategy<Value = ResolutionType> {
    prop::sample::select(ResolutionType::ALL.to_vec())
}

proptest! {
    /// After any accepted sequence of casts, spent tokens equal votes squared.
    #[test]
    fn spent_is_square_of_votes_cast(
        tokens in 1u64..10_000,
        steps in prop::collection::vec(1u64..20, 1..12),
    ) {
        let (engine, id, voter) = quadratic_engine(tokens);
        for n in steps {
            let _ = engine.cast_quadratic_vote(id, &voter, Choice::No, n, NOW);
            let status = engine.get_voter_status(id, &voter).unwrap();
            prop_assert_eq!(status.tokens_spent, status.votes_cast * status.votes_cast);
            prop_assert!(status.tokens_spent <= status.total_tokens);
            prop_assert_eq!(status.tokens_remaining, status.total_tokens - status.tokens_spent);
        }
    }

    /// Buying a then b votes costs the same as buying a+b at once.
    #[test]
    fn incremental_cost_is_path_independent(
        c in 0u64..1_000_000,
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
    ) {
        let split = calculate_cost(c, a).unwrap() + calculate_cost(c + a, b).unwrap();
        prop_assert_eq!(split, calculate_cost(c, a + b).unwrap());
    }

    /// The closed-form maximum agrees with a linear search.
    #[test]
    fn max_affordable_matches_search(c in 0u64..500, r in 0u64..5_000) {
        let m = max_affordable_votes(c, r);
        prop_assert!(calculate_cost(c, m).unwrap() <= r);
        prop_assert!(calculate_cost(c, m + 1).unwrap() > r);
    }

    /// Spending exactly the advertised maximum succeeds and one more fails.
    #[test]
    fn advertised_maximum_is_exact(tokens in 1u64..5_000, first in 0u64..10) {
        let (engine, id, voter) = quadratic_engine(tokens);
        if first > 0 {
            let _ = engine.cast_quadratic_vote(id, &voter, Choice::Yes, first, NOW);
        }
        let m = engine.max_affordable_additional_votes(id, &voter).unwrap();
        if m > 0 {
            engine.cast_quadratic_vote(id, &voter, Choice::Yes, m, NOW).unwrap();
        }
        let err = engine.cast_quadratic_vote(id, &voter, Choice::Yes, 1, NOW).unwrap_err();
        let is_insufficient = matches!(err, VotingError::InsufficientTokens { .. });
        prop_assert!(is_insufficient);
    }

    /// A vote on the opposite side leaves the whole ledger untouched.
    #[test]
    fn direction_lock_changes_nothing(tokens in 1u64..1_000, n in 1u64..5, m in 1u64..5) {
        let (engine, id, voter) = quadratic_engine(tokens);
        if engine.cast_quadratic_vote(id, &voter, Choice::Yes, n, NOW).is_ok() {
            let before = engine.store().save_state().unwrap();
            let err = engine.cast_quadratic_vote(id, &voter, Choice::No, m, NOW).unwrap_err();
            let is_locked = matches!(err, VotingError::DirectionLocked { locked: Choice::Yes });
            prop_assert!(is_locked);
            prop_assert_eq!(before, engine.store().save_state().unwrap());
        }
    }

    /// A recorded weight never moves when shares change afterwards.
    #[test]
    fn simple_vote_weight_is_snapshot(shares in 1u64..1_000_000, later in 1u64..1_000_000) {
        let engine = VotingEngine::new(NullLedger::new());
        let voter = VoterId::new("holder");
        engine.register_shareholder(&chair(), &voter, shares, Timestamp::EPOCH).unwrap();
        let id = engine
            .create_proposal(
                &chair(),
                NewProposal::simple("Snapshot", Timestamp::new(0), Timestamp::new(100)),
                Timestamp::EPOCH,
            )
            .unwrap();
        engine.cast_vote(id, &voter, Choice::Yes, NOW).unwrap();
        engine.register_shareholder(&chair(), &voter, later, NOW).unwrap();

        prop_assert_eq!(engine.get_vote(id, &voter).unwrap().unwrap().weight, shares);
        prop_assert_eq!(engine.get_result(id, NOW).unwrap().yes_votes, shares);
    }

    /// Only the first resolution of a tie sticks.
    #[test]
    fn tie_resolves_once(
        first in resolution_strategy(),
        second in resolution_strategy(),
        after in 100u64..10_000,
    ) {
        let engine = VotingEngine::new(NullLedger::new());
        let id = engine
            .create_proposal(
                &chair(),
                NewProposal::simple("Empty", Timestamp::new(0), Timestamp::new(100)),
                Timestamp::EPOCH,
            )
            .unwrap();
        let now = Timestamp::new(after);
        engine.resolve_tie(id, &chair(), first.as_str(), now).unwrap();
        let err = engine.resolve_tie(id, &chair(), second.as_str(), now).unwrap_err();
        let kept_first = matches!(err, VotingError::AlreadyResolved(r) if r == first);
        prop_assert!(kept_first);
        prop_assert_eq!(engine.get_final_result(id, now).unwrap().resolution, Some(first));
    }

    /// Percentages always add up to exactly 100% once anything was cast.
    #[test]
    fn percentages_sum_to_whole(yes in 0u64..1_000_000, no in 0u64..1_000_000) {
        let engine = VotingEngine::new(NullLedger::new());
        let id = engine
            .create_proposal(
                &chair(),
                NewProposal::simple("Split", Timestamp::new(0), Timestamp::new(100)),
                Timestamp::EPOCH,
            )
            .unwrap();
        for (name, shares, choice) in [("y", yes, Choice::Yes), ("n", no, Choice::No)] {
            if shares > 0 {
                let voter = VoterId::new(name);
                engine.register_shareholder(&chair(), &voter, shares, Timestamp::EPOCH).unwrap();
                engine.cast_vote(id, &voter, choice, NOW).unwrap();
            }
        }
        let result = engine.get_result(id, NOW).unwrap();
        if yes + no == 0 {
            prop_assert_eq!((result.yes_bps, result.no_bps), (0, 0));
        } else {
            prop_assert_eq!(result.yes_bps + result.no_bps, 10_000);
        }
    }
}
