//! Shareholder voting ledger and outcome engine.
//!
//! Proposal lifecycle: Upcoming → Active → Ended, driven purely by the
//! caller-supplied `now` against the proposal's `[start_time, end_time)`
//! window.
//!
//! Two tally variants:
//! - SIMPLE: one vote per shareholder, weighted by shares held at cast time
//! - QUADRATIC: per-proposal token budgets, the k-th vote costs `2k − 1`
//!   tokens so `n` votes cost `n²` in total
//!
//! Closed proposals with an exact tie stay pending until an admin records a
//! one-time resolution.

pub mod caller;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod outcome;
pub mod quadratic;
pub mod registry;
pub mod tally;
pub mod tie;

pub use caller::Caller;
pub use config::EngineConfig;
pub use engine::VotingEngine;
pub use error::VotingError;
pub use lifecycle::{proposal_status, window_status, NewProposal, ProposalStatus, ProposalSummary};
pub use outcome::{FinalResult, FinalStatus, TallyResult, BPS_DENOMINATOR};
pub use quadratic::{
    calculate_cost, max_affordable_votes, QuadraticReceipt, QuadraticRequest, QuadraticTally,
    VoterStatus,
};
pub use tally::{Ballot, Tally, WeightedTally};
