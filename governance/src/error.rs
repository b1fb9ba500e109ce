use crate::lifecycle::ProposalStatus;
use ballot_store::StoreError;
use ballot_types::{Choice, ResolutionType, TallyVariant, Timestamp};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("not authorized: {0}")]
    NotAuthorized(String),

    #[error("invalid voting window: start {start} must be before end {end}")]
    InvalidWindow { start: Timestamp, end: Timestamp },

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("token budget must be greater than zero")]
    InvalidBudget,

    #[error("unrecognised tie resolution type: {0:?}")]
    InvalidResolutionType(String),

    #[error("voting is not open (proposal is {0})")]
    VotingClosed(ProposalStatus),

    #[error("voting window has not closed yet (proposal is {0})")]
    VotingStillOpen(ProposalStatus),

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(String),

    #[error("token budget for {0} is already initialized")]
    AlreadyInitialized(String),

    #[error("tie already resolved as {0}")]
    AlreadyResolved(ResolutionType),

    #[error("vote direction is locked to {locked}")]
    DirectionLocked { locked: Choice },

    #[error("insufficient tokens: need {needed}, have {available}")]
    InsufficientTokens { needed: u64, available: u64 },

    #[error("proposal uses the {actual} tally, not {expected}")]
    WrongVariant {
        expected: TallyVariant,
        actual: TallyVariant,
    },

    #[error("no token budget initialized for {0}")]
    BudgetNotInitialized(String),

    #[error("result is not tied: yes {yes}, no {no}")]
    NotTied { yes: u64, no: u64 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl VotingError {
    /// Short stable name of the error kind, for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::NotAuthorized(_) => "not_authorized",
            Self::InvalidWindow { .. } => "invalid_window",
            Self::InvalidTitle(_) => "invalid_title",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidBudget => "invalid_budget",
            Self::InvalidResolutionType(_) => "invalid_resolution_type",
            Self::VotingClosed(_) => "voting_closed",
            Self::VotingStillOpen(_) => "voting_still_open",
            Self::AlreadyVoted(_) => "already_voted",
            Self::AlreadyInitialized(_) => "already_initialized",
            Self::AlreadyResolved(_) => "already_resolved",
            Self::DirectionLocked { .. } => "direction_locked",
            Self::InsufficientTokens { .. } => "insufficient_tokens",
            Self::WrongVariant { .. } => "wrong_variant",
            Self::BudgetNotInitialized(_) => "budget_not_initialized",
            Self::NotTied { .. } => "not_tied",
            Self::Overflow => "overflow",
            Self::Store(_) => "store",
            Self::Config(_) => "config",
        }
    }
}
