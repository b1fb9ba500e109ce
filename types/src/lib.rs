//! Fundamental types for the shareholder voting ledger.
//!
//! This crate defines the small value types shared by every other crate in
//! the workspace: voter identities, proposal ids, timestamps, vote choices,
//! tally variants and tie-resolution kinds.

pub mod choice;
pub mod id;
pub mod time;
pub mod voter;

pub use choice::{Choice, ParseResolutionError, ResolutionType, TallyVariant};
pub use id::ProposalId;
pub use time::Timestamp;
pub use voter::VoterId;
