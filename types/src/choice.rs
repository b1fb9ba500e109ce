//! Vote choices, tally variants and tie-resolution kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A yes/no vote. In the quadratic variant this is also the locked direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Yes,
    No,
}

impl Choice {
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for Choice {
    fn from(yes: bool) -> Self {
        if yes {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.write_str("yes"),
            Self::No => f.write_str("no"),
        }
    }
}

/// How votes on a proposal are weighted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TallyVariant {
    /// One vote per shareholder, weighted by shares.
    Simple,
    /// Vote counts bought from a per-voter token budget at quadratic cost.
    Quadratic,
}

impl fmt::Display for TallyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("SIMPLE"),
            Self::Quadratic => f.write_str("QUADRATIC"),
        }
    }
}

/// The admin decision that breaks an exact tie after voting closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionType {
    /// Keep the status quo: the proposal is rejected.
    StatusQuoReject,
    /// The chairperson's casting vote approves the proposal.
    ChairpersonYes,
    /// The chairperson's casting vote rejects the proposal.
    ChairpersonNo,
}

impl ResolutionType {
    pub const ALL: [Self; 3] = [Self::StatusQuoReject, Self::ChairpersonYes, Self::ChairpersonNo];

    /// Whether this resolution approves the proposal.
    pub fn approves(&self) -> bool {
        matches!(self, Self::ChairpersonYes)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusQuoReject => "STATUS_QUO_REJECT",
            Self::ChairpersonYes => "CHAIRPERSON_YES",
            Self::ChairpersonNo => "CHAIRPERSON_NO",
        }
    }
}

impl fmt::Display for ResolutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names none of the recognised resolution types.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised resolution type: {0:?}")]
pub struct ParseResolutionError(pub String);

impl FromStr for ResolutionType {
    type Err = ParseResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseResolutionError(s.to_string()))
    }
}
