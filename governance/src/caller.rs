//! Authenticated caller identity.

use ballot_types::VoterId;
use serde::{Deserialize, Serialize};

/// The identity and capability of whoever invokes a mutating operation.
///
/// Supplied by the authentication layer and trusted as-is; the engine does
/// no signature or session checks of its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: VoterId,
    pub is_admin: bool,
}

impl Caller {
    pub fn admin(id: impl Into<VoterId>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
        }
    }

    pub fn member(id: impl Into<VoterId>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }
}
