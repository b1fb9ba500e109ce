//! Ledger records and abstract storage traits.
//!
//! Every storage backend (in-memory for tests, a database behind a service)
//! implements these traits. The voting engine depends only on the traits and
//! writes exclusively through [`WriteBatch`], which a backend must apply
//! all-or-nothing.

pub mod batch;
pub mod budget;
pub mod error;
pub mod proposal;
pub mod resolution;
pub mod shareholder;
pub mod vote;

pub use batch::{LedgerWrite, WriteBatch};
pub use budget::{BudgetStore, TokenBudget};
pub use error::StoreError;
pub use proposal::{ProposalRecord, ProposalStore};
pub use resolution::{ResolutionStore, TieResolution};
pub use shareholder::{ShareholderAccount, ShareholderStore};
pub use vote::{VoteRecord, VoteStore};

/// The full ledger as seen by the voting engine.
///
/// Reads go through the per-record traits. Writes are staged in a
/// [`WriteBatch`] and applied by [`LedgerStore::commit`]: either every write
/// in the batch becomes visible or none does.
pub trait LedgerStore:
    ShareholderStore + ProposalStore + VoteStore + BudgetStore + ResolutionStore + Send + Sync
{
    /// Apply a batch atomically.
    ///
    /// Backends must reject the whole batch with [`StoreError::Duplicate`] if
    /// it would insert a second vote for the same (proposal, voter) key or a
    /// second resolution for the same proposal.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
