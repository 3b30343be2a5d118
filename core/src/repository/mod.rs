pub mod ledger;
pub mod pending;
pub mod traits;

pub use ledger::FileLedgerRepository;
pub use pending::FilePendingRepository;
pub use traits::{LedgerRepository, PendingRepository};

#[cfg(test)]
pub(crate) mod mock;
