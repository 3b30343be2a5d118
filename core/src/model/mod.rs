pub mod coordinate;
pub mod entry;
pub mod ledger;
pub mod mapping;
