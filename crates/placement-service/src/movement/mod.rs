//! Movement execution and audit.

pub mod ledger;

pub use ledger::MovementLedger;
