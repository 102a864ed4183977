pub mod ledger;
pub mod oracle;
pub mod shared;
pub mod snapshot;
pub mod transaction;
