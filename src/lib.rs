//! Account-and-ledger engine for a retail banking API.
//!
//! Holds account balances and records money movements (domestic, inter-bank and wire
//! transfers, deposits, withdrawals). Every movement is validated, applied under per-account
//! exclusive access and recorded as an immutable [`TransferRecord`].
//!
//! ```no_run
//! use ledger_engine::{DomesticRequest, LedgerEngine};
//!
//! let engine = LedgerEngine::new();
//! engine.register_user("alice", "1000000001", &"s3cret".into()).unwrap();
//! engine.register_user("bob", "2000000002", &"hunter2".into()).unwrap();
//! engine.deposit("alice", "1000000001", "500.00", Some("salary")).unwrap();
//!
//! let receipt = engine
//!     .transfer_domestic(
//!         "alice",
//!         "1000000001",
//!         DomesticRequest {
//!             beneficiary_name: Some("Bob".into()),
//!             beneficiary_account_number: Some("2000000002".into()),
//!             bank_name: Some("Ledger Bank".into()),
//!             amount: Some("200.00".into()),
//!             password: Some("s3cret".into()),
//!             ..DomesticRequest::default()
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(receipt.new_balance().to_string(), "300.00");
//! ```

mod engine;

pub use engine::*;
