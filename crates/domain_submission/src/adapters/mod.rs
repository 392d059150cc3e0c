//! Adapters for the submission ports
//!
//! - `in_memory`: synthesized payer responses, a local offline queue and a
//!   fixed compliance report, used by the CLI and the test suite

pub mod in_memory;

pub use in_memory::{
    ConnectivityFlag, InMemoryOfflineQueue, MockBehavior, MockSubmissionAdapter,
    StaticComplianceValidator,
};
