//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! homecare submissions test suite.
//!
//! # Modules
//!
//! - `fixtures`: Document templates, licenses and dates used across tests
//! - `builders`: Builder patterns for service lines, licenses and forms
//! - `assertions`: Assertion helpers for progress, gate and ledger results
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
