//! Core Kernel - Foundational types for the homecare submissions workspace
//!
//! This crate provides the building blocks shared by the submission domain:
//! - Money types with precise decimal arithmetic
//! - Calendar date ranges and facility timezones
//! - Strongly-typed identifiers
//! - Port errors and call metadata for external adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use temporal::{DateRange, Timezone, TemporalError};
pub use identifiers::{
    ServiceLineId, SubmissionId, LicenseId, FormId,
};
pub use ports::{PortError, DomainPort, OperationMetadata};
