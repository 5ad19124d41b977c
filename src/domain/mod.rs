//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of report throttling:
//! - The error report model
//! - Equality key extraction
//! - The rolling history of admitted reports
//! - The sliding-window admission policy
//!
//! All types in this layer are pure and easily testable.

pub mod history;
pub mod key;
pub mod policy;
pub mod report;
