//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidEstateValue`] thrown when the estate is zero, negative or not a
//!   number.
//! - [`InvalidCurrency`] thrown when a currency code is not supported or the
//!   estate is not in the engine currency.
//! - [`UnknownRelationship`] thrown when a tag is not in the registry.
//! - [`InvalidHeirSet`] thrown when the declared heirs cannot coexist.
//! - [`RuleTableInvariantViolation`] thrown when an allocation does not add
//!   up. It points at a defect in the rule table, never at user input.
//!
//! Blocking, zero shares and both corrections are regular outcomes and are
//! reported on the [`AllocationResult`], not here.
//!
//!  [`InvalidEstateValue`]: EngineError::InvalidEstateValue
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`UnknownRelationship`]: EngineError::UnknownRelationship
//!  [`InvalidHeirSet`]: EngineError::InvalidHeirSet
//!  [`RuleTableInvariantViolation`]: EngineError::RuleTableInvariantViolation
//!  [`AllocationResult`]: super::AllocationResult
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid estate value: {0}")]
    InvalidEstateValue(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("\"{0}\" is not a known relationship!")]
    UnknownRelationship(String),
    #[error("Invalid heir set: {0}")]
    InvalidHeirSet(String),
    #[error("Rule table invariant violated: {0}")]
    RuleTableInvariantViolation(String),
}
