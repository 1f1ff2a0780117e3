//! Inheritance share allocation engine.
//!
//! Distributes an estate among declared heirs following a fixed table of
//! succession rules: blocking between relationships, prescribed fixed shares,
//! residuary shares weighted 2:1 between male and female heirs, and the
//! excess and shortfall corrections.
//!
//! The computation is pure: no I/O, no shared mutable state. The only shared
//! data is the static [`relationship`] registry.
//!
//! # Examples
//!
//! ```rust
//! use engine::{Currency, Engine, HeirDeclaration, Money, Relationship, Share};
//!
//! let engine = Engine::builder().currency(Currency::Eur).build();
//! let estate = engine.parse_estate("900000").unwrap();
//! let heirs = [
//!     HeirDeclaration::new("Karim", Relationship::Son),
//!     HeirDeclaration::new("Leila", Relationship::Daughter),
//! ];
//!
//! let result = engine.allocate(estate, &heirs).unwrap();
//! assert_eq!(result.lines[0].fraction, Share::new(2, 3));
//! assert_eq!(result.lines[1].amount, Money::from_major(300_000, Currency::Eur).unwrap());
//! ```
pub use allocation::{AllocationLine, AllocationResult};
pub use basis::{Basis, Explanation, Fact, Reason, ResiduaryKind, RuleId};
pub use blocking::BlockStatus;
pub use currency::Currency;
pub use error::EngineError;
pub use facts::CaseFacts;
pub use heir::{HeirDeclaration, MAX_WIVES};
pub use money::Money;
pub use normalize::Correction;
pub use relationship::{Category, Relationship, RelationshipRule, Sex, TagGroups};
pub use share::Share;

mod allocation;
mod basis;
pub mod blocking;
mod currency;
mod error;
mod facts;
pub mod fixed;
mod heir;
mod money;
pub mod normalize;
pub mod relationship;
pub mod residuary;
mod share;

type ResultEngine<T> = Result<T, EngineError>;

/// Allocation engine. Holds the currency estates are expressed in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Engine {
    currency: Currency,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Parses an estate value typed by a user.
    ///
    /// Fails with [`EngineError::InvalidEstateValue`] for non-numeric,
    /// zero or negative amounts.
    pub fn parse_estate(&self, input: &str) -> ResultEngine<Money> {
        let estate = Money::parse(input, self.currency)?;
        ensure_positive(estate)?;
        Ok(estate)
    }

    /// Distributes `estate` among `heirs`.
    ///
    /// Errors are raised before any share is computed, except
    /// [`EngineError::RuleTableInvariantViolation`] which reports an
    /// allocation that does not add up.
    pub fn allocate(
        &self,
        estate: Money,
        heirs: &[HeirDeclaration],
    ) -> ResultEngine<AllocationResult> {
        if estate.currency() != self.currency {
            return Err(EngineError::InvalidCurrency(format!(
                "estate is in {}, engine expects {}",
                estate.currency(),
                self.currency
            )));
        }
        ensure_positive(estate)?;
        heir::validate(heirs)?;

        if heirs.is_empty() {
            tracing::warn!(%estate, "no heirs declared, the whole estate is unclaimed");
            return Ok(AllocationResult::unclaimed(estate));
        }

        let blocking = blocking::resolve(heirs);
        let eligible: Vec<&HeirDeclaration> = heirs
            .iter()
            .filter(|heir| !blocking.get(&heir.id).is_some_and(|status| status.blocked))
            .collect();
        let facts = CaseFacts::collect(eligible.iter().copied());
        tracing::debug!(heirs = heirs.len(), eligible = eligible.len(), "blocking resolved");

        let fixed = fixed::assign(&eligible, &facts);
        let classification = residuary::classify(&eligible, &facts, &fixed);

        // Normalizer input keeps declaration order.
        let entries: Vec<normalize::Entry> = eligible
            .iter()
            .filter_map(|heir| fixed.get(&heir.id))
            .map(|share| normalize::Entry {
                heir_id: share.heir_id,
                relationship: share.relationship,
                share: share.fraction,
            })
            .collect();
        let normalized = normalize::normalize(&entries, classification.has_residuary_heirs())?;

        let result = allocation::assemble(
            estate,
            heirs,
            allocation::Stages {
                blocking: &blocking,
                fixed: &fixed,
                classification: &classification,
                normalized: &normalized,
            },
        )?;

        if !result.remaining_fraction.is_zero() {
            tracing::warn!(
                remaining = %result.remaining_fraction,
                amount = %result.remaining_amount,
                "part of the estate is unclaimed"
            );
        }
        tracing::info!(
            %estate,
            heirs = result.lines.len(),
            correction = ?result.correction,
            "allocation completed"
        );
        Ok(result)
    }
}

fn ensure_positive(estate: Money) -> ResultEngine<()> {
    if !estate.is_positive() {
        return Err(EngineError::InvalidEstateValue(format!(
            "estate must be positive, got {estate}"
        )));
    }
    Ok(())
}

/// Allocates with the default engine (estate currency taken from `estate`).
pub fn allocate(estate: Money, heirs: &[HeirDeclaration]) -> ResultEngine<AllocationResult> {
    Engine::builder()
        .currency(estate.currency())
        .build()
        .allocate(estate, heirs)
}

/// Builder for [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    currency: Currency,
}

impl EngineBuilder {
    /// Currency of the estates passed to the engine.
    pub fn currency(mut self, currency: Currency) -> EngineBuilder {
        self.currency = currency;
        self
    }

    /// Construct `Engine`.
    pub fn build(self) -> Engine {
        Engine {
            currency: self.currency,
        }
    }
}
