//! Result assembler.
//!
//! Combines blocking, fixed shares, the residuary split and the corrections
//! into one [`AllocationLine`] per declared heir, then checks that the whole
//! estate is accounted for.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, HeirDeclaration, Money, Relationship, ResultEngine, Sex, Share,
    basis::{Basis, Explanation, Reason},
    blocking::BlockingMap,
    fixed::FixedShare,
    normalize::{Correction, Normalized},
    residuary::{Classification, Dismissal},
};

/// Allocation of one heir.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub heir_id: Uuid,
    pub name: String,
    pub relationship: Relationship,
    pub sex: Sex,
    /// Fraction of the whole estate, in `[0, 1]`.
    pub fraction: Share,
    /// `fraction × estate`, rounded half up to the minor unit.
    pub amount: Money,
    pub is_blocked: bool,
    pub blocked_by: Option<Relationship>,
    pub basis: Basis,
}

/// Outcome of one allocation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub estate: Money,
    /// One line per declared heir, in declaration order.
    pub lines: Vec<AllocationLine>,
    /// Part of the estate no heir can claim.
    pub remaining_fraction: Share,
    pub remaining_amount: Money,
    pub correction: Option<Correction>,
}

impl AllocationResult {
    /// Result of a case without heirs: the whole estate is unclaimed.
    pub(crate) fn unclaimed(estate: Money) -> Self {
        Self {
            estate,
            lines: Vec::new(),
            remaining_fraction: Share::ONE,
            remaining_amount: estate,
            correction: None,
        }
    }

    #[must_use]
    pub fn has_excess_correction(&self) -> bool {
        matches!(self.correction, Some(Correction::Excess { .. }))
    }

    #[must_use]
    pub fn has_shortfall_correction(&self) -> bool {
        matches!(self.correction, Some(Correction::Shortfall { .. }))
    }

    /// Scale applied by the excess correction.
    #[must_use]
    pub fn excess_ratio(&self) -> Option<Share> {
        self.correction
            .filter(|_| self.has_excess_correction())
            .map(Correction::ratio)
    }

    /// Scale applied to non-spouse fixed shares by the shortfall correction.
    #[must_use]
    pub fn shortfall_ratio(&self) -> Option<Share> {
        self.correction
            .filter(|_| self.has_shortfall_correction())
            .map(Correction::ratio)
    }

    /// Sum of the heirs' fractions.
    #[must_use]
    pub fn allocated_fraction(&self) -> Share {
        self.lines.iter().map(|line| line.fraction).sum()
    }

    /// Nothing could be allocated: the case needs a manual legal review.
    #[must_use]
    pub fn needs_review(&self) -> bool {
        self.remaining_fraction == Share::ONE
    }

    /// One explanation record per heir, in declaration order.
    #[must_use]
    pub fn explanations(&self) -> Vec<Explanation> {
        self.lines
            .iter()
            .map(|line| Explanation {
                heir_id: line.heir_id,
                name: line.name.clone(),
                relationship: line.relationship,
                fraction: line.fraction,
                amount: line.amount,
                reasons: line.basis.reasons().to_vec(),
            })
            .collect()
    }

    /// Checks the invariants every result must satisfy.
    pub fn verify(&self) -> ResultEngine<()> {
        let violation = |msg: String| Err(EngineError::RuleTableInvariantViolation(msg));

        for line in &self.lines {
            if !line.fraction.is_proper() {
                return violation(format!(
                    "{} ({}) got fraction {}",
                    line.name, line.relationship, line.fraction
                ));
            }
            if line.is_blocked && !line.fraction.is_zero() {
                return violation(format!(
                    "blocked heir {} ({}) got fraction {}",
                    line.name, line.relationship, line.fraction
                ));
            }
        }
        if !self.remaining_fraction.is_proper() {
            return violation(format!(
                "remaining fraction {} out of range",
                self.remaining_fraction
            ));
        }
        let total = self.allocated_fraction() + self.remaining_fraction;
        if total != Share::ONE {
            return violation(format!(
                "fractions sum to {total} instead of 1 ({} allocated, {} remaining)",
                self.allocated_fraction(),
                self.remaining_fraction
            ));
        }
        Ok(())
    }
}

/// Intermediate outputs of one run, borrowed by the assembler.
pub(crate) struct Stages<'a> {
    pub blocking: &'a BlockingMap,
    pub fixed: &'a HashMap<Uuid, FixedShare>,
    pub classification: &'a Classification,
    pub normalized: &'a Normalized,
}

/// Builds and verifies the result of a case.
pub(crate) fn assemble(
    estate: Money,
    heirs: &[HeirDeclaration],
    stages: Stages<'_>,
) -> ResultEngine<AllocationResult> {
    let corrected: HashMap<Uuid, Share> = stages
        .normalized
        .shares
        .iter()
        .map(|entry| (entry.heir_id, entry.share))
        .collect();
    let residuary = stages.classification.has_residuary_heirs();
    let (residue, remaining_fraction) = if residuary {
        (stages.normalized.residual, Share::ZERO)
    } else {
        (Share::ZERO, stages.normalized.residual)
    };
    let residuary_parts = stages.classification.split(residue);
    let total_weight = stages.classification.total_weight();

    let lines = heirs
        .iter()
        .map(|heir| {
            let status = stages.blocking.get(&heir.id).copied().unwrap_or_default();
            let mut basis = Basis::default();
            let mut fraction = Share::ZERO;

            if let Some(by) = status.blocked_by.filter(|_| status.blocked) {
                basis.push(Reason::Blocked { by });
            } else {
                if let Some(fixed) = stages.fixed.get(&heir.id) {
                    basis.push(fixed.class.reason());
                    let share = corrected.get(&heir.id).copied().unwrap_or(fixed.fraction);
                    if share != fixed.fraction {
                        match stages.normalized.correction {
                            Some(Correction::Excess { raw_total, ratio }) => {
                                basis.push(Reason::ExcessCorrection { raw_total, ratio });
                            }
                            Some(Correction::Shortfall { .. }) => {
                                basis.push(Reason::ShortfallCorrection {
                                    added: share - fixed.fraction,
                                });
                            }
                            None => {}
                        }
                    }
                    fraction = fraction + share;
                }

                if let Some(part) = residuary_parts.get(&heir.id) {
                    if let Some(member) = stages
                        .classification
                        .heirs
                        .iter()
                        .find(|member| member.heir_id == heir.id)
                    {
                        basis.push(Reason::Residuary {
                            kind: member.kind,
                            weight: member.weight,
                            total_weight,
                            residue,
                        });
                    }
                    fraction = fraction + *part;
                }

                match stages.classification.dismissed.get(&heir.id) {
                    Some(Dismissal::Outranked { by }) => {
                        basis.push(Reason::Outranked { by: *by });
                    }
                    Some(Dismissal::ResidueExhausted) => basis.push(Reason::ResidueExhausted),
                    None => {}
                }
            }

            AllocationLine {
                heir_id: heir.id,
                name: heir.name.clone(),
                relationship: heir.relationship,
                sex: heir.effective_sex(),
                fraction,
                amount: estate.portion(fraction),
                is_blocked: status.blocked,
                blocked_by: status.blocked_by,
                basis,
            }
        })
        .collect();

    let result = AllocationResult {
        estate,
        lines,
        remaining_fraction,
        remaining_amount: estate.portion(remaining_fraction),
        correction: stages.normalized.correction,
    };
    result.verify()?;
    Ok(result)
}
