//! Normalizer: excess ("awl") and shortfall ("radd") corrections.
//!
//! Both corrections only run when no heir inherits as residuary. Ratios are
//! always computed from the uncorrected snapshot first; the corrected shares
//! are a new set, the input is never updated in place.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Relationship, ResultEngine, Share};

/// Corrective procedure applied to the fixed shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Correction {
    /// Fixed shares summed to `raw_total > 1`; every share was scaled by
    /// `ratio = 1 / raw_total`.
    Excess { raw_total: Share, ratio: Share },
    /// Fixed shares summed to less than 1; non-spouse shares were scaled by
    /// `ratio > 1` to absorb `shortfall`.
    Shortfall { shortfall: Share, ratio: Share },
}

impl Correction {
    #[must_use]
    pub fn ratio(self) -> Share {
        match self {
            Correction::Excess { ratio, .. } | Correction::Shortfall { ratio, .. } => ratio,
        }
    }
}

/// Fixed share entering the normalizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub heir_id: Uuid,
    pub relationship: Relationship,
    pub share: Share,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Normalized {
    /// Corrected fixed shares, in input order.
    pub shares: Vec<Entry>,
    /// What the fixed shares leave over: the residue when residuary heirs
    /// exist, otherwise the unclaimed part of the estate.
    pub residual: Share,
    pub correction: Option<Correction>,
}

/// Applies the corrections to a set of fixed shares.
///
/// Fails with [`EngineError::RuleTableInvariantViolation`] when the fixed
/// shares exceed the estate while residuary heirs exist: the residuary
/// classifier never lets that happen with a consistent rule table.
pub fn normalize(fixed: &[Entry], has_residuary_heirs: bool) -> ResultEngine<Normalized> {
    let total: Share = fixed.iter().map(|entry| entry.share).sum();

    if has_residuary_heirs {
        if total > Share::ONE {
            return Err(EngineError::RuleTableInvariantViolation(format!(
                "fixed shares sum to {total} while residuary heirs exist"
            )));
        }
        return Ok(Normalized {
            shares: fixed.to_vec(),
            residual: Share::ONE - total,
            correction: None,
        });
    }

    if total > Share::ONE {
        let ratio = Share::ONE / total;
        tracing::debug!(%total, %ratio, "excess correction");
        return Ok(Normalized {
            shares: fixed
                .iter()
                .map(|entry| Entry {
                    share: entry.share * ratio,
                    ..*entry
                })
                .collect(),
            residual: Share::ZERO,
            correction: Some(Correction::Excess {
                raw_total: total,
                ratio,
            }),
        });
    }

    let shortfall = Share::ONE - total;
    let eligible: Share = fixed
        .iter()
        .filter(|entry| !entry.relationship.is_spouse())
        .map(|entry| entry.share)
        .sum();

    if shortfall.is_zero() || eligible.is_zero() {
        return Ok(Normalized {
            shares: fixed.to_vec(),
            residual: shortfall,
            correction: None,
        });
    }

    let ratio = (eligible + shortfall) / eligible;
    tracing::debug!(%shortfall, %ratio, "shortfall correction");
    Ok(Normalized {
        shares: fixed
            .iter()
            .map(|entry| {
                if entry.relationship.is_spouse() {
                    *entry
                } else {
                    Entry {
                        share: entry.share + shortfall * (entry.share / eligible),
                        ..*entry
                    }
                }
            })
            .collect(),
        residual: Share::ZERO,
        correction: Some(Correction::Shortfall { shortfall, ratio }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use Relationship as R;

    fn entries(shares: &[(Relationship, Share)]) -> Vec<Entry> {
        shares
            .iter()
            .map(|(relationship, share)| Entry {
                heir_id: Uuid::new_v4(),
                relationship: *relationship,
                share: *share,
            })
            .collect()
    }

    fn total(normalized: &Normalized) -> Share {
        normalized.shares.iter().map(|e| e.share).sum::<Share>() + normalized.residual
    }

    #[test]
    fn excess_scales_every_share() {
        let fixed = entries(&[
            (R::Husband, Share::new(1, 2)),
            (R::FullSister, Share::new(1, 3)),
            (R::FullSister, Share::new(1, 3)),
        ]);
        let normalized = normalize(&fixed, false).unwrap();
        assert_eq!(
            normalized.correction,
            Some(Correction::Excess {
                raw_total: Share::new(7, 6),
                ratio: Share::new(6, 7),
            })
        );
        assert_eq!(normalized.shares[0].share, Share::new(3, 7));
        assert_eq!(normalized.shares[1].share, Share::new(2, 7));
        assert_eq!(total(&normalized), Share::ONE);
    }

    #[test]
    fn shortfall_skips_spouses() {
        let fixed = entries(&[
            (R::Wife, Share::new(1, 8)),
            (R::Daughter, Share::new(1, 2)),
            (R::Mother, Share::new(1, 6)),
        ]);
        let normalized = normalize(&fixed, false).unwrap();
        assert_eq!(normalized.shares[0].share, Share::new(1, 8));
        // 5/24 left, split 3:1 between daughter and mother.
        assert_eq!(normalized.shares[1].share, Share::new(21, 32));
        assert_eq!(normalized.shares[2].share, Share::new(7, 32));
        assert!(matches!(
            normalized.correction,
            Some(Correction::Shortfall { .. })
        ));
        assert_eq!(total(&normalized), Share::ONE);
    }

    #[test]
    fn spouse_alone_leaves_remainder_unclaimed() {
        let fixed = entries(&[(R::Wife, Share::new(1, 4))]);
        let normalized = normalize(&fixed, false).unwrap();
        assert_eq!(normalized.correction, None);
        assert_eq!(normalized.shares[0].share, Share::new(1, 4));
        assert_eq!(normalized.residual, Share::new(3, 4));
    }

    #[test]
    fn exact_total_needs_no_correction() {
        let fixed = entries(&[
            (R::Husband, Share::new(1, 2)),
            (R::FullSister, Share::new(1, 2)),
        ]);
        let normalized = normalize(&fixed, false).unwrap();
        assert_eq!(normalized.correction, None);
        assert_eq!(normalized.shares, fixed);
        assert_eq!(normalized.residual, Share::ZERO);
    }

    #[test]
    fn residuary_heirs_take_the_residual() {
        let fixed = entries(&[(R::Mother, Share::new(1, 6))]);
        let normalized = normalize(&fixed, true).unwrap();
        assert_eq!(normalized.correction, None);
        assert_eq!(normalized.residual, Share::new(5, 6));
    }

    #[test]
    fn excess_with_residuary_heirs_is_reported() {
        let fixed = entries(&[
            (R::Husband, Share::new(1, 2)),
            (R::Daughter, Share::new(2, 3)),
        ]);
        assert!(matches!(
            normalize(&fixed, true),
            Err(EngineError::RuleTableInvariantViolation(_))
        ));
    }

    #[test]
    fn no_heirs_leave_everything_unclaimed() {
        let normalized = normalize(&[], false).unwrap();
        assert_eq!(normalized.residual, Share::ONE);
        assert_eq!(normalized.correction, None);
    }
}
