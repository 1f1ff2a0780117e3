//! Structured justification of an allocation.
//!
//! The engine never produces prose. Every line carries a [`Basis`]: the list
//! of [`Reason`]s that produced its fraction, each one a rule identifier plus
//! the facts it used. Rendering them in any language is up to the caller.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, Relationship, Share};

/// Identifier of a fixed-share rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Husband 1/2 or 1/4, wives 1/4 or 1/8, by presence of descendants.
    Spouse,
    /// Mother 1/3, or 1/6 with descendants or two or more siblings.
    Mother,
    /// Mother takes 1/3 of what is left after the spouse, when the father
    /// is present and there are no descendants and fewer than two siblings.
    MotherThirdOfRemainder,
    /// Father or paternal grandfather, 1/6 with descendants.
    AscendantSixth,
    /// Grandmothers share 1/6.
    GrandmotherSixth,
    /// A single female heir of her class takes 1/2.
    SingleFemaleHalf,
    /// Two or more female heirs of the same class share 2/3.
    FemalesTwoThirds,
    /// 1/6 completing the 2/3 already opened by a single nearer female.
    ComplementSixth,
    /// Maternal half siblings, 1/6 alone or 1/3 shared equally.
    MaternalSiblings,
    /// The 2/3 of the female class is exhausted by nearer females.
    ExcludedByFemaleQuota,
    /// A full sister inheriting as residuary excludes paternal half sisters.
    ExcludedByResiduarySister,
}

/// Case fact a rule looked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum Fact {
    NoDescendants,
    Descendants,
    MaleDescendants,
    FemaleDescendantsOnly,
    Siblings { count: usize },
    Count { relationship: Relationship, count: usize },
    Spouse { relationship: Relationship },
    FatherPresent,
}

/// Why a heir takes part in the residue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResiduaryKind {
    /// Male agnate inheriting in his own right.
    OwnRight,
    /// Female inheriting next to a male peer of the same degree, at half his
    /// weight.
    WithMalePeer,
    /// Sister inheriting the residue alongside female descendants.
    WithFemaleDescendants,
}

/// Single step of the justification of a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Reason {
    Blocked {
        by: Relationship,
    },
    Fixed {
        rule: RuleId,
        /// Share of the whole class before the split.
        class_share: Share,
        shared_among: usize,
        facts: Vec<Fact>,
    },
    Excluded {
        rule: RuleId,
        facts: Vec<Fact>,
    },
    Residuary {
        kind: ResiduaryKind,
        weight: u32,
        total_weight: u32,
        /// Whole residue split among the residuary heirs.
        residue: Share,
    },
    /// Residuary-eligible, but a nearer residuary class takes the residue.
    Outranked {
        by: Relationship,
    },
    /// Residuary-eligible, but fixed shares already cover the estate.
    ResidueExhausted,
    ExcessCorrection {
        raw_total: Share,
        ratio: Share,
    },
    ShortfallCorrection {
        added: Share,
    },
}

/// Ordered reasons of one line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Basis(pub Vec<Reason>);

impl Basis {
    pub fn push(&mut self, reason: Reason) {
        self.0.push(reason);
    }

    #[must_use]
    pub fn reasons(&self) -> &[Reason] {
        &self.0
    }

    /// Fixed-share rule applied, if any.
    #[must_use]
    pub fn fixed_rule(&self) -> Option<RuleId> {
        self.0.iter().find_map(|reason| match reason {
            Reason::Fixed { rule, .. } | Reason::Excluded { rule, .. } => Some(*rule),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_residuary(&self) -> bool {
        self.0
            .iter()
            .any(|reason| matches!(reason, Reason::Residuary { .. }))
    }
}

/// Explanation record of one heir, ready for a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub heir_id: Uuid,
    pub name: String,
    pub relationship: Relationship,
    pub fraction: Share,
    pub amount: Money,
    pub reasons: Vec<Reason>,
}
