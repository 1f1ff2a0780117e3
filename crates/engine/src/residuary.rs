//! Residuary classifier.
//!
//! Residuary heirs share what is left once fixed shares are removed. Every
//! eligible heir gets a priority rank; only the nearest rank present inherits,
//! male heirs weighing 2 parts and female heirs 1.
use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    CaseFacts, HeirDeclaration, Relationship, Sex, Share, basis::ResiduaryKind,
    fixed::FixedShare,
};

use Relationship as R;

/// Residuary eligibility of a relationship class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Claim {
    /// Lower is nearer.
    pub rank: u8,
    pub kind: ResiduaryKind,
}

impl Claim {
    const fn new(rank: u8, kind: ResiduaryKind) -> Self {
        Self { rank, kind }
    }
}

pub type ResiduaryRule = fn(&CaseFacts) -> Option<Claim>;

/// A heir taking part in the residue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResiduaryHeir {
    pub heir_id: Uuid,
    pub relationship: Relationship,
    pub kind: ResiduaryKind,
    pub weight: u32,
}

/// Why a residuary-eligible heir takes nothing from the residue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dismissal {
    Outranked { by: Relationship },
    ResidueExhausted,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// Heirs sharing the residue, in declaration order.
    pub heirs: Vec<ResiduaryHeir>,
    pub dismissed: HashMap<Uuid, Dismissal>,
}

impl Classification {
    #[must_use]
    pub fn has_residuary_heirs(&self) -> bool {
        !self.heirs.is_empty()
    }

    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.heirs.iter().map(|heir| heir.weight).sum()
    }

    /// Splits `residue` among the residuary heirs by weight.
    #[must_use]
    pub fn split(&self, residue: Share) -> HashMap<Uuid, Share> {
        let total = self.total_weight();
        if total == 0 {
            return HashMap::new();
        }
        let per_part = residue / Share::whole(i64::from(total));
        self.heirs
            .iter()
            .map(|heir| (heir.heir_id, per_part * Share::whole(i64::from(heir.weight))))
            .collect()
    }
}

/// Residuary rule of a relationship. `None` for relationships that never
/// inherit as residuaries.
#[must_use]
pub fn rule_for(relationship: Relationship) -> Option<ResiduaryRule> {
    let rule: ResiduaryRule = match relationship {
        R::Son => |_: &CaseFacts| Some(Claim::new(1, ResiduaryKind::OwnRight)),
        R::Daughter => |facts: &CaseFacts| {
            facts
                .has(R::Son)
                .then_some(Claim::new(1, ResiduaryKind::WithMalePeer))
        },
        R::SonsSon => |_: &CaseFacts| Some(Claim::new(2, ResiduaryKind::OwnRight)),
        R::SonsDaughter => |facts: &CaseFacts| {
            facts
                .has(R::SonsSon)
                .then_some(Claim::new(2, ResiduaryKind::WithMalePeer))
        },
        R::Father => |facts: &CaseFacts| {
            (!facts.has_male_descendants()).then_some(Claim::new(3, ResiduaryKind::OwnRight))
        },
        R::PaternalGrandfather => |facts: &CaseFacts| {
            (!facts.has_male_descendants()).then_some(Claim::new(4, ResiduaryKind::OwnRight))
        },
        R::FullBrother => |_: &CaseFacts| Some(Claim::new(5, ResiduaryKind::OwnRight)),
        R::FullSister => |facts: &CaseFacts| {
            if facts.has(R::FullBrother) {
                Some(Claim::new(5, ResiduaryKind::WithMalePeer))
            } else {
                facts
                    .has_female_descendants()
                    .then_some(Claim::new(5, ResiduaryKind::WithFemaleDescendants))
            }
        },
        R::PaternalHalfBrother => |_: &CaseFacts| Some(Claim::new(6, ResiduaryKind::OwnRight)),
        R::PaternalHalfSister => |facts: &CaseFacts| {
            if facts.has(R::PaternalHalfBrother) {
                Some(Claim::new(6, ResiduaryKind::WithMalePeer))
            } else {
                (facts.has_female_descendants() && !facts.has(R::FullSister))
                    .then_some(Claim::new(6, ResiduaryKind::WithFemaleDescendants))
            }
        },
        R::FullBrothersSon => |_: &CaseFacts| Some(Claim::new(7, ResiduaryKind::OwnRight)),
        R::PaternalHalfBrothersSon => |_: &CaseFacts| Some(Claim::new(8, ResiduaryKind::OwnRight)),
        R::FullPaternalUncle => |_: &CaseFacts| Some(Claim::new(9, ResiduaryKind::OwnRight)),
        R::PaternalHalfUncle => |_: &CaseFacts| Some(Claim::new(10, ResiduaryKind::OwnRight)),
        R::FullPaternalUnclesSon => |_: &CaseFacts| Some(Claim::new(11, ResiduaryKind::OwnRight)),
        R::PaternalHalfUnclesSon => |_: &CaseFacts| Some(Claim::new(12, ResiduaryKind::OwnRight)),
        _ => return None,
    };
    Some(rule)
}

/// Residuary weight of a heir: two parts for a male, one for a female.
#[must_use]
pub fn weight(sex: Sex) -> u32 {
    match sex {
        Sex::Male => 2,
        Sex::Female => 1,
    }
}

/// Classifies the non-blocked heirs of a case.
///
/// An heir holding a fixed share only joins the residue when its fixed share
/// is flagged `residuary_too`. When the fixed shares already cover the whole
/// estate there is no residue and every claimant is dismissed.
#[must_use]
pub fn classify(
    heirs: &[&HeirDeclaration],
    facts: &CaseFacts,
    fixed: &HashMap<Uuid, FixedShare>,
) -> Classification {
    let claims: Vec<(&HeirDeclaration, Claim)> = heirs
        .iter()
        .filter(|heir| {
            fixed
                .get(&heir.id)
                .is_none_or(|share| share.class.residuary_too)
        })
        .filter_map(|heir| {
            let rule = rule_for(heir.relationship)?;
            Some((*heir, rule(facts)?))
        })
        .collect();

    let Some(nearest) = claims.iter().map(|(_, claim)| claim.rank).min() else {
        return Classification::default();
    };

    let fixed_total: Share = fixed.values().map(|share| share.fraction).sum();
    if fixed_total >= Share::ONE {
        tracing::debug!(%fixed_total, "fixed shares exhaust the estate, no residue");
        return Classification {
            heirs: Vec::new(),
            dismissed: claims
                .iter()
                .map(|(heir, _)| (heir.id, Dismissal::ResidueExhausted))
                .collect(),
        };
    }

    let nearest_relationship = claims
        .iter()
        .filter(|(_, claim)| claim.rank == nearest)
        .map(|(heir, _)| heir.relationship)
        .min();

    let mut classification = Classification::default();
    for (heir, claim) in claims {
        if claim.rank == nearest {
            classification.heirs.push(ResiduaryHeir {
                heir_id: heir.id,
                relationship: heir.relationship,
                kind: claim.kind,
                weight: weight(heir.effective_sex()),
            });
        } else if let Some(by) = nearest_relationship {
            classification
                .dismissed
                .insert(heir.id, Dismissal::Outranked { by });
        }
    }
    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed;

    fn run(relationships: &[Relationship]) -> (Vec<HeirDeclaration>, Classification) {
        let heirs: Vec<HeirDeclaration> = relationships
            .iter()
            .map(|r| HeirDeclaration::new(r.tag(), *r))
            .collect();
        let refs: Vec<&HeirDeclaration> = heirs.iter().collect();
        let facts = CaseFacts::collect(refs.iter().copied());
        let fixed = fixed::assign(&refs, &facts);
        let classification = classify(&refs, &facts, &fixed);
        (heirs, classification)
    }

    #[test]
    fn son_and_daughter_share_two_to_one() {
        let (heirs, classification) = run(&[R::Son, R::Daughter]);
        assert_eq!(classification.total_weight(), 3);
        let split = classification.split(Share::ONE);
        assert_eq!(split[&heirs[0].id], Share::new(2, 3));
        assert_eq!(split[&heirs[1].id], Share::new(1, 3));
    }

    #[test]
    fn father_joins_residue_with_daughter_only() {
        let (heirs, classification) = run(&[R::Mother, R::Father, R::Daughter]);
        assert_eq!(classification.heirs.len(), 1);
        assert_eq!(classification.heirs[0].heir_id, heirs[1].id);

        let (_, classification) = run(&[R::Father, R::Son]);
        assert_eq!(classification.heirs.len(), 1);
        assert_eq!(classification.heirs[0].relationship, R::Son);
    }

    #[test]
    fn nearest_rank_takes_the_residue() {
        let (heirs, classification) =
            run(&[R::FullSister, R::Daughter, R::PaternalHalfBrother]);
        assert_eq!(classification.heirs.len(), 1);
        assert_eq!(classification.heirs[0].relationship, R::FullSister);
        assert_eq!(
            classification.heirs[0].kind,
            ResiduaryKind::WithFemaleDescendants
        );
        assert_eq!(
            classification.dismissed[&heirs[2].id],
            Dismissal::Outranked { by: R::FullSister }
        );
    }

    #[test]
    fn sisters_without_male_peer_split_equally() {
        let (heirs, classification) = run(&[R::Daughter, R::FullSister, R::FullSister]);
        let split = classification.split(Share::new(1, 2));
        assert_eq!(split[&heirs[1].id], Share::new(1, 4));
        assert_eq!(split[&heirs[2].id], Share::new(1, 4));
    }

    #[test]
    fn exhausted_estate_dismisses_claimants() {
        // Husband 1/2 + two full sisters 2/3 leaves nothing for the half brother.
        let (heirs, classification) = run(&[
            R::Husband,
            R::FullSister,
            R::FullSister,
            R::PaternalHalfBrother,
        ]);
        assert!(!classification.has_residuary_heirs());
        assert_eq!(
            classification.dismissed[&heirs[3].id],
            Dismissal::ResidueExhausted
        );
    }

    #[test]
    fn fixed_only_heirs_never_claim_residue() {
        let (_, classification) = run(&[R::Daughter, R::Mother, R::Wife]);
        assert!(!classification.has_residuary_heirs());
        assert!(classification.dismissed.is_empty());
    }
}
