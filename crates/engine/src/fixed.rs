//! Fixed-share assigner.
//!
//! Each relationship with a prescribed entitlement maps to a small pure rule
//! over [`CaseFacts`]. A rule returns the share of the whole class, the
//! number of heirs it is split among, and the facts it looked at. Rules never
//! see other heirs' shares.
use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    CaseFacts, HeirDeclaration, Relationship, Share,
    basis::{Fact, Reason, RuleId},
};

use Relationship as R;

/// Outcome of a fixed-share rule for a whole relationship class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassShare {
    pub rule: RuleId,
    /// Share of the class, before the equal split.
    pub share: Share,
    /// Number of heirs the class share is split among.
    pub shared_among: usize,
    pub facts: Vec<Fact>,
    /// The heir also takes part in the residue (father or grandfather with
    /// female descendants only).
    pub residuary_too: bool,
}

impl ClassShare {
    fn new(rule: RuleId, share: Share, shared_among: usize, facts: Vec<Fact>) -> Self {
        Self {
            rule,
            share,
            shared_among: shared_among.max(1),
            facts,
            residuary_too: false,
        }
    }

    fn excluded(rule: RuleId, facts: Vec<Fact>) -> Self {
        Self::new(rule, Share::ZERO, 1, facts)
    }

    fn with_residue(mut self) -> Self {
        self.residuary_too = true;
        self
    }

    /// Share of a single heir of the class.
    #[must_use]
    pub fn per_heir(&self) -> Share {
        self.share.split(self.shared_among)
    }

    /// Zero-share outcomes: the heir is not blocked but takes nothing.
    #[must_use]
    pub fn is_exclusion(&self) -> bool {
        self.share.is_zero()
    }

    /// Reason recorded on the heir's basis.
    #[must_use]
    pub fn reason(&self) -> Reason {
        if self.is_exclusion() {
            Reason::Excluded {
                rule: self.rule,
                facts: self.facts.clone(),
            }
        } else {
            Reason::Fixed {
                rule: self.rule,
                class_share: self.share,
                shared_among: self.shared_among,
                facts: self.facts.clone(),
            }
        }
    }
}

/// Fixed share of one heir.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedShare {
    pub heir_id: Uuid,
    pub relationship: Relationship,
    pub fraction: Share,
    pub class: ClassShare,
}

pub type FixedRule = fn(&CaseFacts) -> Option<ClassShare>;

/// Rule of a relationship. `None` for relationships that only ever inherit
/// as residuaries.
#[must_use]
pub fn rule_for(relationship: Relationship) -> Option<FixedRule> {
    let rule: FixedRule = match relationship {
        R::Husband => husband,
        R::Wife => wife,
        R::Mother => mother,
        R::Father | R::PaternalGrandfather => ascendant,
        R::PaternalGrandmother | R::MaternalGrandmother => grandmother,
        R::Daughter => daughter,
        R::SonsDaughter => sons_daughter,
        R::FullSister => full_sister,
        R::PaternalHalfSister => paternal_half_sister,
        R::MaternalHalfBrother | R::MaternalHalfSister => maternal_sibling,
        _ => return None,
    };
    Some(rule)
}

/// Assigns fixed shares to the non-blocked heirs of a case.
///
/// `facts` must come from the same heirs. Heirs whose rule yields nothing are
/// absent from the map.
#[must_use]
pub fn assign(heirs: &[&HeirDeclaration], facts: &CaseFacts) -> HashMap<Uuid, FixedShare> {
    let mut classes: HashMap<Relationship, Option<ClassShare>> = HashMap::new();

    heirs
        .iter()
        .filter_map(|heir| {
            let class = classes
                .entry(heir.relationship)
                .or_insert_with(|| rule_for(heir.relationship).and_then(|rule| rule(facts)))
                .clone()?;
            Some((
                heir.id,
                FixedShare {
                    heir_id: heir.id,
                    relationship: heir.relationship,
                    fraction: class.per_heir(),
                    class,
                },
            ))
        })
        .collect()
}

fn descendant_fact(facts: &CaseFacts) -> Fact {
    if facts.has_descendants() {
        Fact::Descendants
    } else {
        Fact::NoDescendants
    }
}

/// 1/2 for one female of the class, 2/3 shared by two or more.
fn female_quota(count: usize, mut facts: Vec<Fact>, relationship: Relationship) -> ClassShare {
    facts.push(Fact::Count {
        relationship,
        count,
    });
    if count == 1 {
        ClassShare::new(RuleId::SingleFemaleHalf, Share::new(1, 2), 1, facts)
    } else {
        ClassShare::new(RuleId::FemalesTwoThirds, Share::new(2, 3), count, facts)
    }
}

fn husband(facts: &CaseFacts) -> Option<ClassShare> {
    let share = if facts.has_descendants() {
        Share::new(1, 4)
    } else {
        Share::new(1, 2)
    };
    Some(ClassShare::new(
        RuleId::Spouse,
        share,
        1,
        vec![descendant_fact(facts)],
    ))
}

fn wife(facts: &CaseFacts) -> Option<ClassShare> {
    let share = if facts.has_descendants() {
        Share::new(1, 8)
    } else {
        Share::new(1, 4)
    };
    let wives = facts.count(R::Wife);
    Some(ClassShare::new(
        RuleId::Spouse,
        share,
        wives,
        vec![
            descendant_fact(facts),
            Fact::Count {
                relationship: R::Wife,
                count: wives,
            },
        ],
    ))
}

fn mother(facts: &CaseFacts) -> Option<ClassShare> {
    let siblings = facts.siblings();
    if facts.has_descendants() || siblings >= 2 {
        return Some(ClassShare::new(
            RuleId::Mother,
            Share::new(1, 6),
            1,
            vec![descendant_fact(facts), Fact::Siblings { count: siblings }],
        ));
    }

    if let Some(spouse) = facts.spouse()
        && facts.has(R::Father)
    {
        let spouse_share = if spouse == R::Husband {
            Share::new(1, 2)
        } else {
            Share::new(1, 4)
        };
        return Some(ClassShare::new(
            RuleId::MotherThirdOfRemainder,
            (Share::ONE - spouse_share) * Share::new(1, 3),
            1,
            vec![
                Fact::NoDescendants,
                Fact::Siblings { count: siblings },
                Fact::Spouse {
                    relationship: spouse,
                },
                Fact::FatherPresent,
            ],
        ));
    }

    Some(ClassShare::new(
        RuleId::Mother,
        Share::new(1, 3),
        1,
        vec![Fact::NoDescendants, Fact::Siblings { count: siblings }],
    ))
}

/// Father, or the paternal grandfather standing in for him.
fn ascendant(facts: &CaseFacts) -> Option<ClassShare> {
    if facts.has_male_descendants() {
        return Some(ClassShare::new(
            RuleId::AscendantSixth,
            Share::new(1, 6),
            1,
            vec![Fact::MaleDescendants],
        ));
    }
    if facts.has_female_descendants() {
        return Some(
            ClassShare::new(
                RuleId::AscendantSixth,
                Share::new(1, 6),
                1,
                vec![Fact::FemaleDescendantsOnly],
            )
            .with_residue(),
        );
    }
    None
}

fn grandmother(facts: &CaseFacts) -> Option<ClassShare> {
    let grandmothers = facts.grandmothers();
    Some(ClassShare::new(
        RuleId::GrandmotherSixth,
        Share::new(1, 6),
        grandmothers,
        vec![
            Fact::Count {
                relationship: R::PaternalGrandmother,
                count: facts.count(R::PaternalGrandmother),
            },
            Fact::Count {
                relationship: R::MaternalGrandmother,
                count: facts.count(R::MaternalGrandmother),
            },
        ],
    ))
}

fn daughter(facts: &CaseFacts) -> Option<ClassShare> {
    if facts.has(R::Son) {
        return None;
    }
    Some(female_quota(facts.count(R::Daughter), Vec::new(), R::Daughter))
}

fn sons_daughter(facts: &CaseFacts) -> Option<ClassShare> {
    if facts.has(R::SonsSon) {
        return None;
    }
    let daughters = facts.count(R::Daughter);
    let count = facts.count(R::SonsDaughter);
    let daughters_fact = Fact::Count {
        relationship: R::Daughter,
        count: daughters,
    };
    match daughters {
        0 => Some(female_quota(count, vec![daughters_fact], R::SonsDaughter)),
        1 => Some(ClassShare::new(
            RuleId::ComplementSixth,
            Share::new(1, 6),
            count,
            vec![daughters_fact],
        )),
        _ => Some(ClassShare::excluded(
            RuleId::ExcludedByFemaleQuota,
            vec![daughters_fact],
        )),
    }
}

fn full_sister(facts: &CaseFacts) -> Option<ClassShare> {
    if facts.full_sisters_are_residuary() {
        return None;
    }
    Some(female_quota(
        facts.count(R::FullSister),
        vec![Fact::NoDescendants],
        R::FullSister,
    ))
}

fn paternal_half_sister(facts: &CaseFacts) -> Option<ClassShare> {
    if facts.has(R::PaternalHalfBrother) {
        return None;
    }
    let full_sisters = facts.count(R::FullSister);
    let full_sisters_fact = Fact::Count {
        relationship: R::FullSister,
        count: full_sisters,
    };
    if facts.full_sisters_are_residuary() {
        return Some(ClassShare::excluded(
            RuleId::ExcludedByResiduarySister,
            vec![full_sisters_fact],
        ));
    }
    if facts.has_female_descendants() {
        // Residuary alongside the female descendants.
        return None;
    }
    let count = facts.count(R::PaternalHalfSister);
    match full_sisters {
        0 => Some(female_quota(
            count,
            vec![Fact::NoDescendants, full_sisters_fact],
            R::PaternalHalfSister,
        )),
        1 => Some(ClassShare::new(
            RuleId::ComplementSixth,
            Share::new(1, 6),
            count,
            vec![full_sisters_fact],
        )),
        _ => Some(ClassShare::excluded(
            RuleId::ExcludedByFemaleQuota,
            vec![full_sisters_fact],
        )),
    }
}

fn maternal_sibling(facts: &CaseFacts) -> Option<ClassShare> {
    let count = facts.maternal_siblings();
    let share = if count == 1 {
        Share::new(1, 6)
    } else {
        Share::new(1, 3)
    };
    Some(ClassShare::new(
        RuleId::MaternalSiblings,
        share,
        count,
        vec![Fact::Siblings { count }],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(relationship: Relationship, facts: &CaseFacts) -> Option<ClassShare> {
        rule_for(relationship).and_then(|rule| rule(facts))
    }

    fn share(relationship: Relationship, counts: &[(Relationship, usize)]) -> Option<Share> {
        let facts = CaseFacts::from_counts(counts.iter().copied());
        class(relationship, &facts).map(|c| c.per_heir())
    }

    #[test]
    fn spouse_shares_halve_with_descendants() {
        assert_eq!(share(R::Husband, &[(R::Husband, 1)]), Some(Share::new(1, 2)));
        assert_eq!(
            share(R::Husband, &[(R::Husband, 1), (R::SonsDaughter, 1)]),
            Some(Share::new(1, 4))
        );
        assert_eq!(share(R::Wife, &[(R::Wife, 1)]), Some(Share::new(1, 4)));
        assert_eq!(
            share(R::Wife, &[(R::Wife, 2), (R::Son, 1)]),
            Some(Share::new(1, 16))
        );
    }

    #[test]
    fn mother_share_depends_on_descendants_and_siblings() {
        assert_eq!(share(R::Mother, &[(R::Mother, 1)]), Some(Share::new(1, 3)));
        assert_eq!(
            share(R::Mother, &[(R::Mother, 1), (R::Daughter, 1)]),
            Some(Share::new(1, 6))
        );
        assert_eq!(
            share(R::Mother, &[(R::Mother, 1), (R::FullSister, 1)]),
            Some(Share::new(1, 3))
        );
        assert_eq!(
            share(
                R::Mother,
                &[(R::Mother, 1), (R::FullSister, 1), (R::MaternalHalfBrother, 1)]
            ),
            Some(Share::new(1, 6))
        );
    }

    #[test]
    fn mother_takes_third_of_remainder_next_to_spouse_and_father() {
        let counts = [(R::Husband, 1), (R::Father, 1), (R::Mother, 1)];
        assert_eq!(share(R::Mother, &counts), Some(Share::new(1, 6)));
        let counts = [(R::Wife, 1), (R::Father, 1), (R::Mother, 1)];
        assert_eq!(share(R::Mother, &counts), Some(Share::new(1, 4)));
        let facts = CaseFacts::from_counts(counts);
        assert_eq!(
            class(R::Mother, &facts).map(|c| c.rule),
            Some(RuleId::MotherThirdOfRemainder)
        );
    }

    #[test]
    fn ascendant_is_fixed_residuary_or_both() {
        let facts = CaseFacts::from_counts([(R::Father, 1), (R::Son, 1)]);
        let father = class(R::Father, &facts).unwrap();
        assert_eq!(father.per_heir(), Share::new(1, 6));
        assert!(!father.residuary_too);

        let facts = CaseFacts::from_counts([(R::Father, 1), (R::Daughter, 1)]);
        let father = class(R::Father, &facts).unwrap();
        assert_eq!(father.per_heir(), Share::new(1, 6));
        assert!(father.residuary_too);

        assert_eq!(share(R::Father, &[(R::Father, 1), (R::Wife, 1)]), None);
    }

    #[test]
    fn grandmothers_share_a_sixth() {
        let counts = [(R::PaternalGrandmother, 1), (R::MaternalGrandmother, 1)];
        assert_eq!(share(R::MaternalGrandmother, &counts), Some(Share::new(1, 12)));
        assert_eq!(
            share(R::MaternalGrandmother, &[(R::MaternalGrandmother, 1)]),
            Some(Share::new(1, 6))
        );
    }

    #[test]
    fn daughters_take_half_or_two_thirds_unless_a_son_exists() {
        assert_eq!(share(R::Daughter, &[(R::Daughter, 1)]), Some(Share::new(1, 2)));
        assert_eq!(share(R::Daughter, &[(R::Daughter, 3)]), Some(Share::new(2, 9)));
        assert_eq!(share(R::Daughter, &[(R::Daughter, 1), (R::Son, 1)]), None);
    }

    #[test]
    fn sons_daughters_follow_the_daughters() {
        assert_eq!(
            share(R::SonsDaughter, &[(R::SonsDaughter, 2)]),
            Some(Share::new(1, 3))
        );
        assert_eq!(
            share(R::SonsDaughter, &[(R::SonsDaughter, 2), (R::Daughter, 1)]),
            Some(Share::new(1, 12))
        );
        let facts = CaseFacts::from_counts([(R::SonsDaughter, 1), (R::Daughter, 2)]);
        let excluded = class(R::SonsDaughter, &facts).unwrap();
        assert!(excluded.is_exclusion());
        assert_eq!(excluded.rule, RuleId::ExcludedByFemaleQuota);
        assert_eq!(
            share(R::SonsDaughter, &[(R::SonsDaughter, 1), (R::SonsSon, 1)]),
            None
        );
    }

    #[test]
    fn full_sisters_are_fixed_only_without_brother_or_daughters() {
        assert_eq!(share(R::FullSister, &[(R::FullSister, 1)]), Some(Share::new(1, 2)));
        assert_eq!(share(R::FullSister, &[(R::FullSister, 2)]), Some(Share::new(1, 3)));
        assert_eq!(
            share(R::FullSister, &[(R::FullSister, 1), (R::FullBrother, 1)]),
            None
        );
        assert_eq!(
            share(R::FullSister, &[(R::FullSister, 1), (R::Daughter, 1)]),
            None
        );
    }

    #[test]
    fn paternal_half_sisters_complement_or_yield_to_full_sisters() {
        assert_eq!(
            share(R::PaternalHalfSister, &[(R::PaternalHalfSister, 1)]),
            Some(Share::new(1, 2))
        );
        assert_eq!(
            share(
                R::PaternalHalfSister,
                &[(R::PaternalHalfSister, 1), (R::FullSister, 1)]
            ),
            Some(Share::new(1, 6))
        );

        let facts = CaseFacts::from_counts([(R::PaternalHalfSister, 1), (R::FullSister, 2)]);
        assert_eq!(
            class(R::PaternalHalfSister, &facts).map(|c| c.rule),
            Some(RuleId::ExcludedByFemaleQuota)
        );

        let facts = CaseFacts::from_counts([
            (R::PaternalHalfSister, 1),
            (R::FullSister, 1),
            (R::Daughter, 1),
        ]);
        assert_eq!(
            class(R::PaternalHalfSister, &facts).map(|c| c.rule),
            Some(RuleId::ExcludedByResiduarySister)
        );

        assert_eq!(
            share(
                R::PaternalHalfSister,
                &[(R::PaternalHalfSister, 1), (R::Daughter, 1)]
            ),
            None
        );
        assert_eq!(
            share(
                R::PaternalHalfSister,
                &[(R::PaternalHalfSister, 1), (R::PaternalHalfBrother, 1)]
            ),
            None
        );
    }

    #[test]
    fn maternal_siblings_share_equally_regardless_of_sex() {
        assert_eq!(
            share(R::MaternalHalfBrother, &[(R::MaternalHalfBrother, 1)]),
            Some(Share::new(1, 6))
        );
        let counts = [(R::MaternalHalfBrother, 1), (R::MaternalHalfSister, 1)];
        assert_eq!(share(R::MaternalHalfBrother, &counts), Some(Share::new(1, 6)));
        assert_eq!(share(R::MaternalHalfSister, &counts), Some(Share::new(1, 6)));
    }

    #[test]
    fn pure_residuaries_have_no_rule() {
        for relationship in [R::Son, R::SonsSon, R::FullBrother, R::FullPaternalUncle] {
            assert!(rule_for(relationship).is_none(), "{relationship}");
        }
    }

    #[test]
    fn assign_splits_class_shares() {
        let heirs = [
            HeirDeclaration::new("d1", R::Daughter),
            HeirDeclaration::new("d2", R::Daughter),
            HeirDeclaration::new("w", R::Wife),
            HeirDeclaration::new("b", R::FullBrother),
        ];
        let refs: Vec<&HeirDeclaration> = heirs.iter().collect();
        let facts = CaseFacts::collect(refs.iter().copied());
        let fixed = assign(&refs, &facts);

        assert_eq!(fixed.len(), 3);
        assert_eq!(fixed[&heirs[0].id].fraction, Share::new(1, 3));
        assert_eq!(fixed[&heirs[1].id].fraction, Share::new(1, 3));
        assert_eq!(fixed[&heirs[2].id].fraction, Share::new(1, 8));
        assert!(!fixed.contains_key(&heirs[3].id));
    }
}
