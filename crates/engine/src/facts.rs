//! Case facts: counts and presence flags of the non-blocked heirs.
//!
//! Facts are computed once per run, before any share is assigned, so no rule
//! can depend on the order in which heirs are evaluated.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::{HeirDeclaration, Relationship};

use Relationship as R;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CaseFacts {
    counts: BTreeMap<Relationship, usize>,
}

impl CaseFacts {
    /// Collects facts from the heirs that survived blocking.
    pub fn collect<'a>(heirs: impl IntoIterator<Item = &'a HeirDeclaration>) -> Self {
        let mut counts = BTreeMap::new();
        for heir in heirs {
            *counts.entry(heir.relationship).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Builds facts straight from relationship counts.
    pub fn from_counts(counts: impl IntoIterator<Item = (Relationship, usize)>) -> Self {
        Self {
            counts: counts.into_iter().filter(|(_, n)| *n > 0).collect(),
        }
    }

    #[must_use]
    pub fn count(&self, relationship: Relationship) -> usize {
        self.counts.get(&relationship).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has(&self, relationship: Relationship) -> bool {
        self.count(relationship) > 0
    }

    fn sum(&self, relationships: &[Relationship]) -> usize {
        relationships.iter().map(|r| self.count(*r)).sum()
    }

    #[must_use]
    pub fn male_descendants(&self) -> usize {
        self.sum(&[R::Son, R::SonsSon])
    }

    #[must_use]
    pub fn female_descendants(&self) -> usize {
        self.sum(&[R::Daughter, R::SonsDaughter])
    }

    #[must_use]
    pub fn has_descendants(&self) -> bool {
        self.male_descendants() + self.female_descendants() > 0
    }

    #[must_use]
    pub fn has_male_descendants(&self) -> bool {
        self.male_descendants() > 0
    }

    #[must_use]
    pub fn has_female_descendants(&self) -> bool {
        self.female_descendants() > 0
    }

    /// Siblings of any kind: full, paternal half and maternal half.
    #[must_use]
    pub fn siblings(&self) -> usize {
        self.sum(&[
            R::FullBrother,
            R::FullSister,
            R::PaternalHalfBrother,
            R::PaternalHalfSister,
            R::MaternalHalfBrother,
            R::MaternalHalfSister,
        ])
    }

    #[must_use]
    pub fn maternal_siblings(&self) -> usize {
        self.sum(&[R::MaternalHalfBrother, R::MaternalHalfSister])
    }

    #[must_use]
    pub fn grandmothers(&self) -> usize {
        self.sum(&[R::PaternalGrandmother, R::MaternalGrandmother])
    }

    /// The surviving spouse relationship, if any.
    #[must_use]
    pub fn spouse(&self) -> Option<Relationship> {
        [R::Husband, R::Wife].into_iter().find(|r| self.has(*r))
    }

    /// Full sisters inherit as residuaries, with a full brother or alongside
    /// female descendants.
    #[must_use]
    pub fn full_sisters_are_residuary(&self) -> bool {
        self.has(R::FullSister) && (self.has(R::FullBrother) || self.has_female_descendants())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_group_by_relationship() {
        let heirs = [
            HeirDeclaration::new("a", R::Daughter),
            HeirDeclaration::new("b", R::Daughter),
            HeirDeclaration::new("c", R::Mother),
        ];
        let facts = CaseFacts::collect(&heirs);
        assert_eq!(facts.count(R::Daughter), 2);
        assert_eq!(facts.count(R::Son), 0);
        assert!(facts.has_descendants());
        assert!(!facts.has_male_descendants());
        assert_eq!(facts.count(R::Mother), 1);
    }

    #[test]
    fn sibling_and_spouse_facts() {
        let facts = CaseFacts::from_counts([
            (R::Wife, 2),
            (R::FullSister, 1),
            (R::MaternalHalfBrother, 2),
            (R::PaternalHalfSister, 0),
        ]);
        assert_eq!(facts.siblings(), 3);
        assert_eq!(facts.maternal_siblings(), 2);
        assert_eq!(facts.spouse(), Some(R::Wife));
        assert!(!facts.full_sisters_are_residuary());
        assert!(!facts.has(R::PaternalHalfSister));
    }

    #[test]
    fn full_sisters_become_residuary_with_daughters() {
        let facts = CaseFacts::from_counts([(R::FullSister, 2), (R::SonsDaughter, 1)]);
        assert!(facts.full_sisters_are_residuary());
    }
}
