//! Blocking resolver.
//!
//! An heir is blocked when any relationship of its `blocked_by` set is
//! declared in the same case. Blocked heirs take no further part in the
//! allocation: no fixed share, no residue, and they do not count in the
//! presence tests of other heirs.
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{HeirDeclaration, Relationship, relationship};

/// Blocking outcome of one heir.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStatus {
    pub blocked: bool,
    /// First present blocker in registry order. Informational only.
    pub blocked_by: Option<Relationship>,
}

impl BlockStatus {
    const FREE: BlockStatus = BlockStatus {
        blocked: false,
        blocked_by: None,
    };

    fn by(blocker: Relationship) -> Self {
        Self {
            blocked: true,
            blocked_by: Some(blocker),
        }
    }
}

pub type BlockingMap = HashMap<Uuid, BlockStatus>;

/// Resolves blocking for every declaration of a case.
#[must_use]
pub fn resolve(declarations: &[HeirDeclaration]) -> BlockingMap {
    let present: BTreeSet<Relationship> =
        declarations.iter().map(|heir| heir.relationship).collect();

    declarations
        .iter()
        .map(|heir| {
            let blocked_by = heir.relationship.blocked_by();
            let status = relationship::rules()
                .iter()
                .map(|rule| rule.relationship)
                .find(|candidate| blocked_by.contains(candidate) && present.contains(candidate))
                .map_or(BlockStatus::FREE, BlockStatus::by);
            if status.blocked {
                tracing::debug!(
                    heir = %heir.id,
                    relationship = %heir.relationship,
                    blocked_by = ?status.blocked_by,
                    "heir blocked"
                );
            }
            (heir.id, status)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Relationship as R;

    fn heirs(relationships: &[Relationship]) -> Vec<HeirDeclaration> {
        relationships
            .iter()
            .enumerate()
            .map(|(i, r)| HeirDeclaration::new(format!("heir {i}"), *r))
            .collect()
    }

    #[test]
    fn son_blocks_grandchildren_and_siblings() {
        let case = heirs(&[R::Son, R::SonsSon, R::SonsDaughter, R::FullBrother, R::Wife]);
        let map = resolve(&case);

        assert!(!map[&case[0].id].blocked);
        for heir in &case[1..4] {
            assert_eq!(map[&heir.id], BlockStatus::by(R::Son));
        }
        assert!(!map[&case[4].id].blocked);
    }

    #[test]
    fn reported_blocker_follows_registry_order() {
        // Father comes before son in the registry.
        let case = heirs(&[R::Son, R::Father, R::FullSister]);
        let map = resolve(&case);
        assert_eq!(map[&case[2].id].blocked_by, Some(R::Father));
    }

    #[test]
    fn daughter_blocks_maternal_siblings_only() {
        let case = heirs(&[R::Daughter, R::MaternalHalfSister, R::FullSister]);
        let map = resolve(&case);
        assert_eq!(map[&case[1].id].blocked_by, Some(R::Daughter));
        assert!(!map[&case[2].id].blocked);
    }

    #[test]
    fn duplicated_relationships_do_not_block_each_other() {
        let case = heirs(&[R::FullBrother, R::FullBrother, R::FullBrothersSon]);
        let map = resolve(&case);
        assert!(!map[&case[0].id].blocked);
        assert!(!map[&case[1].id].blocked);
        assert_eq!(map[&case[2].id].blocked_by, Some(R::FullBrother));
    }

    #[test]
    fn empty_case_resolves_to_empty_map() {
        assert!(resolve(&[]).is_empty());
    }
}
