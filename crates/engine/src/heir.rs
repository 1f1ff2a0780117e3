use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Relationship, ResultEngine, Sex};

/// An heir of a case, as declared by the caller.
///
/// Declarations are immutable for the duration of one allocation run. The
/// `sex` is optional: when missing it is derived from the relationship, when
/// present it must agree with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeirDeclaration {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
}

impl HeirDeclaration {
    /// Creates a declaration with a fresh random id.
    #[must_use]
    pub fn new(name: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            relationship,
            sex: None,
        }
    }

    /// Creates a declaration from a free-text relationship tag.
    ///
    /// Fails with [`EngineError::UnknownRelationship`] when the tag is not in
    /// the registry.
    ///
    /// [`EngineError::UnknownRelationship`]: crate::EngineError::UnknownRelationship
    pub fn with_tag(name: impl Into<String>, tag: &str) -> ResultEngine<Self> {
        Ok(Self::new(name, tag.parse()?))
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    /// The declared sex, or the one implied by the relationship.
    #[must_use]
    pub fn effective_sex(&self) -> Sex {
        self.sex.unwrap_or_else(|| self.relationship.sex())
    }
}

/// Relationships a case can hold at most once.
const SINGLE: &[Relationship] = &[
    Relationship::Husband,
    Relationship::Father,
    Relationship::Mother,
    Relationship::PaternalGrandfather,
    Relationship::PaternalGrandmother,
    Relationship::MaternalGrandmother,
];

/// Maximum number of surviving wives.
pub const MAX_WIVES: usize = 4;

/// Rejects declarations that cannot describe a real family.
pub(crate) fn validate(heirs: &[HeirDeclaration]) -> ResultEngine<()> {
    let mut ids = HashSet::new();
    let mut counts: HashMap<Relationship, usize> = HashMap::new();

    for heir in heirs {
        if !ids.insert(heir.id) {
            return Err(EngineError::InvalidHeirSet(format!(
                "duplicated heir id {}",
                heir.id
            )));
        }
        if let Some(sex) = heir.sex
            && sex != heir.relationship.sex()
        {
            return Err(EngineError::InvalidHeirSet(format!(
                "heir '{}' is declared {sex:?} but a {} is {:?}",
                heir.name,
                heir.relationship,
                heir.relationship.sex()
            )));
        }
        *counts.entry(heir.relationship).or_insert(0) += 1;
    }

    let count = |relationship: Relationship| counts.get(&relationship).copied().unwrap_or(0);
    if let Some(relationship) = SINGLE.iter().find(|r| count(**r) > 1) {
        return Err(EngineError::InvalidHeirSet(format!(
            "more than one {relationship}"
        )));
    }
    if count(Relationship::Wife) > MAX_WIVES {
        return Err(EngineError::InvalidHeirSet(format!(
            "more than {MAX_WIVES} wives"
        )));
    }
    if count(Relationship::Husband) > 0 && count(Relationship::Wife) > 0 {
        return Err(EngineError::InvalidHeirSet(
            "a husband and a wife cannot both survive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_defaults_to_the_relationship() {
        let heir = HeirDeclaration::new("Amina", Relationship::Daughter);
        assert_eq!(heir.effective_sex(), Sex::Female);
        let heir = heir.sex(Sex::Male);
        assert_eq!(heir.effective_sex(), Sex::Male);
    }

    #[test]
    fn with_tag_rejects_unknown_relationships() {
        assert_eq!(
            HeirDeclaration::with_tag("Bob", "godfather"),
            Err(EngineError::UnknownRelationship("godfather".to_string()))
        );
        let heir = HeirDeclaration::with_tag("Bob", "Full Brother").unwrap();
        assert_eq!(heir.relationship, Relationship::FullBrother);
    }

    #[test]
    fn deserializes_with_generated_id() {
        let heir: HeirDeclaration =
            serde_json::from_str(r#"{"name":"Omar","relationship":"Son's son"}"#).unwrap();
        assert_eq!(heir.relationship, Relationship::SonsSon);
        assert_eq!(heir.sex, None);

        let err = serde_json::from_str::<HeirDeclaration>(
            r#"{"name":"Omar","relationship":"godson"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn validate_rejects_impossible_families() {
        let husband_and_wife = [
            HeirDeclaration::new("h", Relationship::Husband),
            HeirDeclaration::new("w", Relationship::Wife),
        ];
        assert!(matches!(
            validate(&husband_and_wife),
            Err(EngineError::InvalidHeirSet(_))
        ));

        let two_mothers = [
            HeirDeclaration::new("m1", Relationship::Mother),
            HeirDeclaration::new("m2", Relationship::Mother),
        ];
        assert_eq!(
            validate(&two_mothers),
            Err(EngineError::InvalidHeirSet("more than one mother".to_string()))
        );

        let wives: Vec<_> = (0..5)
            .map(|i| HeirDeclaration::new(format!("w{i}"), Relationship::Wife))
            .collect();
        assert!(validate(&wives).is_err());
        assert!(validate(&wives[..4]).is_ok());
    }

    #[test]
    fn validate_rejects_duplicated_ids_and_wrong_sex() {
        let son = HeirDeclaration::new("s", Relationship::Son);
        let twin = HeirDeclaration::new("t", Relationship::Son).id(son.id);
        assert!(validate(&[son.clone(), twin]).is_err());

        let wrong = HeirDeclaration::new("s", Relationship::Son).sex(Sex::Female);
        assert!(validate(&[wrong]).is_err());
        assert!(validate(&[son.sex(Sex::Male)]).is_ok());
    }
}
