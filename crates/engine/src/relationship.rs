//! Relationship registry.
//!
//! Every heir relationship the engine recognizes is a [`Relationship`] tag.
//! Each tag has one [`RelationshipRule`] in a static table: the heir's sex,
//! whether it belongs to the primary or the extended family, and the set of
//! relationships whose presence blocks it.
//!
//! The table is a literal, built at compile time and never mutated. Its order
//! is the registry iteration order used to pick the reported blocker.
//!
//! Blocking sets are transitively closed: whenever `a` blocks `b` and `b`
//! blocks `c`, `a` also appears in the set of `c`. A plain presence test over
//! the declared heirs is then enough to decide exclusion.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Biological sex of an heir. Drives the 2:1 residuary weighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Primary relationships are never blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Primary,
    Extended,
}

/// Recognized heir relationships, relative to the deceased.
///
/// "Paternal half" siblings share only the father with the deceased,
/// "maternal half" siblings only the mother.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Relationship {
    Husband,
    Wife,
    Father,
    Mother,
    Son,
    Daughter,
    PaternalGrandfather,
    PaternalGrandmother,
    MaternalGrandmother,
    SonsSon,
    SonsDaughter,
    FullBrother,
    FullSister,
    PaternalHalfBrother,
    PaternalHalfSister,
    MaternalHalfBrother,
    MaternalHalfSister,
    FullBrothersSon,
    PaternalHalfBrothersSon,
    FullPaternalUncle,
    PaternalHalfUncle,
    FullPaternalUnclesSon,
    PaternalHalfUnclesSon,
}

/// Registry entry of a [`Relationship`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RelationshipRule {
    pub relationship: Relationship,
    pub sex: Sex,
    pub category: Category,
    /// Relationships whose presence excludes this one. Empty for primary
    /// relationships.
    pub blocked_by: &'static [Relationship],
}

/// Registry tags split in the two groups used by selection UIs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagGroups {
    pub primary: Vec<Relationship>,
    pub extended: Vec<Relationship>,
}

use Relationship as R;

const FULL_SIBLING_BLOCKERS: &[Relationship] =
    &[R::Son, R::SonsSon, R::Father, R::PaternalGrandfather];
const PATERNAL_SIBLING_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
];
const MATERNAL_SIBLING_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::Daughter,
    R::SonsSon,
    R::SonsDaughter,
    R::Father,
    R::PaternalGrandfather,
];
const FULL_NEPHEW_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
];
const PATERNAL_NEPHEW_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
    R::FullBrothersSon,
];
const FULL_UNCLE_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
    R::FullBrothersSon,
    R::PaternalHalfBrothersSon,
];
const HALF_UNCLE_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
    R::FullBrothersSon,
    R::PaternalHalfBrothersSon,
    R::FullPaternalUncle,
];
const FULL_COUSIN_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
    R::FullBrothersSon,
    R::PaternalHalfBrothersSon,
    R::FullPaternalUncle,
    R::PaternalHalfUncle,
];
const HALF_COUSIN_BLOCKERS: &[Relationship] = &[
    R::Son,
    R::SonsSon,
    R::Father,
    R::PaternalGrandfather,
    R::FullBrother,
    R::PaternalHalfBrother,
    R::FullBrothersSon,
    R::PaternalHalfBrothersSon,
    R::FullPaternalUncle,
    R::PaternalHalfUncle,
    R::FullPaternalUnclesSon,
];

const fn primary(relationship: Relationship, sex: Sex) -> RelationshipRule {
    RelationshipRule {
        relationship,
        sex,
        category: Category::Primary,
        blocked_by: &[],
    }
}

const fn extended(
    relationship: Relationship,
    sex: Sex,
    blocked_by: &'static [Relationship],
) -> RelationshipRule {
    RelationshipRule {
        relationship,
        sex,
        category: Category::Extended,
        blocked_by,
    }
}

/// The registry. Indexed by the `Relationship` discriminant.
static REGISTRY: [RelationshipRule; 23] = [
    primary(R::Husband, Sex::Male),
    primary(R::Wife, Sex::Female),
    primary(R::Father, Sex::Male),
    primary(R::Mother, Sex::Female),
    primary(R::Son, Sex::Male),
    primary(R::Daughter, Sex::Female),
    extended(R::PaternalGrandfather, Sex::Male, &[R::Father]),
    extended(R::PaternalGrandmother, Sex::Female, &[R::Father, R::Mother]),
    extended(R::MaternalGrandmother, Sex::Female, &[R::Mother]),
    extended(R::SonsSon, Sex::Male, &[R::Son]),
    extended(R::SonsDaughter, Sex::Female, &[R::Son]),
    extended(R::FullBrother, Sex::Male, FULL_SIBLING_BLOCKERS),
    extended(R::FullSister, Sex::Female, FULL_SIBLING_BLOCKERS),
    extended(R::PaternalHalfBrother, Sex::Male, PATERNAL_SIBLING_BLOCKERS),
    extended(R::PaternalHalfSister, Sex::Female, PATERNAL_SIBLING_BLOCKERS),
    extended(R::MaternalHalfBrother, Sex::Male, MATERNAL_SIBLING_BLOCKERS),
    extended(R::MaternalHalfSister, Sex::Female, MATERNAL_SIBLING_BLOCKERS),
    extended(R::FullBrothersSon, Sex::Male, FULL_NEPHEW_BLOCKERS),
    extended(R::PaternalHalfBrothersSon, Sex::Male, PATERNAL_NEPHEW_BLOCKERS),
    extended(R::FullPaternalUncle, Sex::Male, FULL_UNCLE_BLOCKERS),
    extended(R::PaternalHalfUncle, Sex::Male, HALF_UNCLE_BLOCKERS),
    extended(R::FullPaternalUnclesSon, Sex::Male, FULL_COUSIN_BLOCKERS),
    extended(R::PaternalHalfUnclesSon, Sex::Male, HALF_COUSIN_BLOCKERS),
];

/// Every registered rule, in registry order.
#[must_use]
pub fn rules() -> &'static [RelationshipRule] {
    &REGISTRY
}

/// Looks a tag up in the registry.
///
/// The tag is matched leniently, see [`Relationship::from_str`].
pub fn lookup(tag: &str) -> ResultEngine<&'static RelationshipRule> {
    tag.parse::<Relationship>().map(Relationship::rule)
}

/// Every registered tag, partitioned into primary and extended relationships.
#[must_use]
pub fn all_tags() -> TagGroups {
    TagGroups {
        primary: primary_tags(),
        extended: extended_tags(),
    }
}

/// Tags of the immediate family, in registry order.
#[must_use]
pub fn primary_tags() -> Vec<Relationship> {
    tags_in(Category::Primary)
}

/// Tags of the extended family, in registry order.
#[must_use]
pub fn extended_tags() -> Vec<Relationship> {
    tags_in(Category::Extended)
}

fn tags_in(category: Category) -> Vec<Relationship> {
    REGISTRY
        .iter()
        .filter(|rule| rule.category == category)
        .map(|rule| rule.relationship)
        .collect()
}

impl Relationship {
    /// Registry entry of this relationship.
    #[must_use]
    pub fn rule(self) -> &'static RelationshipRule {
        &REGISTRY[self as usize]
    }

    #[must_use]
    pub fn sex(self) -> Sex {
        self.rule().sex
    }

    #[must_use]
    pub fn category(self) -> Category {
        self.rule().category
    }

    #[must_use]
    pub fn blocked_by(self) -> &'static [Relationship] {
        self.rule().blocked_by
    }

    #[must_use]
    pub fn is_spouse(self) -> bool {
        matches!(self, R::Husband | R::Wife)
    }

    /// Canonical tag (the serialized form).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            R::Husband => "husband",
            R::Wife => "wife",
            R::Father => "father",
            R::Mother => "mother",
            R::Son => "son",
            R::Daughter => "daughter",
            R::PaternalGrandfather => "paternal_grandfather",
            R::PaternalGrandmother => "paternal_grandmother",
            R::MaternalGrandmother => "maternal_grandmother",
            R::SonsSon => "sons_son",
            R::SonsDaughter => "sons_daughter",
            R::FullBrother => "full_brother",
            R::FullSister => "full_sister",
            R::PaternalHalfBrother => "paternal_half_brother",
            R::PaternalHalfSister => "paternal_half_sister",
            R::MaternalHalfBrother => "maternal_half_brother",
            R::MaternalHalfSister => "maternal_half_sister",
            R::FullBrothersSon => "full_brothers_son",
            R::PaternalHalfBrothersSon => "paternal_half_brothers_son",
            R::FullPaternalUncle => "full_paternal_uncle",
            R::PaternalHalfUncle => "paternal_half_uncle",
            R::FullPaternalUnclesSon => "full_paternal_uncles_son",
            R::PaternalHalfUnclesSon => "paternal_half_uncles_son",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Folds free text into a tag candidate: accents and apostrophes dropped,
/// lowercase, every other separator run collapsed into one `_`.
fn normalize_tag(input: &str) -> String {
    let mut out = String::new();
    let mut pending_separator = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) || matches!(ch, '\'' | '\u{2019}' | '`') {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('_');
            }
            pending_separator = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    out
}

impl FromStr for Relationship {
    type Err = EngineError;

    /// Parses a tag.
    ///
    /// Besides the canonical tags, matching ignores case, accents and
    /// punctuation (`"Son's Son"` is `sons_son`) and accepts a few common
    /// synonyms (`consanguine_brother`, `uterine_sister`, `grandson`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_tag(s);
        if let Some(rule) = REGISTRY
            .iter()
            .find(|rule| rule.relationship.tag() == normalized)
        {
            return Ok(rule.relationship);
        }
        let relationship = match normalized.as_str() {
            "grandfather" => R::PaternalGrandfather,
            "grandson" => R::SonsSon,
            "granddaughter" => R::SonsDaughter,
            "brother" => R::FullBrother,
            "sister" => R::FullSister,
            "consanguine_brother" => R::PaternalHalfBrother,
            "consanguine_sister" => R::PaternalHalfSister,
            "uterine_brother" => R::MaternalHalfBrother,
            "uterine_sister" => R::MaternalHalfSister,
            "nephew" => R::FullBrothersSon,
            "uncle" | "paternal_uncle" => R::FullPaternalUncle,
            "cousin" | "paternal_cousin" => R::FullPaternalUnclesSon,
            _ => return Err(EngineError::UnknownRelationship(s.trim().to_string())),
        };
        Ok(relationship)
    }
}

impl TryFrom<String> for Relationship {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
