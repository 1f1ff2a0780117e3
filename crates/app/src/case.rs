//! Case files.
//!
//! A case is a JSON document with the estate value and the declared heirs:
//!
//! ```json
//! {
//!   "estate": "900000",
//!   "currency": "EUR",
//!   "heirs": [
//!     { "name": "Karim", "relationship": "son" },
//!     { "name": "Leila", "relationship": "daughter" }
//!   ]
//! }
//! ```
//!
//! Heir ids are optional and generated when missing. Every relationship tag is
//! checked before the engine runs.
use std::path::Path;

use engine::{Currency, EngineError, HeirDeclaration, Money, Sex};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
struct CaseFile {
    estate: Estate,
    currency: Option<String>,
    #[serde(default)]
    heirs: Vec<HeirEntry>,
}

/// Estates may be written as JSON numbers (`1000`, `1000.5`) or as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Estate {
    Number(serde_json::Number),
    Text(String),
}

impl Estate {
    /// Decimal text handed to [`engine::Engine::parse_estate`].
    ///
    /// Floats print with a trailing `.0` when integral, which would exceed
    /// the minor units of currencies without decimals.
    fn into_text(self) -> String {
        match self {
            Estate::Number(number) => {
                let text = number.to_string();
                if text.contains('.') && !text.contains(['e', 'E']) {
                    text.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    text
                }
            }
            Estate::Text(text) => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HeirEntry {
    id: Option<Uuid>,
    name: String,
    relationship: String,
    sex: Option<Sex>,
}

/// A parsed case, ready for the engine.
#[derive(Debug)]
pub struct Case {
    pub currency: Currency,
    pub estate_input: String,
    pub heirs: Vec<HeirDeclaration>,
}

impl Case {
    /// Reads and parses a case file.
    pub fn load(path: &Path, default_currency: Currency) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw, default_currency).map_err(|err| match err {
            AppError::Engine(source) => AppError::Case {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn parse(raw: &str, default_currency: Currency) -> Result<Self> {
        let file: CaseFile = serde_json::from_str(raw)?;

        let currency = match file.currency.as_deref() {
            Some(code) => Currency::try_from(code)?,
            None => default_currency,
        };

        let heirs = file
            .heirs
            .into_iter()
            .map(|entry| {
                let mut heir = HeirDeclaration::with_tag(entry.name, &entry.relationship)?;
                if let Some(id) = entry.id {
                    heir = heir.id(id);
                }
                if let Some(sex) = entry.sex {
                    heir = heir.sex(sex);
                }
                Ok(heir)
            })
            .collect::<std::result::Result<Vec<_>, EngineError>>()?;

        Ok(Self {
            currency,
            estate_input: file.estate.into_text(),
            heirs,
        })
    }

    /// Estate value in the case currency.
    pub fn estate(&self, engine: &engine::Engine) -> Result<Money> {
        Ok(engine.parse_estate(&self.estate_input)?)
    }
}

#[cfg(test)]
mod tests {
    use engine::Relationship;

    use super::*;

    #[test]
    fn parses_heirs_and_currency() {
        let case = Case::parse(
            r#"{
                "estate": "1000,50",
                "currency": "usd",
                "heirs": [
                    { "name": "Karim", "relationship": "Son" },
                    { "name": "Leila", "relationship": "daughter", "sex": "female" }
                ]
            }"#,
            Currency::Eur,
        )
        .unwrap();

        assert_eq!(case.currency, Currency::Usd);
        assert_eq!(case.estate_input, "1000,50");
        assert_eq!(case.heirs.len(), 2);
        assert_eq!(case.heirs[0].relationship, Relationship::Son);
        assert_eq!(case.heirs[1].sex, Some(Sex::Female));
    }

    #[test]
    fn numeric_estate_and_default_currency() {
        let case = Case::parse(r#"{ "estate": 500, "heirs": [] }"#, Currency::Sar).unwrap();
        assert_eq!(case.currency, Currency::Sar);
        assert_eq!(case.estate_input, "500");
        assert!(case.heirs.is_empty());
    }

    #[test]
    fn decimal_estates_keep_their_digits() {
        let case = Case::parse(r#"{ "estate": 1000.5, "heirs": [] }"#, Currency::Eur).unwrap();
        assert_eq!(case.estate_input, "1000.5");
        let engine = engine::Engine::builder().currency(Currency::Eur).build();
        assert_eq!(case.estate(&engine).unwrap().minor(), 100_050);

        let case = Case::parse(r#"{ "estate": 1500.0, "heirs": [] }"#, Currency::Jpy).unwrap();
        assert_eq!(case.estate_input, "1500");
        let engine = engine::Engine::builder().currency(Currency::Jpy).build();
        assert_eq!(case.estate(&engine).unwrap().minor(), 1500);
    }

    #[test]
    fn unsupported_currency_is_a_currency_error() {
        let err = Case::parse(r#"{ "estate": 100, "currency": "BTC" }"#, Currency::Eur).unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::InvalidCurrency(_))));
    }

    #[test]
    fn unknown_relationship_fails_the_whole_case() {
        let err = Case::parse(
            r#"{ "estate": 100, "heirs": [
                { "name": "a", "relationship": "son" },
                { "name": "b", "relationship": "neighbour" }
            ] }"#,
            Currency::Eur,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::Engine(EngineError::UnknownRelationship(tag)) if tag == "neighbour"
        ));
    }

    #[test]
    fn keeps_declared_ids() {
        let id = Uuid::new_v4();
        let case = Case::parse(
            &format!(
                r#"{{ "estate": 100, "heirs": [{{ "id": "{id}", "name": "a", "relationship": "wife" }}] }}"#
            ),
            Currency::Eur,
        )
        .unwrap();
        assert_eq!(case.heirs[0].id, id);
    }
}
