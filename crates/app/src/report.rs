//! Rendering of allocation results.
//!
//! The engine only emits structured reasons; this module turns them into
//! English text and writes the table, JSON and CSV outputs.
use std::io::Write;

use engine::{
    AllocationResult, Correction, Explanation, Fact, Reason, Relationship, ResiduaryKind, RuleId,
    Share, TagGroups,
};
use serde::Serialize;

use crate::error::Result;

/// English name of a relationship.
pub fn label(relationship: Relationship) -> &'static str {
    use Relationship as R;

    match relationship {
        R::Husband => "husband",
        R::Wife => "wife",
        R::Father => "father",
        R::Mother => "mother",
        R::Son => "son",
        R::Daughter => "daughter",
        R::PaternalGrandfather => "paternal grandfather",
        R::PaternalGrandmother => "paternal grandmother",
        R::MaternalGrandmother => "maternal grandmother",
        R::SonsSon => "son's son",
        R::SonsDaughter => "son's daughter",
        R::FullBrother => "full brother",
        R::FullSister => "full sister",
        R::PaternalHalfBrother => "paternal half brother",
        R::PaternalHalfSister => "paternal half sister",
        R::MaternalHalfBrother => "maternal half brother",
        R::MaternalHalfSister => "maternal half sister",
        R::FullBrothersSon => "full brother's son",
        R::PaternalHalfBrothersSon => "paternal half brother's son",
        R::FullPaternalUncle => "full paternal uncle",
        R::PaternalHalfUncle => "paternal half uncle",
        R::FullPaternalUnclesSon => "full paternal uncle's son",
        R::PaternalHalfUnclesSon => "paternal half uncle's son",
    }
}

fn rule_text(rule: RuleId) -> &'static str {
    match rule {
        RuleId::Spouse => "spouse share",
        RuleId::Mother => "mother's share",
        RuleId::MotherThirdOfRemainder => "mother's third of what the spouse leaves",
        RuleId::AscendantSixth => "ascendant's sixth",
        RuleId::GrandmotherSixth => "grandmothers' sixth",
        RuleId::SingleFemaleHalf => "half for a single heir of her class",
        RuleId::FemalesTwoThirds => "two thirds for two or more heirs of the class",
        RuleId::ComplementSixth => "sixth completing two thirds",
        RuleId::MaternalSiblings => "maternal siblings' share",
        RuleId::ExcludedByFemaleQuota => "two thirds already taken by nearer female heirs",
        RuleId::ExcludedByResiduarySister => "a full sister takes the residue",
    }
}

fn fact_text(fact: &Fact) -> String {
    match fact {
        Fact::NoDescendants => "no descendants".to_string(),
        Fact::Descendants => "descendants present".to_string(),
        Fact::MaleDescendants => "male descendants present".to_string(),
        Fact::FemaleDescendantsOnly => "only female descendants".to_string(),
        Fact::Siblings { count } => match count {
            1 => "1 sibling".to_string(),
            n => format!("{n} siblings"),
        },
        Fact::Count {
            relationship,
            count,
        } => format!("{count} × {}", label(*relationship)),
        Fact::Spouse { relationship } => format!("{} present", label(*relationship)),
        Fact::FatherPresent => "father present".to_string(),
    }
}

fn kind_text(kind: ResiduaryKind) -> &'static str {
    match kind {
        ResiduaryKind::OwnRight => "in own right",
        ResiduaryKind::WithMalePeer => "with a male peer",
        ResiduaryKind::WithFemaleDescendants => "with female descendants",
    }
}

/// English rendering of a single reason.
pub fn describe(reason: &Reason) -> String {
    match reason {
        Reason::Blocked { by } => format!("blocked by the {}", label(*by)),
        Reason::Fixed {
            rule,
            class_share,
            shared_among,
            facts,
        } => {
            let mut text = format!("fixed {class_share}: {}", rule_text(*rule));
            if *shared_among > 1 {
                text.push_str(&format!(", split among {shared_among}"));
            }
            if !facts.is_empty() {
                let facts: Vec<String> = facts.iter().map(fact_text).collect();
                text.push_str(&format!(" ({})", facts.join(", ")));
            }
            text
        }
        Reason::Excluded { rule, .. } => format!("excluded: {}", rule_text(*rule)),
        Reason::Residuary {
            kind,
            weight,
            total_weight,
            residue,
        } => format!(
            "residue {residue}, {weight} of {total_weight} parts ({})",
            kind_text(*kind)
        ),
        Reason::Outranked { by } => format!("residue goes to the nearer {}", label(*by)),
        Reason::ResidueExhausted => "fixed shares leave no residue".to_string(),
        Reason::ExcessCorrection { raw_total, ratio } => {
            format!("scaled by {ratio}, fixed shares summed to {raw_total}")
        }
        Reason::ShortfallCorrection { added } => format!("plus {added} of the surplus"),
    }
}

/// All reasons of a line, joined.
pub fn describe_all(reasons: &[Reason]) -> String {
    if reasons.is_empty() {
        return "no entitlement".to_string();
    }
    reasons.iter().map(describe).collect::<Vec<_>>().join("; ")
}

fn percent(share: Share) -> String {
    format!("{:.2}%", share.to_f64() * 100.0)
}

pub fn write_table(out: &mut impl Write, result: &AllocationResult) -> Result<()> {
    writeln!(out, "Estate: {}", result.estate)?;
    writeln!(out)?;

    let name_width = result
        .lines
        .iter()
        .map(|line| line.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    writeln!(
        out,
        "{:<name_width$}  {:<28}  {:>9}  {:>8}  {:>18}  Basis",
        "Name", "Relationship", "Fraction", "Percent", "Amount"
    )?;
    for line in &result.lines {
        writeln!(
            out,
            "{:<name_width$}  {:<28}  {:>9}  {:>8}  {:>18}  {}",
            line.name,
            label(line.relationship),
            line.fraction.to_string(),
            percent(line.fraction),
            line.amount.to_string(),
            describe_all(line.basis.reasons()),
        )?;
    }
    writeln!(out)?;

    match result.correction {
        Some(Correction::Excess { raw_total, ratio }) => writeln!(
            out,
            "Excess correction: fixed shares summed to {raw_total}, scaled by {ratio}"
        )?,
        Some(Correction::Shortfall { shortfall, ratio }) => writeln!(
            out,
            "Shortfall correction: {shortfall} redistributed, non-spouse shares scaled by {ratio}"
        )?,
        None => {}
    }
    if !result.remaining_fraction.is_zero() {
        writeln!(
            out,
            "Unclaimed: {} ({})",
            result.remaining_amount, result.remaining_fraction
        )?;
    }
    if result.needs_review() {
        writeln!(out, "No heir can inherit: the case needs a manual review.")?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a AllocationResult,
    has_excess_correction: bool,
    has_shortfall_correction: bool,
    excess_ratio: Option<Share>,
    shortfall_ratio: Option<Share>,
    explanations: Vec<Explanation>,
}

pub fn write_json(out: &mut impl Write, result: &AllocationResult) -> Result<()> {
    let report = JsonReport {
        result,
        has_excess_correction: result.has_excess_correction(),
        has_shortfall_correction: result.has_shortfall_correction(),
        excess_ratio: result.excess_ratio(),
        shortfall_ratio: result.shortfall_ratio(),
        explanations: result.explanations(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow {
    heir_id: String,
    name: String,
    relationship: &'static str,
    fraction: String,
    percent: String,
    amount_minor: i64,
    amount: String,
    blocked: bool,
    blocked_by: Option<&'static str>,
    basis: String,
}

pub fn write_csv(out: &mut impl Write, result: &AllocationResult) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for line in &result.lines {
        writer.serialize(CsvRow {
            heir_id: line.heir_id.to_string(),
            name: line.name.clone(),
            relationship: line.relationship.tag(),
            fraction: line.fraction.to_string(),
            percent: percent(line.fraction),
            amount_minor: line.amount.minor(),
            amount: line.amount.to_string(),
            blocked: line.is_blocked,
            blocked_by: line.blocked_by.map(Relationship::tag),
            basis: describe_all(line.basis.reasons()),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_relationships(out: &mut impl Write, groups: &TagGroups) -> Result<()> {
    for (title, tags) in [("Primary", &groups.primary), ("Extended", &groups.extended)] {
        writeln!(out, "{title}:")?;
        for relationship in tags {
            let blocked_by: Vec<&str> = relationship
                .blocked_by()
                .iter()
                .map(|r| r.tag())
                .collect();
            if blocked_by.is_empty() {
                writeln!(out, "  {:<28} {}", relationship.tag(), label(*relationship))?;
            } else {
                writeln!(
                    out,
                    "  {:<28} {} (blocked by {})",
                    relationship.tag(),
                    label(*relationship),
                    blocked_by.join(", ")
                )?;
            }
        }
    }
    Ok(())
}
