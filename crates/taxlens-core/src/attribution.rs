//! Reverse-maps a computed result onto the provisions that produced it.
//!
//! Attribution is driven by [`RULES`], a fixed, ordered table. Each rule has a
//! guard over the result, an entry builder and the section its entries land
//! in. The table is evaluated exactly once per build, top to bottom, so the
//! order of the emitted entries is the order of the table.
//!
//! Deduction entries are *estimates*: the deduction times the marginal rate.
//! They do not reconcile with the bracket entries, which already reflect the
//! deduction through taxable income.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AttributionError;
use crate::money::{percent, usd_whole};
use crate::result::{Bracket, ComputedTaxResult, FederalResult, StateResult};
use crate::state::{StateCode, StateProvision};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Adds to liability; positive amount.
    Tax,
    /// Estimated liability reduction; negative amount.
    Deduction,
}

/// One line of the breakdown: an amount tied to a citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawEntry {
    pub name: String,
    pub citation: String,
    pub description: String,
    pub amount: f64,
    pub kind: EntryKind,
    pub section: String,
}

/// Section an attribution rule files its entries under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    FederalDeductions,
    FederalIncomeTax,
    FederalPayroll,
    StateTaxes,
    StateDeductions,
}

impl SectionKind {
    pub fn title(&self, state: StateCode) -> String {
        match self {
            Self::FederalDeductions => "Federal Deductions".to_string(),
            Self::FederalIncomeTax => "Federal Income Tax".to_string(),
            Self::FederalPayroll => "Federal Payroll & Other Taxes".to_string(),
            Self::StateTaxes => format!("{} Taxes", state.name()),
            Self::StateDeductions => format!("{} Deductions", state.name()),
        }
    }
}

/// Inputs visible to guards and builders.
pub struct RuleContext<'a> {
    pub federal: &'a FederalResult,
    pub state: &'a StateResult,
    pub code: StateCode,
}

/// Entry content before the rule's kind and section are attached.
struct Draft {
    name: String,
    citation: String,
    description: String,
    amount: f64,
}

pub struct Rule {
    pub id: &'static str,
    pub kind: EntryKind,
    pub section: SectionKind,
    guard: fn(&RuleContext<'_>) -> bool,
    build: fn(&RuleContext<'_>) -> Vec<Draft>,
}

pub const RULES: &[Rule] = &[
    Rule {
        id: "federal-standard-deduction",
        kind: EntryKind::Deduction,
        section: SectionKind::FederalDeductions,
        guard: |ctx| ctx.federal.standard_deduction > 0.0,
        build: federal_standard_deduction,
    },
    Rule {
        id: "federal-brackets",
        kind: EntryKind::Tax,
        section: SectionKind::FederalIncomeTax,
        guard: |ctx| !ctx.federal.bracket_breakdown.is_empty(),
        build: federal_brackets,
    },
    Rule {
        id: "capital-gains-tax",
        kind: EntryKind::Tax,
        section: SectionKind::FederalIncomeTax,
        guard: |ctx| positive(ctx.federal.capital_gains_tax).is_some(),
        build: capital_gains_tax,
    },
    Rule {
        id: "self-employment-tax",
        kind: EntryKind::Tax,
        section: SectionKind::FederalPayroll,
        guard: |ctx| positive(ctx.federal.self_employment_tax).is_some(),
        build: self_employment_tax,
    },
    Rule {
        id: "additional-medicare-tax",
        kind: EntryKind::Tax,
        section: SectionKind::FederalPayroll,
        guard: |ctx| positive(ctx.federal.additional_medicare_tax).is_some(),
        build: additional_medicare_tax,
    },
    Rule {
        id: "net-investment-income-tax",
        kind: EntryKind::Tax,
        section: SectionKind::FederalPayroll,
        guard: |ctx| positive(ctx.federal.net_investment_income_tax).is_some(),
        build: net_investment_income_tax,
    },
    Rule {
        id: "state-income-tax",
        kind: EntryKind::Tax,
        section: SectionKind::StateTaxes,
        guard: |ctx| positive(ctx.state.state_tax).is_some(),
        build: state_income_tax,
    },
    Rule {
        id: "state-surcharge",
        kind: EntryKind::Tax,
        section: SectionKind::StateTaxes,
        guard: |ctx| positive(ctx.state.mental_health_surcharge).is_some(),
        build: state_surcharge,
    },
    Rule {
        id: "state-standard-deduction",
        kind: EntryKind::Deduction,
        section: SectionKind::StateDeductions,
        guard: |ctx| ctx.state.standard_deduction > 0.0,
        build: state_standard_deduction,
    },
];

/// Evaluate [`RULES`] against `result` for `state`.
///
/// Fails when either sub-result is missing instead of returning a partial
/// breakdown. Entries with a zero amount are never emitted.
pub fn build_law_entries(
    result: &ComputedTaxResult,
    state: StateCode,
) -> Result<Vec<LawEntry>, AttributionError> {
    let federal = result
        .federal
        .as_ref()
        .ok_or(AttributionError::MissingFederal)?;
    let state_result = result
        .california
        .as_ref()
        .ok_or_else(|| AttributionError::MissingState(state.code().to_string()))?;

    let ctx = RuleContext {
        federal,
        state: state_result,
        code: state,
    };

    let mut entries = Vec::new();
    for rule in RULES {
        if !(rule.guard)(&ctx) {
            continue;
        }
        let section = rule.section.title(state);
        let before = entries.len();
        for draft in (rule.build)(&ctx) {
            if draft.amount == 0.0 || !draft.amount.is_finite() {
                continue;
            }
            entries.push(LawEntry {
                name: draft.name,
                citation: draft.citation,
                description: draft.description,
                amount: draft.amount,
                kind: rule.kind,
                section: section.clone(),
            });
        }
        debug!(rule = rule.id, emitted = entries.len() - before, "attribution rule fired");
    }

    Ok(entries)
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn single(name: &str, citation: &str, description: String, amount: f64) -> Vec<Draft> {
    vec![Draft {
        name: name.to_string(),
        citation: citation.to_string(),
        description,
        amount,
    }]
}

// ── Federal ──

fn federal_standard_deduction(ctx: &RuleContext<'_>) -> Vec<Draft> {
    let f = ctx.federal;
    single(
        "Standard Deduction",
        "26 U.S.C. § 63(c)",
        format!(
            "Estimated savings from the {} standard deduction at a {} marginal rate",
            usd_whole(f.standard_deduction),
            percent(f.marginal_rate)
        ),
        -(f.standard_deduction * f.marginal_rate / 100.0),
    )
}

fn federal_brackets(ctx: &RuleContext<'_>) -> Vec<Draft> {
    ctx.federal
        .bracket_breakdown
        .iter()
        .map(|b| Draft {
            name: format!("{} Bracket", percent(b.rate * 100.0)),
            citation: "26 U.S.C. § 1(j)".to_string(),
            description: bracket_description(b),
            amount: b.tax_in_bracket,
        })
        .collect()
}

fn bracket_description(b: &Bracket) -> String {
    let band = match b.range_end {
        Some(end) if end.is_finite() => {
            format!("from {} to {}", usd_whole(b.range_start), usd_whole(end))
        }
        _ => format!("above {}", usd_whole(b.range_start)),
    };
    format!(
        "{} on {} of taxable income {band}",
        percent(b.rate * 100.0),
        usd_whole(b.income_in_bracket)
    )
}

fn capital_gains_tax(ctx: &RuleContext<'_>) -> Vec<Draft> {
    single(
        "Capital Gains Tax",
        "26 U.S.C. § 1(h)",
        "Preferential rates on long-term capital gains and qualified dividends".to_string(),
        ctx.federal.capital_gains_tax.unwrap_or_default(),
    )
}

fn self_employment_tax(ctx: &RuleContext<'_>) -> Vec<Draft> {
    single(
        "Self-Employment Tax",
        "26 U.S.C. § 1401",
        "Social Security and Medicare tax on net self-employment earnings".to_string(),
        ctx.federal.self_employment_tax.unwrap_or_default(),
    )
}

fn additional_medicare_tax(ctx: &RuleContext<'_>) -> Vec<Draft> {
    single(
        "Additional Medicare Tax",
        "26 U.S.C. § 3101(b)(2)",
        "0.9% on wages above the filing-status threshold".to_string(),
        ctx.federal.additional_medicare_tax.unwrap_or_default(),
    )
}

fn net_investment_income_tax(ctx: &RuleContext<'_>) -> Vec<Draft> {
    single(
        "Net Investment Income Tax",
        "26 U.S.C. § 1411",
        "3.8% on net investment income above the modified AGI threshold".to_string(),
        ctx.federal.net_investment_income_tax.unwrap_or_default(),
    )
}

// ── State ──

fn state_income_tax(ctx: &RuleContext<'_>) -> Vec<Draft> {
    let code = ctx.code;
    single(
        &code.provision_name(StateProvision::IncomeTax),
        &code.citation(StateProvision::IncomeTax),
        format!(
            "Tax on {} of {} taxable income",
            usd_whole(ctx.state.taxable_income),
            code.name()
        ),
        ctx.state.state_tax.unwrap_or_default(),
    )
}

fn state_surcharge(ctx: &RuleContext<'_>) -> Vec<Draft> {
    let code = ctx.code;
    let description = if code.code() == "CA" {
        "Additional 1% on taxable income over $1,000,000".to_string()
    } else {
        format!("{} surcharge on high incomes", code.name())
    };
    single(
        &code.provision_name(StateProvision::Surcharge),
        &code.citation(StateProvision::Surcharge),
        description,
        ctx.state.mental_health_surcharge.unwrap_or_default(),
    )
}

fn state_standard_deduction(ctx: &RuleContext<'_>) -> Vec<Draft> {
    let code = ctx.code;
    let s = ctx.state;
    single(
        &code.provision_name(StateProvision::StandardDeduction),
        &code.citation(StateProvision::StandardDeduction),
        format!(
            "Estimated savings from the {} standard deduction at a {} marginal rate",
            usd_whole(s.standard_deduction),
            percent(s.marginal_rate)
        ),
        -(s.standard_deduction * s.marginal_rate / 100.0),
    )
}
