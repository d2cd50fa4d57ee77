//! Vertical card display for income records and tax attribution.
//!
//! Renders the aggregated record grouped by income category, then the
//! attribution sections with their citations, then the bottom line.

use taxlens_core::money::{percent, usd};
use taxlens_core::{
    CanonicalIncomeRecord, ComputedTaxResult, IncomeField, ParsedDocument, Section, StateCode,
    display_name,
};

// ── Record groupings ──

const WAGES: &[IncomeField] = &[
    IncomeField::W2Wages,
    IncomeField::W2SocialSecurityWages,
    IncomeField::W2MedicareWages,
];

const INVESTMENT: &[IncomeField] = &[
    IncomeField::InterestIncome,
    IncomeField::OrdinaryDividends,
    IncomeField::QualifiedDividends,
    IncomeField::CapitalGainDistributions,
    IncomeField::ShortTermGains,
    IncomeField::LongTermGains,
];

const SELF_EMPLOYMENT: &[IncomeField] = &[IncomeField::SelfEmploymentIncome];

const WITHHOLDING: &[IncomeField] = &[
    IncomeField::W2FederalWithheld,
    IncomeField::W2StateWithheld,
    IncomeField::W2MedicareTax,
    IncomeField::W2Casdi,
    IncomeField::InterestFederalWithheld,
    IncomeField::DividendFederalWithheld,
    IncomeField::SelfEmploymentFederalWithheld,
    IncomeField::EstimatedTaxPayments,
    IncomeField::OtherWithholding,
];

const ADJUSTMENTS: &[IncomeField] = &[
    IncomeField::ItemizedDeductions,
    IncomeField::ForeignIncome,
];

// ── Public API ──

/// List the documents that fed the record, by sanitised institution name.
pub fn print_documents(docs: &[ParsedDocument]) {
    println!("Documents");
    for (i, doc) in docs.iter().enumerate() {
        println!(
            "  {:>2}. {:<32} {:<10} {}",
            i + 1,
            display_name(doc),
            doc.form_type.as_str(),
            doc.parse_confidence.as_str()
        );
    }
    println!();
}

/// Print the aggregated record as a card grouped by category.
pub fn print_record_card(record: &CanonicalIncomeRecord) {
    println!(
        "=== Tax year {} · {} · {} ===",
        record.tax_year,
        record.filing_status,
        record.state.name()
    );
    println!();

    print_group(record, "Wages", WAGES);
    print_group(record, "Interest & Investments", INVESTMENT);
    print_group(record, "Self-Employment", SELF_EMPLOYMENT);
    print_group(record, "Withholding & Payments", WITHHOLDING);
    print_group(record, "Adjustments", ADJUSTMENTS);
}

/// Print attribution sections, largest entries first within each.
pub fn print_sections(sections: &[Section]) {
    if sections.is_empty() {
        println!("No attributable taxes or deductions.");
        println!();
        return;
    }
    for section in sections {
        println!("{}", section.title);
        for entry in &section.entries {
            println!("{}", entry_line(&entry.name, entry.amount));
            println!("      {}", entry.citation);
            println!("      {}", entry.description);
        }
        println!("  {:<34} {:>14}", "Total", usd(section.total()));
        println!();
    }
}

/// Print headline figures and the owed/refund split.
pub fn print_summary(result: &ComputedTaxResult, state: StateCode) {
    println!("Summary");
    println!("  {:<34} {:>14}", "Gross income", usd(result.gross_income));
    if let Some(f) = &result.federal {
        println!("  {:<34} {:>14}", "Federal tax", usd(f.total_federal_tax));
        println!(
            "  {:<34} {:>14}",
            "Federal effective / marginal",
            format!("{} / {}", percent(f.effective_rate), percent(f.marginal_rate))
        );
    }
    if let Some(s) = &result.california {
        println!(
            "  {:<34} {:>14}",
            format!("{} tax", state.name()),
            usd(s.total_california_tax)
        );
    }
    println!("  {:<34} {:>14}", "Total withheld", usd(result.total_withheld));
    println!();

    let line = result.bottom_line();
    if let Some(federal) = line.federal {
        println!("{}", balance_line("Federal", federal));
    }
    if let Some(st) = line.state {
        println!("{}", balance_line(state.name(), st));
    }
    println!("{}", balance_line("Total", line.total));
}

// ── Helpers ──

fn print_group(record: &CanonicalIncomeRecord, header: &str, fields: &[IncomeField]) {
    if fields.iter().all(|&f| record.get(f) == 0.0) {
        return;
    }
    println!("{header}");
    for &field in fields {
        let amount = record.get(field);
        if amount == 0.0 {
            continue;
        }
        println!("  {:<34} {:>14}", field.label(), usd(amount));
    }
    println!();
}

fn entry_line(name: &str, amount: f64) -> String {
    format!("  {:<34} {:>14}", name, usd(amount))
}

fn balance_line(label: &str, amount: f64) -> String {
    let verdict = if amount < 0.0 { "refund" } else { "owed" };
    format!("  {:<34} {:>14} {verdict}", label, usd(amount.abs()))
}
