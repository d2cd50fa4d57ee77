//! Canonical income record and the document aggregator.
//!
//! Every numeric field of [`CanonicalIncomeRecord`] has a fixed, ordered list
//! of source keys ([`IncomeField::candidate_keys`]). Aggregation walks each
//! document once per field and adds the first candidate that carries a numeric
//! value. Form type is never consulted: a document contributes to whichever
//! fields it happens to have keys for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::ParsedDocument;
use crate::error::InputError;
use crate::state::StateCode;

/// Year used when the caller has not picked one.
pub const DEFAULT_TAX_YEAR: i32 = 2024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    #[default]
    Single,
    Joint,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Joint => "joint",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "joint" | "married_joint" | "mfj" => Ok(Self::Joint),
            _ => Err(InputError::FilingStatus(s.to_string())),
        }
    }
}

/// Numeric fields of the canonical income record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncomeField {
    W2Wages,
    W2FederalWithheld,
    W2StateWithheld,
    W2SocialSecurityWages,
    W2MedicareWages,
    W2MedicareTax,
    W2Casdi,
    InterestIncome,
    InterestFederalWithheld,
    OrdinaryDividends,
    QualifiedDividends,
    CapitalGainDistributions,
    DividendFederalWithheld,
    ShortTermGains,
    LongTermGains,
    SelfEmploymentIncome,
    SelfEmploymentFederalWithheld,
    EstimatedTaxPayments,
    OtherWithholding,
    ItemizedDeductions,
    ForeignIncome,
}

impl IncomeField {
    pub const ALL: [IncomeField; 21] = [
        Self::W2Wages,
        Self::W2FederalWithheld,
        Self::W2StateWithheld,
        Self::W2SocialSecurityWages,
        Self::W2MedicareWages,
        Self::W2MedicareTax,
        Self::W2Casdi,
        Self::InterestIncome,
        Self::InterestFederalWithheld,
        Self::OrdinaryDividends,
        Self::QualifiedDividends,
        Self::CapitalGainDistributions,
        Self::DividendFederalWithheld,
        Self::ShortTermGains,
        Self::LongTermGains,
        Self::SelfEmploymentIncome,
        Self::SelfEmploymentFederalWithheld,
        Self::EstimatedTaxPayments,
        Self::OtherWithholding,
        Self::ItemizedDeductions,
        Self::ForeignIncome,
    ];

    /// Wire name, identical to the request payload key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::W2Wages => "w2_wages",
            Self::W2FederalWithheld => "w2_federal_withheld",
            Self::W2StateWithheld => "w2_state_withheld",
            Self::W2SocialSecurityWages => "w2_social_security_wages",
            Self::W2MedicareWages => "w2_medicare_wages",
            Self::W2MedicareTax => "w2_medicare_tax",
            Self::W2Casdi => "w2_casdi",
            Self::InterestIncome => "interest_income",
            Self::InterestFederalWithheld => "interest_federal_withheld",
            Self::OrdinaryDividends => "ordinary_dividends",
            Self::QualifiedDividends => "qualified_dividends",
            Self::CapitalGainDistributions => "capital_gain_distributions",
            Self::DividendFederalWithheld => "dividend_federal_withheld",
            Self::ShortTermGains => "short_term_gains",
            Self::LongTermGains => "long_term_gains",
            Self::SelfEmploymentIncome => "self_employment_income",
            Self::SelfEmploymentFederalWithheld => "self_employment_federal_withheld",
            Self::EstimatedTaxPayments => "estimated_tax_payments",
            Self::OtherWithholding => "other_withholding",
            Self::ItemizedDeductions => "itemized_deductions",
            Self::ForeignIncome => "foreign_income",
        }
    }

    /// Human label for review forms.
    pub fn label(&self) -> &'static str {
        match self {
            Self::W2Wages => "Wages (W-2 box 1)",
            Self::W2FederalWithheld => "Federal income tax withheld",
            Self::W2StateWithheld => "State income tax withheld",
            Self::W2SocialSecurityWages => "Social Security wages",
            Self::W2MedicareWages => "Medicare wages",
            Self::W2MedicareTax => "Medicare tax withheld",
            Self::W2Casdi => "CA SDI",
            Self::InterestIncome => "Interest income",
            Self::InterestFederalWithheld => "Interest federal withholding",
            Self::OrdinaryDividends => "Ordinary dividends",
            Self::QualifiedDividends => "Qualified dividends",
            Self::CapitalGainDistributions => "Capital gain distributions",
            Self::DividendFederalWithheld => "Dividend federal withholding",
            Self::ShortTermGains => "Short-term gains",
            Self::LongTermGains => "Long-term gains",
            Self::SelfEmploymentIncome => "Self-employment income",
            Self::SelfEmploymentFederalWithheld => "Self-employment federal withholding",
            Self::EstimatedTaxPayments => "Estimated tax payments",
            Self::OtherWithholding => "Other withholding",
            Self::ItemizedDeductions => "Itemized deductions",
            Self::ForeignIncome => "Foreign income",
        }
    }

    /// Source keys tried, in order, when resolving this field from a document.
    ///
    /// An empty list marks a manual-entry field that no parser fills.
    pub fn candidate_keys(&self) -> &'static [&'static str] {
        match self {
            Self::W2Wages => &["wages"],
            Self::W2FederalWithheld => &["federal_tax_withheld", "federal_withheld"],
            Self::W2StateWithheld => &["state_tax_withheld"],
            Self::W2SocialSecurityWages => &["social_security_wages"],
            Self::W2MedicareWages => &["medicare_wages"],
            Self::W2MedicareTax => &["medicare_tax_withheld"],
            Self::W2Casdi => &["casdi"],
            Self::InterestIncome => &["interest_income"],
            Self::InterestFederalWithheld => &["interest_federal_withheld"],
            Self::OrdinaryDividends => &["total_ordinary_dividends", "ordinary_dividends"],
            Self::QualifiedDividends => &["qualified_dividends"],
            Self::CapitalGainDistributions => {
                &["capital_gain_distributions", "total_capital_gain_dist"]
            }
            Self::DividendFederalWithheld => &["dividend_federal_withheld"],
            Self::ShortTermGains => &["short_term_gains"],
            Self::LongTermGains => &["long_term_gains"],
            Self::SelfEmploymentIncome => &["nonemployee_compensation", "self_employment_income"],
            Self::SelfEmploymentFederalWithheld => &["self_employment_federal_withheld"],
            Self::EstimatedTaxPayments => &["estimated_tax_payments"],
            Self::OtherWithholding => &["other_withholding"],
            Self::ItemizedDeductions | Self::ForeignIncome => &[],
        }
    }
}

impl fmt::Display for IncomeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IncomeField {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| InputError::UnknownField(s.to_string()))
    }
}

/// Value of `field` in one document: the first candidate key holding a
/// numeric value, or 0.
pub fn resolve(field: IncomeField, doc: &ParsedDocument) -> f64 {
    field
        .candidate_keys()
        .iter()
        .find_map(|key| doc.get(key).and_then(|v| v.as_amount()))
        .unwrap_or(0.0)
}

/// Coerce free-form amount input the way the review form does: anything that
/// does not start with a number becomes 0.
pub fn parse_amount_input(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while end < bytes.len() {
        match bytes[end] {
            b'+' | b'-' if end == 0 => {}
            b'+' | b'-' if seen_exp && matches!(bytes[end - 1], b'e' | b'E') => {}
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => seen_exp = true,
            _ => break,
        }
        end += 1;
    }

    // Back off a dangling exponent marker or sign ("12e", "12e-").
    let mut candidate = &s[..end];
    while !candidate.is_empty() {
        if let Ok(n) = candidate.parse::<f64>() {
            return if n.is_finite() { n } else { 0.0 };
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    0.0
}

/// Unified income input sent to the tax computation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalIncomeRecord {
    pub w2_wages: f64,
    pub w2_federal_withheld: f64,
    pub w2_state_withheld: f64,
    pub w2_social_security_wages: f64,
    pub w2_medicare_wages: f64,
    pub w2_medicare_tax: f64,
    pub w2_casdi: f64,
    pub interest_income: f64,
    pub interest_federal_withheld: f64,
    pub ordinary_dividends: f64,
    pub qualified_dividends: f64,
    pub capital_gain_distributions: f64,
    pub dividend_federal_withheld: f64,
    pub short_term_gains: f64,
    pub long_term_gains: f64,
    pub self_employment_income: f64,
    pub self_employment_federal_withheld: f64,
    pub estimated_tax_payments: f64,
    pub other_withholding: f64,
    pub itemized_deductions: f64,
    pub foreign_income: f64,
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub state: StateCode,
}

impl Default for CanonicalIncomeRecord {
    fn default() -> Self {
        Self::empty(DEFAULT_TAX_YEAR)
    }
}

impl CanonicalIncomeRecord {
    /// All-zero record for `tax_year`, single filer, default state.
    pub fn empty(tax_year: i32) -> Self {
        Self {
            w2_wages: 0.0,
            w2_federal_withheld: 0.0,
            w2_state_withheld: 0.0,
            w2_social_security_wages: 0.0,
            w2_medicare_wages: 0.0,
            w2_medicare_tax: 0.0,
            w2_casdi: 0.0,
            interest_income: 0.0,
            interest_federal_withheld: 0.0,
            ordinary_dividends: 0.0,
            qualified_dividends: 0.0,
            capital_gain_distributions: 0.0,
            dividend_federal_withheld: 0.0,
            short_term_gains: 0.0,
            long_term_gains: 0.0,
            self_employment_income: 0.0,
            self_employment_federal_withheld: 0.0,
            estimated_tax_payments: 0.0,
            other_withholding: 0.0,
            itemized_deductions: 0.0,
            foreign_income: 0.0,
            tax_year,
            filing_status: FilingStatus::default(),
            state: StateCode::default(),
        }
    }

    pub fn get(&self, field: IncomeField) -> f64 {
        match field {
            IncomeField::W2Wages => self.w2_wages,
            IncomeField::W2FederalWithheld => self.w2_federal_withheld,
            IncomeField::W2StateWithheld => self.w2_state_withheld,
            IncomeField::W2SocialSecurityWages => self.w2_social_security_wages,
            IncomeField::W2MedicareWages => self.w2_medicare_wages,
            IncomeField::W2MedicareTax => self.w2_medicare_tax,
            IncomeField::W2Casdi => self.w2_casdi,
            IncomeField::InterestIncome => self.interest_income,
            IncomeField::InterestFederalWithheld => self.interest_federal_withheld,
            IncomeField::OrdinaryDividends => self.ordinary_dividends,
            IncomeField::QualifiedDividends => self.qualified_dividends,
            IncomeField::CapitalGainDistributions => self.capital_gain_distributions,
            IncomeField::DividendFederalWithheld => self.dividend_federal_withheld,
            IncomeField::ShortTermGains => self.short_term_gains,
            IncomeField::LongTermGains => self.long_term_gains,
            IncomeField::SelfEmploymentIncome => self.self_employment_income,
            IncomeField::SelfEmploymentFederalWithheld => self.self_employment_federal_withheld,
            IncomeField::EstimatedTaxPayments => self.estimated_tax_payments,
            IncomeField::OtherWithholding => self.other_withholding,
            IncomeField::ItemizedDeductions => self.itemized_deductions,
            IncomeField::ForeignIncome => self.foreign_income,
        }
    }

    pub fn get_mut(&mut self, field: IncomeField) -> &mut f64 {
        match field {
            IncomeField::W2Wages => &mut self.w2_wages,
            IncomeField::W2FederalWithheld => &mut self.w2_federal_withheld,
            IncomeField::W2StateWithheld => &mut self.w2_state_withheld,
            IncomeField::W2SocialSecurityWages => &mut self.w2_social_security_wages,
            IncomeField::W2MedicareWages => &mut self.w2_medicare_wages,
            IncomeField::W2MedicareTax => &mut self.w2_medicare_tax,
            IncomeField::W2Casdi => &mut self.w2_casdi,
            IncomeField::InterestIncome => &mut self.interest_income,
            IncomeField::InterestFederalWithheld => &mut self.interest_federal_withheld,
            IncomeField::OrdinaryDividends => &mut self.ordinary_dividends,
            IncomeField::QualifiedDividends => &mut self.qualified_dividends,
            IncomeField::CapitalGainDistributions => &mut self.capital_gain_distributions,
            IncomeField::DividendFederalWithheld => &mut self.dividend_federal_withheld,
            IncomeField::ShortTermGains => &mut self.short_term_gains,
            IncomeField::LongTermGains => &mut self.long_term_gains,
            IncomeField::SelfEmploymentIncome => &mut self.self_employment_income,
            IncomeField::SelfEmploymentFederalWithheld => {
                &mut self.self_employment_federal_withheld
            }
            IncomeField::EstimatedTaxPayments => &mut self.estimated_tax_payments,
            IncomeField::OtherWithholding => &mut self.other_withholding,
            IncomeField::ItemizedDeductions => &mut self.itemized_deductions,
            IncomeField::ForeignIncome => &mut self.foreign_income,
        }
    }
}

/// Fold `documents` into a fresh record for `tax_year`.
///
/// Filing status and state are left at their defaults; the review session
/// carries the caller's selection over after each run.
pub fn aggregate(documents: &[ParsedDocument], tax_year: i32) -> CanonicalIncomeRecord {
    let mut record = CanonicalIncomeRecord::empty(tax_year);

    for doc in documents {
        let mut matched = 0usize;
        for field in IncomeField::ALL {
            let value = resolve(field, doc);
            if value != 0.0 {
                matched += 1;
            }
            *record.get_mut(field) += value;
        }
        debug!(
            filename = %doc.filename,
            form_type = %doc.form_type,
            confidence = doc.parse_confidence.as_str(),
            matched,
            "aggregated document"
        );
    }

    // Finite inputs can still overflow; the payload must stay numeric.
    for field in IncomeField::ALL {
        let total = record.get_mut(field);
        if !total.is_finite() {
            *total = 0.0;
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FormType;

    fn w2(wages: f64, withheld: f64) -> ParsedDocument {
        ParsedDocument::new(FormType::W2, "w2.pdf")
            .with("wages", wages)
            .with("federal_tax_withheld", withheld)
    }

    #[test]
    fn w2_plus_interest_example() {
        let docs = vec![
            w2(50000.0, 5000.0),
            ParsedDocument::new(FormType::Int1099, "int.pdf").with("interest_income", 200.0),
        ];
        let record = aggregate(&docs, 2024);

        let mut expected = CanonicalIncomeRecord::empty(2024);
        expected.w2_wages = 50000.0;
        expected.w2_federal_withheld = 5000.0;
        expected.interest_income = 200.0;
        assert_eq!(record, expected);
    }

    #[test]
    fn empty_list_carries_year_only() {
        let record = aggregate(&[], 2025);
        assert_eq!(record, CanonicalIncomeRecord::empty(2025));
    }

    #[test]
    fn fallback_key_priority() {
        let both = ParsedDocument::new(FormType::Div1099, "div.pdf")
            .with("total_ordinary_dividends", 300.0)
            .with("ordinary_dividends", 999.0);
        assert_eq!(resolve(IncomeField::OrdinaryDividends, &both), 300.0);

        let legacy =
            ParsedDocument::new(FormType::Div1099, "div.pdf").with("ordinary_dividends", 120.0);
        assert_eq!(resolve(IncomeField::OrdinaryDividends, &legacy), 120.0);

        let nec = ParsedDocument::new(FormType::Nec1099, "nec.pdf")
            .with("nonemployee_compensation", 8000.0)
            .with("self_employment_income", 1.0);
        assert_eq!(resolve(IncomeField::SelfEmploymentIncome, &nec), 8000.0);
    }

    #[test]
    fn non_numeric_candidate_falls_through() {
        let doc = ParsedDocument::new(FormType::Nec1099, "nec.pdf")
            .with("nonemployee_compensation", "see attached")
            .with("self_employment_income", 4200.0);
        assert_eq!(resolve(IncomeField::SelfEmploymentIncome, &doc), 4200.0);

        let garbage = ParsedDocument::new(FormType::W2, "w2.pdf").with("wages", "N/A");
        assert_eq!(resolve(IncomeField::W2Wages, &garbage), 0.0);
    }

    #[test]
    fn form_type_is_ignored() {
        // A 1099-INT that also reports withholding feeds the withholding field.
        let doc = ParsedDocument::new(FormType::Int1099, "int.pdf")
            .with("interest_income", 50.0)
            .with("federal_tax_withheld", 12.0);
        let record = aggregate(&[doc], 2024);
        assert_eq!(record.interest_income, 50.0);
        assert_eq!(record.w2_federal_withheld, 12.0);
    }

    #[test]
    fn irrelevant_document_contributes_nothing() {
        let doc = ParsedDocument::new(FormType::Other("1098-T".into()), "tuition.pdf")
            .with("tuition_paid", 9000.0)
            .with("payer_name", "State University");
        assert_eq!(aggregate(&[doc], 2024), CanonicalIncomeRecord::empty(2024));
    }

    #[test]
    fn sums_across_documents() {
        let docs = vec![w2(40000.0, 4000.0), w2(10000.0, 900.0)];
        let record = aggregate(&docs, 2024);
        assert_eq!(record.w2_wages, 50000.0);
        assert_eq!(record.w2_federal_withheld, 4900.0);
    }

    #[test]
    fn overflowing_sum_is_clamped() {
        let docs = vec![w2(1e308, 0.0), w2(1e308, 0.0)];
        let record = aggregate(&docs, 2024);
        assert_eq!(record.w2_wages, 0.0);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["w2_wages"].is_number());
    }

    #[test]
    fn manual_fields_have_no_sources() {
        assert!(IncomeField::ItemizedDeductions.candidate_keys().is_empty());
        let doc = ParsedDocument::new(FormType::W2, "w2.pdf").with("itemized_deductions", 10.0);
        assert_eq!(aggregate(&[doc], 2024).itemized_deductions, 0.0);
    }

    #[test]
    fn field_names_round_trip() {
        for field in IncomeField::ALL {
            assert_eq!(field.name().parse::<IncomeField>().unwrap(), field);
        }
        assert!("w2_tips".parse::<IncomeField>().is_err());
    }

    #[test]
    fn record_serializes_flat() {
        let mut record = CanonicalIncomeRecord::empty(2024);
        record.w2_wages = 1.5;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["w2_wages"], 1.5);
        assert_eq!(json["tax_year"], 2024);
        assert_eq!(json["filing_status"], "single");
        assert_eq!(json["state"], "CA");
        assert_eq!(json["foreign_income"], 0.0);
    }

    #[test]
    fn amount_input_coercion() {
        assert_eq!(parse_amount_input("1234.56"), 1234.56);
        assert_eq!(parse_amount_input("  42abc"), 42.0);
        assert_eq!(parse_amount_input("-7"), -7.0);
        assert_eq!(parse_amount_input("1e3"), 1000.0);
        assert_eq!(parse_amount_input("12e"), 12.0);
        assert_eq!(parse_amount_input(""), 0.0);
        assert_eq!(parse_amount_input("abc"), 0.0);
        assert_eq!(parse_amount_input("."), 0.0);
    }

    #[test]
    fn filing_status_parsing() {
        assert_eq!("Single".parse::<FilingStatus>().unwrap(), FilingStatus::Single);
        assert_eq!("joint".parse::<FilingStatus>().unwrap(), FilingStatus::Joint);
        assert!("head_of_household".parse::<FilingStatus>().is_err());
    }
}
