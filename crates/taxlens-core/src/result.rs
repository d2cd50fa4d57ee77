//! Result shape returned by the tax computation service.
//!
//! Consumed read-only. Optional components that the service omits or sends as
//! `null` deserialize to `None` and are treated as "not applicable".

use serde::{Deserialize, Serialize};

/// Income and tax attributable to one progressive rate band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(default)]
    pub range_start: f64,
    /// `None` for the open-ended top band.
    #[serde(default)]
    pub range_end: Option<f64>,
    /// Fraction, e.g. `0.22`.
    pub rate: f64,
    #[serde(default)]
    pub income_in_bracket: f64,
    #[serde(default)]
    pub tax_in_bracket: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FederalResult {
    pub gross_income: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub ordinary_income_tax: f64,
    pub capital_gains_tax: Option<f64>,
    pub self_employment_tax: Option<f64>,
    pub additional_medicare_tax: Option<f64>,
    pub net_investment_income_tax: Option<f64>,
    pub total_federal_tax: f64,
    /// Percent.
    pub effective_rate: f64,
    /// Percent.
    pub marginal_rate: f64,
    pub qualified_dividends: f64,
    pub bracket_breakdown: Vec<Bracket>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StateResult {
    pub gross_income: f64,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub state_tax: Option<f64>,
    pub mental_health_surcharge: Option<f64>,
    #[serde(alias = "total_state_tax")]
    pub total_california_tax: f64,
    pub effective_rate: f64,
    pub marginal_rate: f64,
}

/// Full computed result.
///
/// `federal` and `california` are optional only so that a malformed response
/// still deserializes; attribution rejects a result missing either.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedTaxResult {
    pub federal: Option<FederalResult>,
    #[serde(alias = "state")]
    pub california: Option<StateResult>,
    pub gross_income: f64,
    pub total_withheld: f64,
    pub total_federal_withheld: f64,
    pub total_state_withheld: f64,
    pub total_tax_liability: f64,
    /// Positive means owed, negative means refund.
    pub amount_owed: f64,
    pub tax_year: Option<i32>,
}

/// Owed (positive) or refund (negative) split by jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BottomLine {
    pub federal: Option<f64>,
    pub state: Option<f64>,
    pub total: f64,
}

impl BottomLine {
    pub fn is_refund(&self) -> bool {
        self.total < 0.0
    }
}

impl ComputedTaxResult {
    /// Balance due per jurisdiction: tax minus what was already withheld.
    pub fn bottom_line(&self) -> BottomLine {
        BottomLine {
            federal: self
                .federal
                .as_ref()
                .map(|f| f.total_federal_tax - self.total_federal_withheld),
            state: self
                .california
                .as_ref()
                .map(|s| s.total_california_tax - self.total_state_withheld),
            total: self.amount_owed,
        }
    }
}
