//! Income aggregation and tax-law attribution.
//!
//! Parsed tax documents are folded into a [`CanonicalIncomeRecord`]; a computed
//! result from the tax service is mapped back onto the provisions that produced
//! it and grouped into [`Section`]s for display.

pub mod attribution;
pub mod document;
pub mod error;
pub mod income;
pub mod money;
pub mod result;
pub mod review;
pub mod sanitize;
pub mod sections;
pub mod state;

pub use attribution::{EntryKind, LawEntry, RULES, build_law_entries};
pub use document::{FieldValue, FormType, ParseConfidence, ParsedDocument};
pub use error::{AttributionError, InputError};
pub use income::{
    CanonicalIncomeRecord, DEFAULT_TAX_YEAR, FilingStatus, IncomeField, aggregate,
    parse_amount_input,
};
pub use result::{BottomLine, Bracket, ComputedTaxResult, FederalResult, StateResult};
pub use review::IncomeReview;
pub use sanitize::{display_name, sanitize};
pub use sections::{Section, attribute, group_and_sort};
pub use state::StateCode;
