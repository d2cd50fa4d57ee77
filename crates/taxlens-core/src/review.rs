//! The income-review step: owns the document list and the record built from it.
//!
//! Any change to the document list re-aggregates the *whole* list and replaces
//! the record. Manual edits made with [`IncomeReview::set_field`] therefore
//! survive only until the next document is added or removed.

use tracing::debug;

use crate::document::ParsedDocument;
use crate::error::InputError;
use crate::income::{
    CanonicalIncomeRecord, DEFAULT_TAX_YEAR, FilingStatus, IncomeField, aggregate,
    parse_amount_input,
};
use crate::state::StateCode;

#[derive(Debug, Clone, PartialEq)]
pub struct IncomeReview {
    documents: Vec<ParsedDocument>,
    record: CanonicalIncomeRecord,
}

impl Default for IncomeReview {
    fn default() -> Self {
        Self::new()
    }
}

impl IncomeReview {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            record: CanonicalIncomeRecord::empty(DEFAULT_TAX_YEAR),
        }
    }

    /// Start with a caller selection and no documents.
    pub fn with_selection(tax_year: i32, filing_status: FilingStatus, state: StateCode) -> Self {
        let mut review = Self::new();
        review.record.tax_year = tax_year;
        review.record.filing_status = filing_status;
        review.record.state = state;
        review
    }

    pub fn documents(&self) -> &[ParsedDocument] {
        &self.documents
    }

    pub fn record(&self) -> &CanonicalIncomeRecord {
        &self.record
    }

    /// Append a completed upload and recompute.
    pub fn add_document(&mut self, doc: ParsedDocument) {
        self.documents.push(doc);
        self.refresh();
    }

    /// Remove the document at `index` and recompute.
    ///
    /// Removing the last document leaves the record as it was.
    pub fn remove_document(&mut self, index: usize) -> Result<ParsedDocument, InputError> {
        if index >= self.documents.len() {
            return Err(InputError::NoSuchDocument {
                index,
                len: self.documents.len(),
            });
        }
        let doc = self.documents.remove(index);
        self.refresh();
        Ok(doc)
    }

    /// Manual edit of one numeric field. Overwritten by the next recompute.
    pub fn set_field(&mut self, field: IncomeField, amount: f64) {
        *self.record.get_mut(field) = if amount.is_finite() { amount } else { 0.0 };
    }

    /// Manual edit from raw form input; unparsable text becomes 0.
    pub fn set_field_input(&mut self, field: IncomeField, input: &str) {
        self.set_field(field, parse_amount_input(input));
    }

    pub fn select_tax_year(&mut self, tax_year: i32) {
        self.record.tax_year = tax_year;
    }

    pub fn select_filing_status(&mut self, status: FilingStatus) {
        self.record.filing_status = status;
    }

    pub fn select_state(&mut self, state: StateCode) {
        self.record.state = state;
    }

    /// Drop all documents and reset the record to defaults.
    pub fn start_over(&mut self) {
        *self = Self::new();
    }

    /// Payload for the computation service.
    pub fn calculation_request(&self) -> &CanonicalIncomeRecord {
        &self.record
    }

    fn refresh(&mut self) {
        if self.documents.is_empty() {
            return;
        }
        let mut record = aggregate(&self.documents, self.record.tax_year);
        record.filing_status = self.record.filing_status;
        record.state = self.record.state;
        debug!(documents = self.documents.len(), "income record recomputed");
        self.record = record;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FormType;

    fn w2(wages: f64) -> ParsedDocument {
        ParsedDocument::new(FormType::W2, "w2.pdf").with("wages", wages)
    }

    #[test]
    fn adding_documents_recomputes() {
        let mut review = IncomeReview::new();
        review.add_document(w2(1000.0));
        review.add_document(w2(2500.0));
        assert_eq!(review.record().w2_wages, 3500.0);
        assert_eq!(review.documents().len(), 2);
    }

    #[test]
    fn manual_edit_is_overwritten_by_next_change() {
        let mut review = IncomeReview::new();
        review.add_document(w2(1000.0));
        review.set_field(IncomeField::W2Wages, 1200.0);
        review.set_field(IncomeField::ItemizedDeductions, 20000.0);
        assert_eq!(review.record().w2_wages, 1200.0);

        review.add_document(w2(1.0));
        assert_eq!(review.record().w2_wages, 1001.0);
        assert_eq!(review.record().itemized_deductions, 0.0);
    }

    #[test]
    fn removing_subtracts_the_document() {
        let mut review = IncomeReview::new();
        review.add_document(w2(1000.0));
        review.add_document(w2(250.0));
        let removed = review.remove_document(0).unwrap();
        assert_eq!(removed.get("wages").unwrap().as_amount(), Some(1000.0));
        assert_eq!(review.record().w2_wages, 250.0);
    }

    #[test]
    fn removing_last_document_leaves_record() {
        let mut review = IncomeReview::new();
        review.add_document(w2(1000.0));
        review.remove_document(0).unwrap();
        assert!(review.documents().is_empty());
        assert_eq!(review.record().w2_wages, 1000.0);
    }

    #[test]
    fn remove_out_of_range() {
        let mut review = IncomeReview::new();
        assert_eq!(
            review.remove_document(3),
            Err(InputError::NoSuchDocument { index: 3, len: 0 })
        );
    }

    #[test]
    fn selection_carried_through_recompute() {
        let ny: StateCode = "NY".parse().unwrap();
        let mut review = IncomeReview::with_selection(2025, FilingStatus::Joint, ny);
        review.add_document(w2(10.0));
        let record = review.record();
        assert_eq!(record.tax_year, 2025);
        assert_eq!(record.filing_status, FilingStatus::Joint);
        assert_eq!(record.state, ny);

        review.select_tax_year(2024);
        review.add_document(w2(5.0));
        assert_eq!(review.record().tax_year, 2024);
        assert_eq!(review.record().w2_wages, 15.0);
    }

    #[test]
    fn selecting_status_and_state_keeps_amounts() {
        let mut review = IncomeReview::new();
        review.add_document(w2(1000.0));
        let before = review.record().clone();

        let ny: StateCode = "NY".parse().unwrap();
        review.select_state(ny);
        review.select_filing_status(FilingStatus::Joint);
        for field in IncomeField::ALL {
            assert_eq!(review.record().get(field), before.get(field));
        }
        assert_eq!(review.record().tax_year, before.tax_year);

        review.add_document(w2(500.0));
        let record = review.record();
        assert_eq!(record.w2_wages, 1500.0);
        assert_eq!(record.state, ny);
        assert_eq!(record.filing_status, FilingStatus::Joint);
    }

    #[test]
    fn text_input_is_coerced() {
        let mut review = IncomeReview::new();
        review.set_field_input(IncomeField::InterestIncome, "12.75");
        assert_eq!(review.record().interest_income, 12.75);
        review.set_field_input(IncomeField::InterestIncome, "");
        assert_eq!(review.record().interest_income, 0.0);
        review.set_field(IncomeField::InterestIncome, f64::NAN);
        assert_eq!(review.record().interest_income, 0.0);
    }

    #[test]
    fn start_over_resets_everything() {
        let mut review =
            IncomeReview::with_selection(2025, FilingStatus::Joint, "TX".parse().unwrap());
        review.add_document(w2(10.0));
        review.start_over();
        assert_eq!(review, IncomeReview::new());
        assert_eq!(review.record().tax_year, DEFAULT_TAX_YEAR);
    }
}
