//! Institution-name sanitising for display.
//!
//! OCR and form-field extraction frequently return printed box labels or
//! identifiers where the payer's name should be. [`sanitize`] rejects those so
//! the display layer can fall back to the form type instead.

use crate::document::ParsedDocument;

/// Printed form labels that never form part of a real institution name.
///
/// Matched as lowercase substrings. Short labels such as "tin" are excluded;
/// they occur inside ordinary words ("Marketing").
pub const BOILERPLATE_LABELS: &[&str] = &[
    "name line",
    "street address",
    "city or town",
    "state or province",
    "zip code",
    "postal code",
    "taxpayer identification",
    "identification number",
    "payer",
    "recipient",
    "employer identification",
    "internal revenue",
    "department of the treasury",
    "corrected",
    "omb no",
    "control number",
    "account number",
    "financial institution",
];

/// Keys under which parsers report the issuing institution, in lookup order.
const NAME_KEYS: &[&str] = &["payer_name", "employer_name", "broker_name"];

/// Share of digit characters above which a string is treated as an identifier.
const MAX_DIGIT_RATIO: f64 = 0.5;

/// Return `raw` unchanged if it looks like a real name, otherwise `""`.
pub fn sanitize(raw: &str) -> &str {
    if raw.is_empty() {
        return "";
    }

    let lower = raw.to_lowercase();
    if BOILERPLATE_LABELS.iter().any(|label| lower.contains(label)) {
        return "";
    }

    let total = raw.chars().count();
    let digits = raw.chars().filter(|c| c.is_ascii_digit()).count();
    if digits as f64 / total as f64 > MAX_DIGIT_RATIO {
        return "";
    }

    raw
}

/// Name to show for a document: the first sanitised institution name, or the
/// form-type label when none survives.
pub fn display_name(doc: &ParsedDocument) -> String {
    NAME_KEYS
        .iter()
        .filter_map(|key| doc.get(key).and_then(|v| v.as_text()))
        .map(sanitize)
        .find(|name| !name.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| doc.form_type.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FormType;

    #[test]
    fn rejects_boilerplate_labels() {
        assert_eq!(sanitize("Form 1099-DIV Payer's name"), "");
        assert_eq!(sanitize("PAYER'S name, street address"), "");
        assert_eq!(sanitize("Department of the Treasury - Internal Revenue Service"), "");
        assert_eq!(sanitize("CORRECTED (if checked)"), "");
    }

    #[test]
    fn keeps_real_names() {
        assert_eq!(sanitize("Chase Bank"), "Chase Bank");
        assert_eq!(sanitize("Vanguard Marketing Corp"), "Vanguard Marketing Corp");
        assert_eq!(sanitize("3M Company"), "3M Company");
    }

    #[test]
    fn rejects_digit_heavy_strings() {
        assert_eq!(sanitize("123456789"), "");
        assert_eq!(sanitize("12-3456789"), "");
        // Exactly half digits is still accepted.
        assert_eq!(sanitize("ab12"), "ab12");
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn display_name_prefers_first_clean_key() {
        let doc = ParsedDocument::new(FormType::Div1099, "div.pdf")
            .with("payer_name", "PAYER'S name")
            .with("broker_name", "Fidelity Brokerage Services LLC");
        assert_eq!(display_name(&doc), "Fidelity Brokerage Services LLC");
    }

    #[test]
    fn display_name_falls_back_to_form_type() {
        let doc = ParsedDocument::new(FormType::W2, "w2.pdf").with("employer_name", "94-1234567");
        assert_eq!(display_name(&doc), "W-2");

        let bare = ParsedDocument::new(FormType::Nec1099, "nec.pdf");
        assert_eq!(display_name(&bare), "1099-NEC");
    }

    #[test]
    fn display_name_skips_blank_names() {
        let doc = ParsedDocument::new(FormType::W2, "w2.pdf").with("employer_name", "   ");
        assert_eq!(display_name(&doc), "W-2");

        let doc = ParsedDocument::new(FormType::Int1099, "int.pdf")
            .with("payer_name", "\t")
            .with("broker_name", "Ally Bank");
        assert_eq!(display_name(&doc), "Ally Bank");
    }
}
