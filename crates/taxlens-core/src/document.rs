//! Parsed source documents as delivered by the ingestion service.
//!
//! The ingestion side runs PDF/OCR parsers and hands back one
//! [`ParsedDocument`] per completed upload. Field names inside `data` vary by
//! form type and by parser version, so the map is kept loosely typed here and
//! resolved against fixed candidate key lists in [`crate::income`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tax form detected by the ingestion service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormType {
    W2,
    Int1099,
    Div1099,
    B1099,
    Nec1099,
    /// Anything else the parser reported, e.g. `"W-2+1099-INT"` when every
    /// parser was run over an unlabelled upload.
    Other(String),
}

impl FormType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::W2 => "W-2",
            Self::Int1099 => "1099-INT",
            Self::Div1099 => "1099-DIV",
            Self::B1099 => "1099-B",
            Self::Nec1099 => "1099-NEC",
            Self::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "W-2" | "W2" => Self::W2,
            "1099-INT" => Self::Int1099,
            "1099-DIV" => Self::Div1099,
            "1099-B" => Self::B1099,
            "1099-NEC" => Self::Nec1099,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FormType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FormType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Parser's own estimate of extraction quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseConfidence {
    High,
    Medium,
    #[default]
    Low,
    /// No parser recognised the upload; the data map is usually empty.
    Failed,
}

impl ParseConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Failed => "failed",
        }
    }
}

/// A single extracted value.
///
/// Parsers emit numbers for amounts and strings for names, but some values are
/// neither (nulls, 1099-B transaction lists). Those are carried untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Opaque(serde_json::Value),
}

impl FieldValue {
    /// Numeric reading of the value, if it has one.
    ///
    /// Finite numbers pass through; strings count when their trimmed form
    /// parses as a finite float. Everything else is not numeric.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One uploaded and parsed source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub form_type: FormType,
    #[serde(default)]
    pub parse_confidence: ParseConfidence,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
}

impl ParsedDocument {
    pub fn new(form_type: FormType, filename: impl Into<String>) -> Self {
        Self {
            form_type,
            parse_confidence: ParseConfidence::High,
            filename: filename.into(),
            data: BTreeMap::new(),
        }
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.data.get(key)
    }
}
