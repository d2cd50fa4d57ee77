//! Two-letter state codes and the statutes cited for each state's taxes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InputError;

const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// State-level provisions that attribution entries cite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateProvision {
    IncomeTax,
    Surcharge,
    StandardDeduction,
}

/// A validated US state (or DC) postal code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateCode {
    code: &'static str,
    name: &'static str,
}

impl Default for StateCode {
    fn default() -> Self {
        Self {
            code: "CA",
            name: "California",
        }
    }
}

impl StateCode {
    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Display name of a state provision.
    pub fn provision_name(&self, provision: StateProvision) -> String {
        match (self.code, provision) {
            ("CA", StateProvision::Surcharge) => "Mental Health Services Tax".to_string(),
            (_, StateProvision::IncomeTax) => format!("{} Income Tax", self.name),
            (_, StateProvision::Surcharge) => format!("{} Income Tax Surcharge", self.name),
            (_, StateProvision::StandardDeduction) => {
                format!("{} Standard Deduction", self.name)
            }
        }
    }

    /// Statute cited for a state provision.
    ///
    /// California and New York carry their code sections; other states cite
    /// their income tax law generically.
    pub fn citation(&self, provision: StateProvision) -> String {
        let specific = match (self.code, provision) {
            ("CA", StateProvision::IncomeTax) => Some("Cal. Rev. & Tax. Code § 17041"),
            ("CA", StateProvision::Surcharge) => Some("Cal. Rev. & Tax. Code § 17043"),
            ("CA", StateProvision::StandardDeduction) => Some("Cal. Rev. & Tax. Code § 17073.5"),
            ("NY", StateProvision::IncomeTax) => Some("N.Y. Tax Law § 601"),
            ("NY", StateProvision::StandardDeduction) => Some("N.Y. Tax Law § 614"),
            _ => None,
        };
        match specific {
            Some(c) => c.to_string(),
            None => format!("{} income tax law", self.name),
        }
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl FromStr for StateCode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        STATES
            .iter()
            .find(|(code, _)| *code == upper)
            .map(|&(code, name)| Self { code, name })
            .ok_or_else(|| InputError::StateCode(s.to_string()))
    }
}

impl Serialize for StateCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for StateCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
