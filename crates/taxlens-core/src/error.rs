use thiserror::Error;

/// A computed result that cannot be attributed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributionError {
    #[error("computed result has no federal sub-result")]
    MissingFederal,

    #[error("computed result has no state sub-result for {0}")]
    MissingState(String),
}

/// Caller-supplied selection or edit that does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown state code: {0:?}")]
    StateCode(String),

    #[error("unknown filing status: {0:?} (expected single or joint)")]
    FilingStatus(String),

    #[error("unknown income field: {0}")]
    UnknownField(String),

    #[error("no document at index {index} ({len} loaded)")]
    NoSuchDocument { index: usize, len: usize },
}
