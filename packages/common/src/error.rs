use thiserror::Error;

/// Error when parsing an invalid enum string (status, role, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{invalid}'. Valid values: {expected}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub invalid: String,
    pub expected: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, invalid: &str, valid: &[&'static str]) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            expected: valid.join(", "),
        }
    }
}
