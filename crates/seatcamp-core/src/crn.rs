use serde::Serialize;
use std::fmt;

/// A course reference number: exactly 5 ASCII digits. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Crn(String);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Skipping invalid CRN {token:?} (expected exactly 5 digits)")]
pub struct CrnError {
    pub token: String,
}

impl Crn {
    pub fn parse(token: &str) -> Result<Self, CrnError> {
        if token.len() == 5 && token.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(token.to_string()))
        } else {
            Err(CrnError {
                token: token.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Crn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of validating one raw batch of operator input.
#[derive(Debug, Clone, Default)]
pub struct CrnBatch {
    /// Well-formed codes in input order. Duplicates pass through as given.
    pub codes: Vec<Crn>,
    /// One notice per rejected token, in input order.
    pub skipped: Vec<CrnError>,
}

impl CrnBatch {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Split free-form operator text on commas and whitespace and validate each
/// token. Invalid tokens are skipped with a notice, never an error; an
/// all-invalid batch simply yields an empty `codes` list.
pub fn parse_crns(raw: &str) -> CrnBatch {
    let mut batch = CrnBatch::default();
    for token in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match Crn::parse(token) {
            Ok(crn) => batch.codes.push(crn),
            Err(e) => batch.skipped.push(e),
        }
    }
    batch
}
