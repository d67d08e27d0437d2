//! Sequential certificate numbers.
//!
//! Numbers have the shape `<office-code>/SKP/<year>/<sequence>` where the
//! sequence is zero padded to four digits and restarts every calendar year.
//! Allocation reads the durable count of certificates already issued in the
//! year; uniqueness under concurrent issuance is left to storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Office code used when configuration does not override it.
pub const DEFAULT_OFFICE_CODE: &str = "421.2";

const DOCUMENT_KIND: &str = "SKP";

/// Validation failures for [`OfficeCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OfficeCodeError {
    #[error("office code must not be empty")]
    Empty,
    #[error("office code must not contain '/' or whitespace")]
    InvalidCharacter,
}

/// Administrative classification prefix printed before every number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OfficeCode(String);

impl OfficeCode {
    /// Validate and construct an office code.
    pub fn new(code: impl Into<String>) -> Result<Self, OfficeCodeError> {
        let code = code.into();
        if code.is_empty() {
            return Err(OfficeCodeError::Empty);
        }
        if code.chars().any(|c| c == '/' || c.is_whitespace()) {
            return Err(OfficeCodeError::InvalidCharacter);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for OfficeCode {
    fn default() -> Self {
        Self(DEFAULT_OFFICE_CODE.to_owned())
    }
}

impl fmt::Display for OfficeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OfficeCode> for String {
    fn from(value: OfficeCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for OfficeCode {
    type Error = OfficeCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Errors raised when a stored or supplied certificate number is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateNumberError {
    #[error("certificate number must have four '/'-separated parts")]
    Shape,
    #[error("certificate number office code is invalid: {0}")]
    Office(#[from] OfficeCodeError),
    #[error("certificate number document kind must be SKP")]
    Kind,
    #[error("certificate number year is not a number")]
    Year,
    #[error("certificate number sequence must be a positive number")]
    Sequence,
}

/// Human-readable certificate number, unique across all certificates.
///
/// # Examples
/// ```
/// use achievement_ledger::domain::{CertificateNumber, OfficeCode};
///
/// let number = CertificateNumber::next_in_year(&OfficeCode::default(), 2024, 0);
/// assert_eq!(number.as_str(), "421.2/SKP/2024/0001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateNumber {
    raw: String,
    year: i32,
    sequence: u32,
}

impl CertificateNumber {
    /// Number following `issued_in_year` certificates already stored for
    /// `year`.
    pub fn next_in_year(office: &OfficeCode, year: i32, issued_in_year: u64) -> Self {
        let sequence = u32::try_from(issued_in_year.saturating_add(1)).unwrap_or(u32::MAX);
        Self {
            raw: format!("{office}/{DOCUMENT_KIND}/{year}/{sequence:04}"),
            year,
            sequence,
        }
    }

    /// Parse a number read back from storage.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CertificateNumberError> {
        let raw = raw.into();
        let mut parts = raw.split('/');
        let (Some(office), Some(kind), Some(year), Some(sequence), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(CertificateNumberError::Shape);
        };
        OfficeCode::new(office)?;
        if kind != DOCUMENT_KIND {
            return Err(CertificateNumberError::Kind);
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| CertificateNumberError::Year)?;
        let sequence = sequence
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(CertificateNumberError::Sequence)?;
        Ok(Self {
            raw,
            year,
            sequence,
        })
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Calendar year encoded in the number.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// One-based position within the year.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for CertificateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<CertificateNumber> for String {
    fn from(value: CertificateNumber) -> Self {
        value.raw
    }
}

impl TryFrom<String> for CertificateNumber {
    type Error = CertificateNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for CertificateNumber {
    type Err = CertificateNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
