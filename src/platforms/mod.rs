//! Platform Transformers: canonical `Lead` → insurer quote-form data.
//!
//! Transformers read the lead and never mutate it. Subscriber and spouse
//! validation failures are fatal; children are filtered one by one; mapping
//! misses fall back to a documented default and are logged.

pub mod alptis;
pub mod swisslife;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ADULT_MAX_AGE, ADULT_MIN_AGE, CHILD_MAX_AGE, CHILD_MIN_AGE};
use crate::models::enums::Platform;
use crate::models::lead::Lead;
use crate::pipeline::dates::{age_on, format_lead_date, parse_lead_date};

pub use alptis::AlptisTransformer;
pub use swisslife::SwissLifeTransformer;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("{field}: unparseable birth date '{value}'")]
    InvalidBirthDate { field: String, value: String },

    #[error("{field}: age {age} outside [{min}, {max}] for birth date '{value}'")]
    AgeOutOfRange {
        field: String,
        value: String,
        age: i32,
        min: u32,
        max: u32,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Successful transformation: form data plus advisory warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutcome<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

/// Non-failing envelope for callers that want a typed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl<T> From<Result<TransformOutcome<T>, TransformError>> for TransformResult<T> {
    fn from(result: Result<TransformOutcome<T>, TransformError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                data: Some(outcome.data),
                errors: Vec::new(),
                warnings: outcome.warnings,
            },
            Err(e) => Self {
                success: false,
                data: None,
                errors: vec![e.to_string()],
                warnings: Vec::new(),
            },
        }
    }
}

pub trait PlatformTransformer {
    type Output: Serialize;

    fn platform(&self) -> Platform;

    /// Transform with ages computed on `today`.
    fn transform_at(
        &self,
        lead: &Lead,
        today: NaiveDate,
    ) -> Result<TransformOutcome<Self::Output>, TransformError>;

    /// Transform with ages computed on the local current date.
    fn transform(&self, lead: &Lead) -> Result<TransformOutcome<Self::Output>, TransformError> {
        self.transform_at(lead, chrono::Local::now().date_naive())
    }

    fn try_transform_at(&self, lead: &Lead, today: NaiveDate) -> TransformResult<Self::Output> {
        let result = self.transform_at(lead, today);
        if let Err(e) = &result {
            tracing::warn!(platform = %self.platform(), lead_id = %lead.id, error = %e, "Transformation failed");
        }
        result.into()
    }

    fn try_transform(&self, lead: &Lead) -> TransformResult<Self::Output> {
        self.try_transform_at(lead, chrono::Local::now().date_naive())
    }
}

// ═══════════════════════════════════════════
// Shared validation
// ═══════════════════════════════════════════

/// Subscriber/spouse birth date: must parse and give an age in [18, 110].
/// Returns the date in `DD/MM/YYYY`.
pub fn validate_adult_birth_date(
    field: &str,
    value: Option<&str>,
    today: NaiveDate,
) -> Result<String, TransformError> {
    let raw = value.ok_or_else(|| TransformError::MissingField(field.to_string()))?;
    let birth = parse_lead_date(raw).ok_or_else(|| TransformError::InvalidBirthDate {
        field: field.to_string(),
        value: raw.to_string(),
    })?;

    let age = age_on(birth, today);
    if age < ADULT_MIN_AGE as i32 || age > ADULT_MAX_AGE as i32 {
        return Err(TransformError::AgeOutOfRange {
            field: field.to_string(),
            value: raw.to_string(),
            age,
            min: ADULT_MIN_AGE,
            max: ADULT_MAX_AGE,
        });
    }
    Ok(format_lead_date(birth))
}

/// Child birth date in `DD/MM/YYYY`, or `None` (with a warning) when it does
/// not parse or the age falls outside [0, 27].
pub fn validate_child_birth_date(
    ordre: u32,
    value: &str,
    today: NaiveDate,
    warnings: &mut Vec<String>,
) -> Option<String> {
    let Some(birth) = parse_lead_date(value) else {
        tracing::warn!(ordre, value = %value, "Child dropped: unparseable birth date");
        warnings.push(format!("Child {ordre} dropped: unparseable birth date '{value}'"));
        return None;
    };

    let age = age_on(birth, today);
    if age < CHILD_MIN_AGE as i32 || age > CHILD_MAX_AGE as i32 {
        tracing::warn!(ordre, age, "Child dropped: age out of range");
        warnings.push(format!(
            "Child {ordre} dropped: age {age} outside [{CHILD_MIN_AGE}, {CHILD_MAX_AGE}]"
        ));
        return None;
    }
    Some(format_lead_date(birth))
}

/// Required text field, trimmed.
pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, TransformError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TransformError::MissingField(field.to_string()))
}

// ═══════════════════════════════════════════
// Table mapping
// ═══════════════════════════════════════════

/// Lowercase exact-match lookup with a logged default on miss.
pub fn map_with_default<T: Copy + std::fmt::Debug>(
    field: &str,
    raw: Option<&str>,
    table: &[(&str, T)],
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    match lookup(raw, table) {
        Some(v) => v,
        None => {
            let shown = raw.unwrap_or("");
            tracing::warn!(field = %field, value = %shown, default = ?default, "Unmapped value, using default");
            warnings.push(format!("{field}: '{shown}' not recognized, defaulted to {default:?}"));
            default
        }
    }
}

/// Lowercase exact-match lookup without a default.
pub fn lookup<T: Copy>(raw: Option<&str>, table: &[(&str, T)]) -> Option<T> {
    let key = raw?.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}
