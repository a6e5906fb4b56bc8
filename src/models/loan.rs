//! Loan renewal form types

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::book_instance::BookInstance;

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenewalDateError {
    #[error("Invalid date format, expected YYYY-MM-DD")]
    Malformed,
    #[error("Invalid date - renewal in past")]
    InPast,
    #[error("Invalid date - renewal more than {0} weeks ahead")]
    TooFarAhead(i64),
}

/// Bounds applied to renewal dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalPolicy {
    pub proposed_weeks: i64,
    pub max_weeks: i64,
}

impl Default for RenewalPolicy {
    fn default() -> Self {
        Self {
            proposed_weeks: 3,
            max_weeks: 4,
        }
    }
}

impl RenewalPolicy {
    /// Value pre-filled in a fresh form
    pub fn proposed_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.proposed_weeks)
    }

    /// Latest acceptable date, inclusive
    pub fn latest_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::weeks(self.max_weeks)
    }

    /// Parse and bound-check a submitted date
    pub fn validate(&self, raw: &str, today: NaiveDate) -> Result<NaiveDate, RenewalDateError> {
        let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| RenewalDateError::Malformed)?;

        if date < today {
            return Err(RenewalDateError::InPast);
        }
        if date > self.latest_date(today) {
            return Err(RenewalDateError::TooFarAhead(self.max_weeks));
        }
        Ok(date)
    }
}

/// Submitted renewal form
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RenewalSubmission {
    /// Requested due date (YYYY-MM-DD); a missing field is a malformed date
    #[serde(default)]
    pub renewal_date: String,
}

/// Renewal form awaiting input, either fresh or re-displayed with errors
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalForm {
    pub book_instance: BookInstance,
    /// Proposed date on a fresh form, the submitted text otherwise
    pub renewal_date: String,
    /// Entered between now and 4 weeks (default 3)
    pub help_text: String,
    pub errors: Vec<String>,
}

impl RenewalForm {
    pub fn fresh(book_instance: BookInstance, policy: &RenewalPolicy, today: NaiveDate) -> Self {
        Self {
            book_instance,
            renewal_date: policy.proposed_date(today).format("%Y-%m-%d").to_string(),
            help_text: help_text(policy),
            errors: Vec::new(),
        }
    }

    pub fn rejected(
        book_instance: BookInstance,
        policy: &RenewalPolicy,
        submission: &RenewalSubmission,
        error: RenewalDateError,
    ) -> Self {
        Self {
            book_instance,
            renewal_date: submission.renewal_date.clone(),
            help_text: help_text(policy),
            errors: vec![error.to_string()],
        }
    }
}

fn help_text(policy: &RenewalPolicy) -> String {
    format!(
        "Enter a date between now and {} weeks (default {}).",
        policy.max_weeks, policy.proposed_weeks
    )
}

/// Result of processing a renewal submission
#[derive(Debug, Clone)]
pub enum RenewalOutcome {
    /// New due date persisted
    Applied(BookInstance),
    /// Back to input with errors, nothing written
    Rejected(RenewalForm),
}
