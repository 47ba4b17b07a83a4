//! Quality-check outcomes.

use std::fmt;

/// Pass/fail status of a quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Passed,
    Failed,
}

impl ReportStatus {
    /// Marker printed in front of the report text.
    pub fn icon(&self) -> &'static str {
        match self {
            ReportStatus::Passed => "✅",
            ReportStatus::Failed => "❌",
        }
    }
}

/// Human-readable outcome of a quality check.
///
/// A failed check is not an error: the pipeline logs the message and
/// carries on with the table unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMessage {
    pub status: ReportStatus,
    pub detail: String,
}

impl ReportMessage {
    pub fn passed(detail: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Passed,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Failed,
            detail: detail.into(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == ReportStatus::Passed
    }
}

impl fmt::Display for ReportMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.icon(), self.detail)
    }
}
