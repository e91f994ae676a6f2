use thiserror::Error;
use uuid::Uuid;

/// Failures the scoring core can report to its immediate caller.
///
/// `DataUnavailable` is a provider failure: the record sets for a student
/// could not be fetched at all. An empty-but-valid record set is not an
/// error; it scores as zero input. `InvalidMetric` means a supplied metric
/// violates its domain, which points at corrupt upstream data, so the
/// engine fails closed instead of clamping it away.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("records unavailable for student {student_id}: {reason}")]
    DataUnavailable { student_id: Uuid, reason: String },

    #[error("invalid metric: {detail}")]
    InvalidMetric { detail: String },
}
