use uuid::Uuid;

use crate::error::RiskError;
use crate::models::{MetricInput, RiskAssessment, RiskFactors, RiskLevel, StudentRecords};
use crate::provider::DataProvider;

pub const EXAM_WEIGHT: f64 = 0.30;
pub const BACKLOG_WEIGHT: f64 = 0.30;
pub const ATTENDANCE_WEIGHT: f64 = 0.20;
pub const ASSIGNMENT_WEIGHT: f64 = 0.20;

/// Points subtracted per pending backlog; four or more floor the sub-score.
const BACKLOG_PENALTY: i64 = 25;

pub fn metrics_from_records(records: &StudentRecords) -> Result<MetricInput, RiskError> {
    let attendance_pct = if records.attendance.is_empty() {
        0.0
    } else {
        let present = records
            .attendance
            .iter()
            .filter(|record| record.status == "present")
            .count();
        present as f64 / records.attendance.len() as f64 * 100.0
    };

    let assignment_total = records.assignments.len() as u32;
    let assignment_submitted = records
        .assignments
        .iter()
        .filter(|assignment| assignment.status == "submitted")
        .count() as u32;

    let exam_pct = if records.exams.is_empty() {
        None
    } else {
        let mut sum = 0.0;
        for exam in &records.exams {
            if exam.total_marks <= 0.0 {
                return Err(RiskError::InvalidMetric {
                    detail: format!(
                        "exam {} has non-positive total_marks {}",
                        exam.subject, exam.total_marks
                    ),
                });
            }
            let pct = exam.marks_obtained / exam.total_marks * 100.0;
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                return Err(RiskError::InvalidMetric {
                    detail: format!("exam {} scores {:.2}% outside [0, 100]", exam.subject, pct),
                });
            }
            sum += pct;
        }
        Some(sum / records.exams.len() as f64)
    };

    let pending_backlog_count = records
        .backlogs
        .iter()
        .filter(|backlog| backlog.status == "pending")
        .count() as u32;

    Ok(MetricInput {
        attendance_pct,
        assignment_total,
        assignment_submitted,
        exam_pct,
        pending_backlog_count,
    })
}

pub fn compute(metrics: &MetricInput) -> Result<RiskAssessment, RiskError> {
    if metrics.assignment_submitted > metrics.assignment_total {
        return Err(RiskError::InvalidMetric {
            detail: format!(
                "assignment_submitted {} exceeds assignment_total {}",
                metrics.assignment_submitted, metrics.assignment_total
            ),
        });
    }
    check_pct("attendance_pct", metrics.attendance_pct)?;
    if let Some(exam_pct) = metrics.exam_pct {
        check_pct("exam_pct", exam_pct)?;
    }

    let assignment_pct = if metrics.assignment_total > 0 {
        f64::from(metrics.assignment_submitted) / f64::from(metrics.assignment_total) * 100.0
    } else {
        0.0
    };
    let backlog_score = backlog_pct(metrics.pending_backlog_count);
    let exam_pct = metrics.exam_pct.unwrap_or(0.0);

    let risk_score = round2(
        clamp_pct(exam_pct) * EXAM_WEIGHT
            + clamp_pct(backlog_score) * BACKLOG_WEIGHT
            + clamp_pct(metrics.attendance_pct) * ATTENDANCE_WEIGHT
            + clamp_pct(assignment_pct) * ASSIGNMENT_WEIGHT,
    );

    Ok(RiskAssessment {
        risk_score,
        risk_level: classify(risk_score),
        factors: RiskFactors {
            attendance: round2(metrics.attendance_pct),
            assignments: round2(assignment_pct),
            exams: round2(exam_pct),
            backlogs: metrics.pending_backlog_count,
        },
    })
}

pub async fn assess_student<P: DataProvider>(
    provider: &P,
    student_id: Uuid,
) -> Result<RiskAssessment, RiskError> {
    let records = provider.student_records(student_id).await?;
    let metrics = metrics_from_records(&records)?;
    compute(&metrics)
}

/// Lower bounds inclusive: 75 is still low risk, 50 is still medium.
pub fn classify(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::Low
    } else if score >= 50.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

pub fn backlog_pct(pending: u32) -> f64 {
    (100 - i64::from(pending) * BACKLOG_PENALTY).max(0) as f64
}

fn check_pct(name: &str, value: f64) -> Result<(), RiskError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(RiskError::InvalidMetric {
            detail: format!("{name} {value} outside [0, 100]"),
        });
    }
    Ok(())
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
