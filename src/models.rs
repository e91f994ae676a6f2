use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roll_number: String,
}

#[derive(Debug, Clone)]
pub struct Mentor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// One class session for a student. `status` is the category as stored
/// ("present", "absent", ...); unknown categories count as not present.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub student_id: Uuid,
    pub occurred_on: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRecord {
    pub student_id: Uuid,
    pub title: String,
    pub due_date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExamRecord {
    pub student_id: Uuid,
    pub subject: String,
    pub exam_date: NaiveDate,
    pub marks_obtained: f64,
    pub total_marks: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BacklogRecord {
    pub student_id: Uuid,
    pub subject: String,
    pub status: String,
}

/// The four raw record sets for one student, as fetched by a provider.
/// Backlogs arrive unfiltered; the engine counts only pending ones.
#[derive(Debug, Clone, Default)]
pub struct StudentRecords {
    pub attendance: Vec<AttendanceRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub exams: Vec<ExamRecord>,
    pub backlogs: Vec<BacklogRecord>,
}

/// Normalized per-student metrics, built once per scoring call.
/// `exam_pct` is `None` when the student has no exam records; scoring
/// treats that as 0, matching the platform's historical behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricInput {
    pub attendance_pct: f64,
    pub assignment_total: u32,
    pub assignment_submitted: u32,
    pub exam_pct: Option<f64>,
    pub pending_backlog_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Raw per-signal breakdown reported alongside the weighted score.
/// Percentages are rounded for display; backlogs stay a raw count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFactors {
    pub attendance: f64,
    pub assignments: f64,
    pub exams: f64,
    pub backlogs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: RiskFactors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

/// One mentor-roster row: identity plus the computed assessment.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRiskSummary {
    pub id: Uuid,
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factors: RiskFactors,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedStudent {
    pub student_id: Uuid,
    pub reason: String,
}

/// Roster for one mentor. `entries` preserves the input student ordering;
/// students whose assessment failed land in `skipped` instead of aborting
/// the batch.
#[derive(Debug, Clone, Serialize)]
pub struct RosterSummary {
    pub mentor_id: Uuid,
    pub entries: Vec<StudentRiskSummary>,
    pub skipped: Vec<SkippedStudent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSummary {
    pub percentage: f64,
    pub total_classes: usize,
    pub attended: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDashboard {
    pub student: Student,
    pub attendance: AttendanceSummary,
    pub assignments: Vec<AssignmentRecord>,
    pub exams: Vec<ExamRecord>,
    pub backlogs: Vec<BacklogRecord>,
    pub risk: RiskAssessment,
    pub alerts: Vec<Alert>,
}
