use chrono::NaiveDate;
use uuid::Uuid;

use crate::alerts;
use crate::error::RiskError;
use crate::models::{
    AssignmentRecord, AttendanceSummary, BacklogRecord, ExamRecord, RosterSummary, SkippedStudent,
    Student, StudentDashboard, StudentRecords, StudentRiskSummary,
};
use crate::provider::DataProvider;
use crate::risk;

const UPCOMING_ASSIGNMENT_LIMIT: usize = 5;
const RECENT_EXAM_LIMIT: usize = 5;

/// Scores every student under one mentor independently. Entries keep the
/// input ordering. A student whose assessment fails is omitted from the
/// entries and reported in `skipped`; one bad record set never aborts the
/// batch.
pub async fn aggregate_roster<P: DataProvider>(
    provider: &P,
    mentor_id: Uuid,
    students: &[Student],
) -> RosterSummary {
    let mut entries = Vec::with_capacity(students.len());
    let mut skipped = Vec::new();

    for student in students {
        match risk::assess_student(provider, student.id).await {
            Ok(assessment) => entries.push(StudentRiskSummary {
                id: student.id,
                name: student.name.clone(),
                roll_number: student.roll_number.clone(),
                email: student.email.clone(),
                risk_score: assessment.risk_score,
                risk_level: assessment.risk_level,
                factors: assessment.factors,
            }),
            Err(err) => skipped.push(SkippedStudent {
                student_id: student.id,
                reason: err.to_string(),
            }),
        }
    }

    RosterSummary {
        mentor_id,
        entries,
        skipped,
    }
}

/// Shapes the student view: attendance summary, next assignments due on or
/// after `today`, most recent exams, pending backlogs, the assessment, and
/// its alerts. `today` is a parameter so assembly stays deterministic.
pub fn assemble_dashboard(
    student: Student,
    records: &StudentRecords,
    today: NaiveDate,
) -> Result<StudentDashboard, RiskError> {
    let metrics = risk::metrics_from_records(records)?;
    let assessment = risk::compute(&metrics)?;
    let alerts = alerts::derive_alerts(&assessment, metrics.attendance_pct);

    let attended = records
        .attendance
        .iter()
        .filter(|record| record.status == "present")
        .count();
    let attendance = AttendanceSummary {
        percentage: assessment.factors.attendance,
        total_classes: records.attendance.len(),
        attended,
    };

    let mut assignments: Vec<AssignmentRecord> = records
        .assignments
        .iter()
        .filter(|assignment| assignment.due_date >= today)
        .cloned()
        .collect();
    assignments.sort_by_key(|assignment| assignment.due_date);
    assignments.truncate(UPCOMING_ASSIGNMENT_LIMIT);

    let mut exams: Vec<ExamRecord> = records.exams.clone();
    exams.sort_by(|a, b| b.exam_date.cmp(&a.exam_date));
    exams.truncate(RECENT_EXAM_LIMIT);

    let backlogs: Vec<BacklogRecord> = records
        .backlogs
        .iter()
        .filter(|backlog| backlog.status == "pending")
        .cloned()
        .collect();

    Ok(StudentDashboard {
        student,
        attendance,
        assignments,
        exams,
        backlogs,
        risk: assessment,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlertKind, AttendanceRecord, RiskLevel};
    use crate::provider::MemoryProvider;

    fn student(name: &str, roll: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{roll}@campus.test"),
            roll_number: roll.to_string(),
        }
    }

    fn attendance_records(student_id: Uuid, present: usize, absent: usize) -> Vec<AttendanceRecord> {
        let base = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        (0..present + absent)
            .map(|offset| AttendanceRecord {
                student_id,
                occurred_on: base + chrono::Duration::days(offset as i64),
                status: if offset < present {
                    "present".to_string()
                } else {
                    "absent".to_string()
                },
            })
            .collect()
    }

    #[tokio::test]
    async fn roster_preserves_input_order() {
        let students = vec![student("Rhea Nair", "CS101"), student("Ishaan Rao", "CS102")];
        let mut provider = MemoryProvider::new();
        // First student scores worse than the second; ordering must not change.
        provider.insert(
            students[0].id,
            StudentRecords {
                attendance: attendance_records(students[0].id, 1, 9),
                ..StudentRecords::default()
            },
        );
        provider.insert(
            students[1].id,
            StudentRecords {
                attendance: attendance_records(students[1].id, 9, 1),
                ..StudentRecords::default()
            },
        );

        let roster = aggregate_roster(&provider, Uuid::new_v4(), &students).await;
        assert_eq!(roster.entries.len(), 2);
        assert_eq!(roster.entries[0].roll_number, "CS101");
        assert_eq!(roster.entries[1].roll_number, "CS102");
        assert!(roster.entries[0].risk_score < roster.entries[1].risk_score);
        assert!(roster.skipped.is_empty());
    }

    #[tokio::test]
    async fn failing_student_is_skipped_not_fatal() {
        let students = vec![
            student("Rhea Nair", "CS101"),
            student("Ishaan Rao", "CS102"),
            student("Mira Shah", "CS103"),
        ];
        let mut provider = MemoryProvider::new();
        provider.insert(students[0].id, StudentRecords::default());
        // students[1] is unknown to the provider.
        provider.insert(students[2].id, StudentRecords::default());

        let roster = aggregate_roster(&provider, Uuid::new_v4(), &students).await;
        assert_eq!(roster.entries.len(), 2);
        assert_eq!(roster.entries[0].roll_number, "CS101");
        assert_eq!(roster.entries[1].roll_number, "CS103");
        assert_eq!(roster.skipped.len(), 1);
        assert_eq!(roster.skipped[0].student_id, students[1].id);
    }

    #[test]
    fn dashboard_filters_sorts_and_caps_record_lists() {
        let subject = student("Rhea Nair", "CS101");
        let student_id = subject.id;
        let day = |d: u32| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();

        let assignments = (1..=8)
            .map(|n| AssignmentRecord {
                student_id,
                title: format!("Assignment {n}"),
                // Descending due dates; two already past the cutoff.
                due_date: day(20 - n),
                status: "pending".to_string(),
            })
            .collect();
        let exams = (1..=7)
            .map(|n| ExamRecord {
                student_id,
                subject: format!("Subject {n}"),
                exam_date: day(n),
                marks_obtained: 45.0,
                total_marks: 50.0,
            })
            .collect();
        let records = StudentRecords {
            attendance: attendance_records(student_id, 9, 1),
            assignments,
            exams,
            backlogs: vec![
                BacklogRecord {
                    student_id,
                    subject: "Chemistry".to_string(),
                    status: "pending".to_string(),
                },
                BacklogRecord {
                    student_id,
                    subject: "Biology".to_string(),
                    status: "cleared".to_string(),
                },
            ],
        };

        let dashboard = assemble_dashboard(subject, &records, day(14)).unwrap();

        assert_eq!(dashboard.attendance.percentage, 90.0);
        assert_eq!(dashboard.attendance.total_classes, 10);
        assert_eq!(dashboard.attendance.attended, 9);

        let due_dates: Vec<NaiveDate> = dashboard
            .assignments
            .iter()
            .map(|assignment| assignment.due_date)
            .collect();
        assert_eq!(
            due_dates,
            vec![day(14), day(15), day(16), day(17), day(18)]
        );

        assert_eq!(dashboard.exams.len(), 5);
        assert_eq!(dashboard.exams[0].exam_date, day(7));
        assert_eq!(dashboard.exams[4].exam_date, day(3));

        assert_eq!(dashboard.backlogs.len(), 1);
        assert_eq!(dashboard.backlogs[0].subject, "Chemistry");
    }

    #[test]
    fn dashboard_carries_alerts_for_struggling_student() {
        let subject = student("Ishaan Rao", "CS102");
        let student_id = subject.id;
        let records = StudentRecords {
            attendance: attendance_records(student_id, 2, 3),
            backlogs: (0..3)
                .map(|n| BacklogRecord {
                    student_id,
                    subject: format!("Subject {n}"),
                    status: "pending".to_string(),
                })
                .collect(),
            ..StudentRecords::default()
        };

        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let dashboard = assemble_dashboard(subject, &records, today).unwrap();

        assert_eq!(dashboard.risk.risk_level, RiskLevel::High);
        assert_eq!(dashboard.alerts.len(), 2);
        assert_eq!(dashboard.alerts[0].kind, AlertKind::Danger);
        assert_eq!(dashboard.alerts[1].message, "Low attendance: 40.0%");
    }
}
