use crate::models::{Alert, AlertKind, RiskAssessment, RiskLevel};

pub const DANGER_MESSAGE: &str = "You are at academic risk! Please contact your mentor.";
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;

/// Derives dashboard alerts from an assessment plus the raw (unrounded,
/// unclamped) attendance percentage. The two alerts are independent; a
/// danger alert always precedes a warning.
pub fn derive_alerts(assessment: &RiskAssessment, raw_attendance_pct: f64) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if assessment.risk_level == RiskLevel::High {
        alerts.push(Alert {
            kind: AlertKind::Danger,
            message: DANGER_MESSAGE.to_string(),
        });
    }

    if raw_attendance_pct < LOW_ATTENDANCE_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::Warning,
            message: format!("Low attendance: {raw_attendance_pct:.1}%"),
        });
    }

    alerts
}
