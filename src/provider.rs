use std::future::Future;

use uuid::Uuid;

use crate::error::RiskError;
use crate::models::StudentRecords;

/// Source of raw per-student record sets. The engine only ever sees this
/// seam, so the database-backed provider and the in-memory one are
/// interchangeable.
///
/// Implementations report fetch failures (unknown id, upstream outage) as
/// `DataUnavailable`. A known student with no records returns empty sets;
/// that is valid zero input, not an error.
pub trait DataProvider {
    fn student_records(
        &self,
        student_id: Uuid,
    ) -> impl Future<Output = Result<StudentRecords, RiskError>> + Send;
}

/// In-memory provider for exercising the engine without a database.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryProvider {
    records: std::collections::HashMap<Uuid, StudentRecords>,
}

#[cfg(test)]
impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, student_id: Uuid, records: StudentRecords) {
        self.records.insert(student_id, records);
    }
}

#[cfg(test)]
impl DataProvider for MemoryProvider {
    async fn student_records(&self, student_id: Uuid) -> Result<StudentRecords, RiskError> {
        self.records
            .get(&student_id)
            .cloned()
            .ok_or_else(|| RiskError::DataUnavailable {
                student_id,
                reason: "student not known to provider".to_string(),
            })
    }
}
