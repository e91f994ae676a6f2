use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::RiskError;
use crate::models::{
    AssignmentRecord, AttendanceRecord, BacklogRecord, ExamRecord, Mentor, Student, StudentRecords,
};
use crate::provider::DataProvider;

/// Data Provider backed by the platform's Postgres instance. The pool is
/// injected once at startup; nothing here opens connections ad hoc.
pub struct PgProvider {
    pool: PgPool,
}

impl PgProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DataProvider for PgProvider {
    async fn student_records(&self, student_id: Uuid) -> Result<StudentRecords, RiskError> {
        let known = sqlx::query("SELECT id FROM student_success.students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| unavailable(student_id, &err))?;
        if known.is_none() {
            return Err(RiskError::DataUnavailable {
                student_id,
                reason: "unknown student id".to_string(),
            });
        }

        let attendance = sqlx::query(
            "SELECT student_id, occurred_on, status \
             FROM student_success.attendance \
             WHERE student_id = $1 \
             ORDER BY occurred_on",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| unavailable(student_id, &err))?
        .into_iter()
        .map(|row| AttendanceRecord {
            student_id: row.get("student_id"),
            occurred_on: row.get("occurred_on"),
            status: row.get("status"),
        })
        .collect();

        let assignments = sqlx::query(
            "SELECT student_id, title, due_date, status \
             FROM student_success.assignments \
             WHERE student_id = $1 \
             ORDER BY due_date",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| unavailable(student_id, &err))?
        .into_iter()
        .map(|row| AssignmentRecord {
            student_id: row.get("student_id"),
            title: row.get("title"),
            due_date: row.get("due_date"),
            status: row.get("status"),
        })
        .collect();

        let exams = sqlx::query(
            "SELECT student_id, subject, exam_date, marks_obtained, total_marks \
             FROM student_success.exams \
             WHERE student_id = $1 \
             ORDER BY exam_date",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| unavailable(student_id, &err))?
        .into_iter()
        .map(|row| ExamRecord {
            student_id: row.get("student_id"),
            subject: row.get("subject"),
            exam_date: row.get("exam_date"),
            marks_obtained: row.get("marks_obtained"),
            total_marks: row.get("total_marks"),
        })
        .collect();

        let backlogs = sqlx::query(
            "SELECT student_id, subject, status \
             FROM student_success.backlogs \
             WHERE student_id = $1 \
             ORDER BY subject",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| unavailable(student_id, &err))?
        .into_iter()
        .map(|row| BacklogRecord {
            student_id: row.get("student_id"),
            subject: row.get("subject"),
            status: row.get("status"),
        })
        .collect();

        Ok(StudentRecords {
            attendance,
            assignments,
            exams,
            backlogs,
        })
    }
}

fn unavailable(student_id: Uuid, err: &sqlx::Error) -> RiskError {
    RiskError::DataUnavailable {
        student_id,
        reason: err.to_string(),
    }
}

const SCHEMA: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS student_success",
    "CREATE TABLE IF NOT EXISTS student_success.mentors (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS student_success.students (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        roll_number TEXT NOT NULL,
        mentor_id UUID REFERENCES student_success.mentors(id)
    )",
    "CREATE TABLE IF NOT EXISTS student_success.attendance (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES student_success.students(id),
        occurred_on DATE NOT NULL,
        status TEXT NOT NULL,
        UNIQUE (student_id, occurred_on)
    )",
    "CREATE TABLE IF NOT EXISTS student_success.assignments (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES student_success.students(id),
        title TEXT NOT NULL,
        due_date DATE NOT NULL,
        status TEXT NOT NULL,
        UNIQUE (student_id, title)
    )",
    "CREATE TABLE IF NOT EXISTS student_success.exams (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES student_success.students(id),
        subject TEXT NOT NULL,
        exam_date DATE NOT NULL,
        marks_obtained DOUBLE PRECISION NOT NULL,
        total_marks DOUBLE PRECISION NOT NULL,
        UNIQUE (student_id, subject, exam_date)
    )",
    "CREATE TABLE IF NOT EXISTS student_success.backlogs (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES student_success.students(id),
        subject TEXT NOT NULL,
        status TEXT NOT NULL,
        UNIQUE (student_id, subject)
    )",
];

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let mentor_id = Uuid::parse_str("7c9a1b42-5f6e-4d3a-9c8b-2e1f0a6d4b53")?;
    sqlx::query(
        r#"
        INSERT INTO student_success.mentors (id, name, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
        "#,
    )
    .bind(mentor_id)
    .bind("Priya Raman")
    .bind("priya.raman@campus.edu")
    .execute(pool)
    .await?;

    let students = vec![
        (
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2")?,
            "Aditi Verma",
            "aditi.verma@campus.edu",
            "CS2301",
        ),
        (
            Uuid::parse_str("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc")?,
            "Rohan Iyer",
            "rohan.iyer@campus.edu",
            "CS2302",
        ),
        (
            Uuid::parse_str("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2")?,
            "Sana Qureshi",
            "sana.qureshi@campus.edu",
            "CS2303",
        ),
    ];

    for (id, name, email, roll_number) in students {
        sqlx::query(
            r#"
            INSERT INTO student_success.students (id, name, email, roll_number, mentor_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, roll_number = EXCLUDED.roll_number,
                mentor_id = EXCLUDED.mentor_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(roll_number)
        .bind(mentor_id)
        .execute(pool)
        .await?;
    }

    // Aditi tracks healthy, Rohan middling, Sana at risk.
    let attendance = vec![
        ("aditi.verma@campus.edu", 1, "present"),
        ("aditi.verma@campus.edu", 2, "present"),
        ("aditi.verma@campus.edu", 3, "present"),
        ("aditi.verma@campus.edu", 4, "present"),
        ("aditi.verma@campus.edu", 5, "absent"),
        ("rohan.iyer@campus.edu", 1, "present"),
        ("rohan.iyer@campus.edu", 2, "absent"),
        ("rohan.iyer@campus.edu", 3, "present"),
        ("rohan.iyer@campus.edu", 4, "present"),
        ("rohan.iyer@campus.edu", 5, "absent"),
        ("sana.qureshi@campus.edu", 1, "absent"),
        ("sana.qureshi@campus.edu", 2, "absent"),
        ("sana.qureshi@campus.edu", 3, "present"),
        ("sana.qureshi@campus.edu", 4, "absent"),
        ("sana.qureshi@campus.edu", 5, "absent"),
    ];
    for (email, day, status) in attendance {
        let student_id = student_id_by_email(pool, email).await?;
        let occurred_on =
            NaiveDate::from_ymd_opt(2026, 6, day).context("invalid seed date")?;
        sqlx::query(
            r#"
            INSERT INTO student_success.attendance (id, student_id, occurred_on, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, occurred_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(occurred_on)
        .bind(status)
        .execute(pool)
        .await?;
    }

    let assignments = vec![
        ("aditi.verma@campus.edu", "Data Structures Lab 4", 20, "submitted"),
        ("aditi.verma@campus.edu", "Operating Systems Quiz", 28, "pending"),
        ("rohan.iyer@campus.edu", "Data Structures Lab 4", 20, "submitted"),
        ("rohan.iyer@campus.edu", "Operating Systems Quiz", 28, "pending"),
        ("sana.qureshi@campus.edu", "Data Structures Lab 4", 20, "pending"),
        ("sana.qureshi@campus.edu", "Operating Systems Quiz", 28, "pending"),
    ];
    for (email, title, day, status) in assignments {
        let student_id = student_id_by_email(pool, email).await?;
        let due_date = NaiveDate::from_ymd_opt(2026, 6, day).context("invalid seed date")?;
        sqlx::query(
            r#"
            INSERT INTO student_success.assignments (id, student_id, title, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, title) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(title)
        .bind(due_date)
        .bind(status)
        .execute(pool)
        .await?;
    }

    let exams = vec![
        ("aditi.verma@campus.edu", "Mathematics III", 10, 88.0, 100.0),
        ("aditi.verma@campus.edu", "Computer Networks", 12, 41.0, 50.0),
        ("rohan.iyer@campus.edu", "Mathematics III", 10, 62.0, 100.0),
        ("rohan.iyer@campus.edu", "Computer Networks", 12, 28.0, 50.0),
        ("sana.qureshi@campus.edu", "Mathematics III", 10, 31.0, 100.0),
        ("sana.qureshi@campus.edu", "Computer Networks", 12, 14.0, 50.0),
    ];
    for (email, subject, day, marks_obtained, total_marks) in exams {
        let student_id = student_id_by_email(pool, email).await?;
        let exam_date = NaiveDate::from_ymd_opt(2026, 6, day).context("invalid seed date")?;
        sqlx::query(
            r#"
            INSERT INTO student_success.exams
            (id, student_id, subject, exam_date, marks_obtained, total_marks)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (student_id, subject, exam_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(subject)
        .bind(exam_date)
        .bind(marks_obtained)
        .bind(total_marks)
        .execute(pool)
        .await?;
    }

    let backlogs = vec![
        ("rohan.iyer@campus.edu", "Digital Logic", "pending"),
        ("sana.qureshi@campus.edu", "Digital Logic", "pending"),
        ("sana.qureshi@campus.edu", "Discrete Mathematics", "pending"),
        ("sana.qureshi@campus.edu", "Engineering Physics", "cleared"),
    ];
    for (email, subject, status) in backlogs {
        let student_id = student_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO student_success.backlogs (id, student_id, subject, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, subject) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(subject)
        .bind(status)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn student_id_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query("SELECT id FROM student_success.students WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no student with email {email}"))?;
    Ok(row.get("id"))
}

pub async fn fetch_student_by_email(
    pool: &PgPool,
    email: &str,
) -> anyhow::Result<Option<Student>> {
    let row = sqlx::query(
        "SELECT id, name, email, roll_number \
         FROM student_success.students WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Student {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        roll_number: row.get("roll_number"),
    }))
}

pub async fn fetch_mentor_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Option<Mentor>> {
    let row = sqlx::query("SELECT id, name, email FROM student_success.mentors WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| Mentor {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }))
}

pub async fn fetch_roster(pool: &PgPool, mentor_id: Uuid) -> anyhow::Result<Vec<Student>> {
    let rows = sqlx::query(
        "SELECT id, name, email, roll_number \
         FROM student_success.students \
         WHERE mentor_id = $1 \
         ORDER BY name",
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Student {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            roll_number: row.get("roll_number"),
        })
        .collect())
}

pub async fn import_attendance_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        name: String,
        email: String,
        roll_number: String,
        occurred_on: NaiveDate,
        status: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let student_id: Uuid = sqlx::query(
            r#"
            INSERT INTO student_success.students (id, name, email, roll_number)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, roll_number = EXCLUDED.roll_number
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.roll_number)
        .fetch_one(pool)
        .await?
        .get("id");

        let result = sqlx::query(
            r#"
            INSERT INTO student_success.attendance (id, student_id, occurred_on, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (student_id, occurred_on) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(row.occurred_on)
        .bind(&row.status)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
