use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

use crate::provider::DataProvider;

mod alerts;
mod db;
mod error;
mod models;
mod provider;
mod report;
mod risk;

#[derive(Parser)]
#[command(name = "student-risk")]
#[command(about = "Academic risk indicator for the student success platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import attendance records from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print a student's dashboard as JSON
    Dashboard {
        #[arg(long)]
        email: String,
    },
    /// Score risk across a mentor's students
    Roster {
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_attendance_csv(&pool, &csv).await?;
            println!("Inserted {inserted} attendance records from {}.", csv.display());
        }
        Commands::Dashboard { email } => {
            let student = db::fetch_student_by_email(&pool, &email)
                .await?
                .with_context(|| format!("no student with email {email}"))?;
            let provider = db::PgProvider::new(pool.clone());
            let records = provider.student_records(student.id).await?;
            let today = Utc::now().date_naive();
            let dashboard = report::assemble_dashboard(student, &records, today)?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Commands::Roster { email, limit } => {
            let mentor = db::fetch_mentor_by_email(&pool, &email)
                .await?
                .with_context(|| format!("no mentor with email {email}"))?;
            let students = db::fetch_roster(&pool, mentor.id).await?;

            if students.is_empty() {
                println!("No students assigned to {}.", mentor.name);
                return Ok(());
            }

            let provider = db::PgProvider::new(pool.clone());
            let roster = report::aggregate_roster(&provider, mentor.id, &students).await;

            println!("Students for {} ({}):", mentor.name, mentor.email);
            for entry in roster.entries.iter().take(limit) {
                println!(
                    "- {} ({}, {}) score {:.2} risk {} [attendance {:.2}, assignments {:.2}, exams {:.2}, backlogs {}]",
                    entry.name,
                    entry.roll_number,
                    entry.email,
                    entry.risk_score,
                    entry.risk_level,
                    entry.factors.attendance,
                    entry.factors.assignments,
                    entry.factors.exams,
                    entry.factors.backlogs
                );
            }
            if !roster.skipped.is_empty() {
                println!("Skipped {} students:", roster.skipped.len());
                for skipped in &roster.skipped {
                    println!("- {}: {}", skipped.student_id, skipped.reason);
                }
            }
        }
    }

    Ok(())
}
