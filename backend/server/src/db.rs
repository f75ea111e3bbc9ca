//! Database layer — migrations, lead mirror, and the TTL'd resume records.
//!
//! `payment_records` and `banner_dismissals` are the server-side rendition
//! of the client's persisted browser state: one row per funnel session,
//! carrying a creation timestamp and expiring after the fixed 12-hour
//! window.  Reads apply the TTL check themselves and delete expired rows,
//! so the background sweeper is an optimisation, not a correctness
//! requirement.

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;
use uuid::Uuid;

use funnel_core::persist::{BannerDismissRecord, PersistedPaymentRecord, ResumableStatus};
use funnel_core::ServiceType;

use crate::errors::{Result, ServerError};
use crate::gateway::LeadSubmission;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Leads
// ─────────────────────────────────────────────────────────

/// Mirror a submitted lead locally.  Re-submissions with the same lead id
/// are silently ignored to keep the mirror idempotent.
pub async fn insert_lead(
    pool: &SqlitePool,
    session_id: Uuid,
    lead_id: &str,
    custom_id: Option<&str>,
    payload: &LeadSubmission,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO leads
            (lead_id, custom_id, session_id, service, name, location,
             whatsapp_number, service_details, payment_choice,
             whatsapp_consent, submitted_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(lead_id)
    .bind(custom_id)
    .bind(session_id.to_string())
    .bind(payload.service.as_str())
    .bind(&payload.name)
    .bind(&payload.location)
    .bind(&payload.whatsapp_number)
    .bind(&payload.service_details)
    .bind(match payload.payment_choice {
        funnel_core::PaymentChoice::SubmitOnly => "submit-only",
        funnel_core::PaymentChoice::PayNow => "pay-now",
    })
    .bind(payload.whatsapp_consent)
    .bind(payload.submitted_at.timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Payment records
// ─────────────────────────────────────────────────────────

/// Write (or replace) the in-flight payment record for a session.
pub async fn save_payment_record(
    pool: &SqlitePool,
    session_id: Uuid,
    record: &PersistedPaymentRecord,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR REPLACE INTO payment_records
            (session_id, lead_id, service, name, whatsapp_number, status, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(session_id.to_string())
    .bind(&record.lead_id)
    .bind(record.service.as_str())
    .bind(&record.name)
    .bind(&record.whatsapp_number)
    .bind(record.status.as_str())
    .bind(record.created_at.timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark the session's record as failed.  The row is kept — a failed record
/// is what lets the banner offer a retry.
pub async fn mark_payment_record_failed(pool: &SqlitePool, session_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE payment_records SET status = 'failed' WHERE session_id = ?1")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete the session's record (payment succeeded).
pub async fn delete_payment_record(pool: &SqlitePool, session_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM payment_records WHERE session_id = ?1")
        .bind(session_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Read the session's record, applying the TTL: expired rows are deleted
/// and reported as absent.
pub async fn load_payment_record(
    pool: &SqlitePool,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<PersistedPaymentRecord>> {
    let row: Option<(String, String, String, Option<String>, String, i64)> = sqlx::query_as(
        r#"
        SELECT lead_id, service, name, whatsapp_number, status, created_at
        FROM   payment_records
        WHERE  session_id = ?1
        "#,
    )
    .bind(session_id.to_string())
    .fetch_optional(pool)
    .await?;

    let Some((lead_id, service, name, whatsapp_number, status, created_at)) = row else {
        return Ok(None);
    };

    let record = PersistedPaymentRecord {
        lead_id,
        service: ServiceType::from_slug(&service)
            .ok_or_else(|| ServerError::Gateway(format!("Unknown service in record: {service}")))?,
        name,
        whatsapp_number,
        status: ResumableStatus::from_str(&status)
            .ok_or_else(|| ServerError::Gateway(format!("Unknown record status: {status}")))?,
        created_at: Utc
            .timestamp_opt(created_at, 0)
            .single()
            .unwrap_or_else(Utc::now),
    };

    if record.is_expired(now) {
        delete_payment_record(pool, session_id).await?;
        return Ok(None);
    }

    Ok(Some(record))
}

// ─────────────────────────────────────────────────────────
// Banner dismissals
// ─────────────────────────────────────────────────────────

pub async fn load_banner_record(
    pool: &SqlitePool,
    session_id: Uuid,
) -> Result<Option<BannerDismissRecord>> {
    let row: Option<(i64, i64)> =
        sqlx::query_as("SELECT count, first_at FROM banner_dismissals WHERE session_id = ?1")
            .bind(session_id.to_string())
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(count, first_at)| BannerDismissRecord {
        count: count.max(0) as u32,
        first_at: Utc
            .timestamp_opt(first_at, 0)
            .single()
            .unwrap_or_else(Utc::now),
    }))
}

/// Register a banner dismissal and return the updated record.  Saturation
/// and window-reset live in the domain crate; this just persists the
/// result.
pub async fn register_banner_dismiss(
    pool: &SqlitePool,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> Result<BannerDismissRecord> {
    let previous = load_banner_record(pool, session_id).await?;
    let updated = BannerDismissRecord::register_dismiss(previous, now);

    sqlx::query(
        r#"
        INSERT OR REPLACE INTO banner_dismissals (session_id, count, first_at)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(session_id.to_string())
    .bind(updated.count as i64)
    .bind(updated.first_at.timestamp())
    .execute(pool)
    .await?;

    Ok(updated)
}

// ─────────────────────────────────────────────────────────
// Sweeper support
// ─────────────────────────────────────────────────────────

/// Purge every expired payment record and banner counter.  Returns the
/// number of rows removed.
pub async fn purge_expired(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64> {
    let cutoff = now.timestamp() - funnel_core::persist::RECORD_TTL_HOURS * 3_600;

    let payments = sqlx::query("DELETE FROM payment_records WHERE created_at < ?1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    let banners = sqlx::query("DELETE FROM banner_dismissals WHERE first_at < ?1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(payments + banners)
}
