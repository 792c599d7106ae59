use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::ShiftRecord;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let records = vec![
        (
            "seed-001",
            "Harbor Grill",
            "harbor-01",
            NaiveDate::from_ymd_opt(2026, 8, 10).context("invalid date")?,
            "Alice Moreau",
            "alice.moreau@harborgrill.com",
            7.5,
            "ord-1001",
            248.40,
            4.6,
            4,
            4.2,
            3,
        ),
        (
            "seed-002",
            "Harbor Grill",
            "harbor-01",
            NaiveDate::from_ymd_opt(2026, 8, 11).context("invalid date")?,
            "Alice Moreau",
            "alice.moreau@harborgrill.com",
            6.0,
            "ord-1002",
            131.90,
            0.0,
            0,
            3.8,
            2,
        ),
        (
            "seed-003",
            "Harbor Grill",
            "harbor-01",
            NaiveDate::from_ymd_opt(2026, 8, 12).context("invalid date")?,
            "Tomas Keller",
            "tomas.keller@harborgrill.com",
            8.0,
            "ord-1002",
            96.10,
            4.1,
            3,
            0.0,
            0,
        ),
        (
            "seed-004",
            "Vine & Olive",
            "vine-02",
            NaiveDate::from_ymd_opt(2026, 8, 12).context("invalid date")?,
            "Priya Nair",
            "priya.nair@vineandolive.com",
            5.5,
            "ord-2001",
            187.25,
            4.9,
            5,
            4.7,
            4,
        ),
        (
            "seed-005",
            "Vine & Olive",
            "vine-02",
            NaiveDate::from_ymd_opt(2026, 8, 14).context("invalid date")?,
            "Priya Nair",
            "priya.nair@vineandolive.com",
            6.5,
            "ord-2002",
            74.00,
            3.2,
            2,
            3.5,
            3,
        ),
        (
            "seed-006",
            "Harbor Grill",
            "harbor-01",
            NaiveDate::from_ymd_opt(2026, 8, 4).context("invalid date")?,
            "Alice Moreau",
            "alice.moreau@harborgrill.com",
            7.0,
            "ord-0901",
            203.75,
            4.0,
            3,
            4.4,
            4,
        ),
        (
            "seed-007",
            "Vine & Olive",
            "vine-02",
            NaiveDate::from_ymd_opt(2026, 8, 5).context("invalid date")?,
            "Priya Nair",
            "priya.nair@vineandolive.com",
            6.0,
            "ord-1901",
            159.60,
            4.4,
            4,
            4.1,
            3,
        ),
        (
            "seed-008",
            "Vine & Olive",
            "vine-02",
            NaiveDate::from_ymd_opt(2026, 8, 6).context("invalid date")?,
            "Tomas Keller",
            "tomas.keller@harborgrill.com",
            4.0,
            "ord-1902",
            58.30,
            0.0,
            0,
            2.9,
            2,
        ),
    ];

    for (
        source_key,
        location,
        location_id,
        shift_date,
        waiter,
        waiter_email,
        hours_worked,
        order_id,
        order_revenue,
        avg_service_feedback,
        min_service_feedback,
        avg_cuisine_feedback,
        min_cuisine_feedback,
    ) in records
    {
        sqlx::query(
            r#"
            INSERT INTO shift_reporting.shift_records
            (id, location, location_id, shift_date, waiter, waiter_email, hours_worked,
             order_id, order_revenue, avg_service_feedback, min_service_feedback,
             avg_cuisine_feedback, min_cuisine_feedback, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(location)
        .bind(location_id)
        .bind(shift_date)
        .bind(waiter)
        .bind(waiter_email)
        .bind(hours_worked)
        .bind(order_id)
        .bind(order_revenue)
        .bind(avg_service_feedback)
        .bind(min_service_feedback)
        .bind(avg_cuisine_feedback)
        .bind(min_cuisine_feedback)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Records whose date falls within `[start, end]` inclusive, optionally
/// restricted to one location id.
pub async fn fetch_records(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
    location_id: Option<&str>,
) -> anyhow::Result<Vec<ShiftRecord>> {
    let mut query = String::from(
        "SELECT location, location_id, shift_date, waiter, waiter_email, \
         hours_worked, order_id, order_revenue, avg_service_feedback, \
         min_service_feedback, avg_cuisine_feedback, min_cuisine_feedback \
         FROM shift_reporting.shift_records \
         WHERE shift_date BETWEEN $1 AND $2",
    );

    if location_id.is_some() {
        query.push_str(" AND location_id = $3");
    }

    let mut rows = sqlx::query(&query).bind(start).bind(end);

    if let Some(value) = location_id {
        rows = rows.bind(value);
    }

    let fetched = rows
        .fetch_all(pool)
        .await
        .context("failed to retrieve shift records")?;
    let mut records = Vec::with_capacity(fetched.len());

    for row in fetched {
        records.push(ShiftRecord {
            location: row.get("location"),
            location_id: row.get("location_id"),
            date: row.get("shift_date"),
            waiter: row.get("waiter"),
            waiter_email: row.get("waiter_email"),
            hours_worked: row.get("hours_worked"),
            order_id: row.get("order_id"),
            order_revenue: row.get("order_revenue"),
            avg_service_feedback: row.get("avg_service_feedback"),
            min_service_feedback: row.get("min_service_feedback"),
            avg_cuisine_feedback: row.get("avg_cuisine_feedback"),
            min_cuisine_feedback: row.get("min_cuisine_feedback"),
        });
    }

    Ok(records)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        location: String,
        location_id: String,
        date: NaiveDate,
        waiter: String,
        waiter_email: String,
        hours_worked: f64,
        order_id: String,
        order_revenue: f64,
        avg_service_feedback: f64,
        min_service_feedback: i32,
        avg_cuisine_feedback: f64,
        min_cuisine_feedback: i32,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO shift_reporting.shift_records
            (id, location, location_id, shift_date, waiter, waiter_email, hours_worked,
             order_id, order_revenue, avg_service_feedback, min_service_feedback,
             avg_cuisine_feedback, min_cuisine_feedback, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.location)
        .bind(&row.location_id)
        .bind(row.date)
        .bind(&row.waiter)
        .bind(&row.waiter_email)
        .bind(row.hours_worked)
        .bind(&row.order_id)
        .bind(row.order_revenue)
        .bind(row.avg_service_feedback)
        .bind(row.min_service_feedback)
        .bind(row.avg_cuisine_feedback)
        .bind(row.min_cuisine_feedback)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
