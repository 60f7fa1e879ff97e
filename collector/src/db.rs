use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::model::{MetricSnapshot, SnapshotRequest, SnapshotValue};
use chrono::Local;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

pub async fn make_pool(cfg: &DatabaseConfig) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.url)
        .await?;

    info!("Database connection established");
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed");

    Ok(pool)
}

/// Server-side stamp for a snapshot: the local wall clock formatted
/// `DD-MM-YYYY HH:MM:SS` plus the OS timezone offset in minutes.
fn server_stamp() -> (String, i32) {
    let now = Local::now();
    let offset_mins = now.offset().local_minus_utc() / 60;
    (now.format("%d-%m-%Y %H:%M:%S").to_string(), offset_mins)
}

/// Records one snapshot and its values. The device and any unseen metric
/// types are created on the way; `ON CONFLICT DO NOTHING` keeps the first
/// reported name if two requests race on the same id. Everything runs in one
/// transaction, which rolls back on drop if any insert fails.
pub async fn record_snapshot(pool: &PgPool, request: &SnapshotRequest) -> Result<MetricSnapshot> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO devices (device_id, device_name)
         VALUES ($1, $2)
         ON CONFLICT (device_id) DO NOTHING",
    )
    .bind(request.device_id)
    .bind(&request.device_name)
    .execute(&mut *tx)
    .await?;

    let (server_timestamp_utc, server_timezone_mins) = server_stamp();
    let snapshot: MetricSnapshot = sqlx::query_as(
        "INSERT INTO metric_snapshots
             (device_id, client_timestamp_utc, client_timezone_mins,
              server_timestamp_utc, server_timezone_mins)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING metric_snapshot_id, device_id, client_timestamp_utc,
                   client_timezone_mins, server_timestamp_utc, server_timezone_mins",
    )
    .bind(request.device_id)
    .bind(&request.client_timestamp_utc)
    .bind(request.client_timezone_mins)
    .bind(&server_timestamp_utc)
    .bind(server_timezone_mins)
    .fetch_one(&mut *tx)
    .await?;

    for item in &request.snapshots {
        sqlx::query(
            "INSERT INTO device_metric_types (device_metric_type_id, device_id, name)
             VALUES ($1, $2, $3)
             ON CONFLICT (device_metric_type_id, device_id) DO NOTHING",
        )
        .bind(item.device_metric_type_id)
        .bind(request.device_id)
        .bind(&item.device_metric_type_name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO metric_values (metric_snapshot_id, device_metric_type_id, value)
             VALUES ($1, $2, $3)",
        )
        .bind(snapshot.metric_snapshot_id)
        .bind(item.device_metric_type_id)
        .bind(item.metric_value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        "Recorded snapshot {} with {} values for device {}",
        snapshot.metric_snapshot_id,
        request.snapshots.len(),
        request.device_id
    );

    Ok(snapshot)
}

/// Every stored snapshot, in storage order. An empty table is not an error.
pub async fn list_snapshots(pool: &PgPool) -> Result<Vec<MetricSnapshot>> {
    let snapshots: Vec<MetricSnapshot> = sqlx::query_as(
        "SELECT metric_snapshot_id, device_id, client_timestamp_utc,
                client_timezone_mins, server_timestamp_utc, server_timezone_mins
         FROM metric_snapshots",
    )
    .fetch_all(pool)
    .await?;

    if snapshots.is_empty() {
        debug!("No snapshots stored yet");
    }

    Ok(snapshots)
}

/// Single snapshot by id, values not joined.
pub async fn get_snapshot(
    pool: &PgPool,
    metric_snapshot_id: i64,
) -> Result<Option<MetricSnapshot>> {
    let snapshot = sqlx::query_as(
        "SELECT metric_snapshot_id, device_id, client_timestamp_utc,
                client_timezone_mins, server_timestamp_utc, server_timezone_mins
         FROM metric_snapshots
         WHERE metric_snapshot_id = $1",
    )
    .bind(metric_snapshot_id)
    .fetch_optional(pool)
    .await?;

    Ok(snapshot)
}

/// The values of one snapshot joined with their metric-type names.
pub async fn snapshot_values(
    pool: &PgPool,
    metric_snapshot_id: i64,
) -> Result<Vec<SnapshotValue>> {
    let values: Vec<SnapshotValue> = sqlx::query_as(
        "SELECT v.device_metric_type_id,
                t.name AS device_metric_type_name,
                v.value AS metric_value
         FROM metric_values v
         JOIN metric_snapshots s ON s.metric_snapshot_id = v.metric_snapshot_id
         JOIN device_metric_types t
              ON t.device_metric_type_id = v.device_metric_type_id
             AND t.device_id = s.device_id
         WHERE v.metric_snapshot_id = $1",
    )
    .bind(metric_snapshot_id)
    .fetch_all(pool)
    .await?;

    Ok(values)
}

/// Most recent value for a device-name/metric-name pair. Backs the gauge
/// read path so dashboards never touch the tables directly.
pub async fn latest_value(
    pool: &PgPool,
    device_name: &str,
    metric_name: &str,
) -> Result<Option<f64>> {
    let row: Option<(f64,)> = sqlx::query_as(
        "SELECT v.value
         FROM metric_values v
         JOIN metric_snapshots s ON s.metric_snapshot_id = v.metric_snapshot_id
         JOIN device_metric_types t
              ON t.device_metric_type_id = v.device_metric_type_id
             AND t.device_id = s.device_id
         JOIN devices d ON d.device_id = s.device_id
         WHERE d.device_name = $1 AND t.name = $2
         ORDER BY s.metric_snapshot_id DESC
         LIMIT 1",
    )
    .bind(device_name)
    .bind(metric_name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(value,)| value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn server_stamp_format_round_trips() {
        let (timestamp, _) = server_stamp();

        assert!(NaiveDateTime::parse_from_str(&timestamp, "%d-%m-%Y %H:%M:%S").is_ok());
    }

    #[test]
    fn server_stamp_offset_is_plausible() {
        let (_, offset_mins) = server_stamp();

        // UTC-12:00 .. UTC+14:00
        assert!((-12 * 60..=14 * 60).contains(&offset_mins));
    }
}
