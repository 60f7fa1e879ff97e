use serde::Serialize;

/// One reported metric inside a snapshot POST.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotItem {
    pub device_metric_type_id: i64,
    pub device_metric_type_name: String,
    pub metric_value: f64,
}

/// POST body the collector expects for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRequest {
    pub device_id: i64,
    pub device_name: String,
    pub snapshots: Vec<SnapshotItem>,
    pub client_timestamp_utc: String,
    pub client_timezone_mins: i32,
}
