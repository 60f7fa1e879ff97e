use serde::{Deserialize, Serialize};

/// One stored batch of metric readings from a device.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MetricSnapshot {
    pub metric_snapshot_id: i64,
    pub device_id: i64,
    pub client_timestamp_utc: String,
    pub client_timezone_mins: i32,
    pub server_timestamp_utc: String,
    pub server_timezone_mins: i32,
}

/// A value of a snapshot joined with its metric-type name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SnapshotValue {
    pub device_metric_type_id: i64,
    pub device_metric_type_name: String,
    pub metric_value: f64,
}

/// One reported metric inside a snapshot POST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub device_metric_type_id: i64,
    pub device_metric_type_name: String,
    pub metric_value: f64,
}

/// POST body recording one snapshot for a device.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRequest {
    pub device_id: i64,
    pub device_name: String,
    pub snapshots: Vec<SnapshotItem>,
    pub client_timestamp_utc: String,
    pub client_timezone_mins: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_post_body() {
        let body = r#"{
            "device_id": 1,
            "device_name": "A",
            "snapshots": [
                {"device_metric_type_id": 1, "device_metric_type_name": "RamUsage", "metric_value": 22.3},
                {"device_metric_type_id": 2, "device_metric_type_name": "DownloadSpeed", "metric_value": 5}
            ],
            "client_timestamp_utc": "12-12-2024 14:26:45",
            "client_timezone_mins": 0
        }"#;

        let request: SnapshotRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.device_id, 1);
        assert_eq!(request.device_name, "A");
        assert_eq!(request.snapshots.len(), 2);
        assert_eq!(request.snapshots[0].metric_value, 22.3);
        assert_eq!(request.snapshots[1].metric_value, 5.0);
        assert_eq!(request.client_timezone_mins, 0);
    }

    #[test]
    fn rejects_body_missing_device_id() {
        let body = r#"{
            "device_name": "A",
            "snapshots": [],
            "client_timestamp_utc": "12-12-2024 14:26:45",
            "client_timezone_mins": 0
        }"#;

        assert!(serde_json::from_str::<SnapshotRequest>(body).is_err());
    }
}
