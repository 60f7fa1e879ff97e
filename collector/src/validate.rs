use crate::errors::{Error, Result};
use crate::model::SnapshotRequest;

/// Validates a snapshot request before it reaches the database
pub fn validate(request: &SnapshotRequest) -> Result<()> {
    if request.device_name.trim().is_empty() {
        return Err(Error::Validation("device_name cannot be empty".to_string()));
    }

    if request.client_timestamp_utc.trim().is_empty() {
        return Err(Error::Validation(
            "client_timestamp_utc cannot be empty".to_string(),
        ));
    }

    for item in &request.snapshots {
        if item.device_metric_type_name.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Metric type {} has an empty name",
                item.device_metric_type_id
            )));
        }

        if !item.metric_value.is_finite() {
            return Err(Error::Validation(format!(
                "Metric value for type {} is not a finite number",
                item.device_metric_type_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotItem;

    fn request() -> SnapshotRequest {
        SnapshotRequest {
            device_id: 1,
            device_name: "dev-1".to_string(),
            snapshots: vec![SnapshotItem {
                device_metric_type_id: 1,
                device_metric_type_name: "RamUsage".to_string(),
                metric_value: 22.3,
            }],
            client_timestamp_utc: "12-12-2024 14:26:45".to_string(),
            client_timezone_mins: 0,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn test_empty_device_name() {
        let mut req = request();
        req.device_name = "".to_string();

        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_empty_client_timestamp() {
        let mut req = request();
        req.client_timestamp_utc = "  ".to_string();

        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_empty_metric_type_name() {
        let mut req = request();
        req.snapshots[0].device_metric_type_name = "".to_string();

        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_non_finite_metric_value() {
        let mut req = request();
        req.snapshots[0].metric_value = f64::NAN;

        assert!(validate(&req).is_err());

        req.snapshots[0].metric_value = f64::INFINITY;

        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_empty_snapshot_list_is_allowed() {
        let mut req = request();
        req.snapshots.clear();

        assert!(validate(&req).is_ok());
    }
}
