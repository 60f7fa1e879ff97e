use crate::config::RouteConfig;
use crate::db;
use crate::metrics::{
    DB_FAILURES_TOTAL, INVALID_REQUESTS_TOTAL, RECORD_LATENCY_SECONDS, SNAPSHOTS_TOTAL,
    SNAPSHOT_VALUES_TOTAL,
};
use crate::model::SnapshotRequest;
use crate::validate::validate;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone)]
struct AppState {
    pool: PgPool,
}

/// Success wrapper returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub status: &'static str,
    pub time: String,
}

/// Failure wrapper; `error` carries the fault message verbatim.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status: &'static str,
    pub time: String,
}

fn response_time() -> String {
    Local::now().format("%H:%M:%S %d-%m-%Y").to_string()
}

fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            data,
            status: "success",
            time: response_time(),
        }),
    )
        .into_response()
}

fn failure(code: StatusCode, error: String) -> Response {
    (
        code,
        Json(ErrorEnvelope {
            error,
            status: "failure",
            time: response_time(),
        }),
    )
        .into_response()
}

pub fn create_router(pool: PgPool, routes: &RouteConfig) -> Router {
    let state = AppState { pool };

    Router::new()
        .route(&routes.post_metric_snapshot, post(post_metric_snapshot))
        .route(&routes.get_all_metrics, get(get_all_metrics))
        .route(
            &format!("{}/:metric_snapshot_id", routes.get_metric_snapshot),
            get(get_metric_snapshot),
        )
        .route(
            &format!("{}/:metric_snapshot_id/values", routes.get_metric_snapshot),
            get(get_snapshot_values),
        )
        .route(&routes.get_latest_value, get(get_latest_value))
        .with_state(state)
}

async fn post_metric_snapshot(
    State(state): State<AppState>,
    payload: Result<Json<SnapshotRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            INVALID_REQUESTS_TOTAL.inc();
            return failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if let Err(e) = validate(&request) {
        INVALID_REQUESTS_TOTAL.inc();
        return failure(StatusCode::BAD_REQUEST, e.to_string());
    }

    let start = Instant::now();
    match db::record_snapshot(&state.pool, &request).await {
        Ok(snapshot) => {
            SNAPSHOTS_TOTAL.inc();
            SNAPSHOT_VALUES_TOTAL.inc_by(request.snapshots.len() as f64);
            RECORD_LATENCY_SECONDS.observe(start.elapsed().as_secs_f64());
            info!(
                "Recorded snapshot {} for device {}",
                snapshot.metric_snapshot_id, request.device_id
            );
            success(&request.snapshots)
        }
        Err(e) => {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to record snapshot: {}", e);
            failure(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

async fn get_all_metrics(State(state): State<AppState>) -> Response {
    match db::list_snapshots(&state.pool).await {
        Ok(snapshots) => success(snapshots),
        Err(e) => {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to list snapshots: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_metric_snapshot(
    State(state): State<AppState>,
    Path(metric_snapshot_id): Path<i64>,
) -> Response {
    match db::get_snapshot(&state.pool, metric_snapshot_id).await {
        Ok(Some(snapshot)) => success(snapshot),
        Ok(None) => failure(
            StatusCode::NOT_FOUND,
            format!("snapshot {metric_snapshot_id} not found"),
        ),
        Err(e) => {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to fetch snapshot {}: {}", metric_snapshot_id, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn get_snapshot_values(
    State(state): State<AppState>,
    Path(metric_snapshot_id): Path<i64>,
) -> Response {
    match db::get_snapshot(&state.pool, metric_snapshot_id).await {
        Ok(Some(_)) => match db::snapshot_values(&state.pool, metric_snapshot_id).await {
            Ok(values) => success(values),
            Err(e) => {
                DB_FAILURES_TOTAL.inc();
                error!(
                    "Failed to fetch values of snapshot {}: {}",
                    metric_snapshot_id, e
                );
                failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        Ok(None) => failure(
            StatusCode::NOT_FOUND,
            format!("snapshot {metric_snapshot_id} not found"),
        ),
        Err(e) => {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to fetch snapshot {}: {}", metric_snapshot_id, e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LatestValueQuery {
    device_name: String,
    metric_name: String,
}

async fn get_latest_value(
    State(state): State<AppState>,
    Query(params): Query<LatestValueQuery>,
) -> Response {
    match db::latest_value(&state.pool, &params.device_name, &params.metric_name).await {
        Ok(Some(value)) => success(value),
        Ok(None) => failure(
            StatusCode::NOT_FOUND,
            format!(
                "no values for device {:?} metric {:?}",
                params.device_name, params.metric_name
            ),
        ),
        Err(e) => {
            DB_FAILURES_TOTAL.inc();
            error!("Failed to fetch latest value: {}", e);
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn success_envelope_shape() {
        let envelope = Envelope {
            data: vec![1, 2],
            status: "success",
            time: response_time(),
        };
        let body = serde_json::to_value(&envelope).unwrap();

        assert_eq!(body["status"], "success");
        assert_eq!(body["data"][1], 2);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let envelope = ErrorEnvelope {
            error: "snapshot 7 not found".to_string(),
            status: "failure",
            time: response_time(),
        };
        let body = serde_json::to_value(&envelope).unwrap();

        assert_eq!(body["status"], "failure");
        assert_eq!(body["error"], "snapshot 7 not found");
        assert!(body.get("data").is_none());
    }

    #[test]
    fn response_time_format_round_trips() {
        assert!(NaiveDateTime::parse_from_str(&response_time(), "%H:%M:%S %d-%m-%Y").is_ok());
    }
}
