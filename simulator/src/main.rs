mod telemetry;

use chrono::{Local, Utc};
use clap::Parser;
use rand::Rng;
use std::time::Duration;
use telemetry::{SnapshotItem, SnapshotRequest};
use tracing::{error, info, warn};

/// Plays the device role: posts randomized metric snapshots to a collector
/// on a fixed interval.
#[derive(Debug, Parser)]
struct Args {
    /// Collector endpoint accepting snapshot POSTs
    #[arg(
        long,
        env = "COLLECTOR_URL",
        default_value = "http://localhost:8080/api/v1/metric-snapshot"
    )]
    url: String,

    /// Seconds between snapshot rounds
    #[arg(long, env = "INTERVAL_SECS", default_value_t = 5)]
    interval_secs: u64,

    /// Number of simulated devices
    #[arg(long, env = "DEVICES", default_value_t = 3)]
    devices: i64,
}

const METRIC_TYPES: &[(i64, &str)] = &[(1, "RamUsage"), (2, "DownloadSpeed"), (3, "CpuLoad")];

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    info!("Starting snapshot simulator");
    info!(
        "Collector: {}, interval: {}s, devices: {}",
        args.url, args.interval_secs, args.devices
    );

    let client = reqwest::Client::new();
    let mut rounds = 0u64;

    loop {
        for device_id in 1..=args.devices {
            let request = generate_snapshot(&mut rand::thread_rng(), device_id);

            let payload = match serde_json::to_string(&request) {
                Ok(p) => p,
                Err(e) => {
                    error!("Failed to serialize snapshot: {}", e);
                    continue;
                }
            };

            match client
                .post(&args.url)
                .header("content-type", "application/json")
                .body(payload)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!(
                        "Collector rejected snapshot for device {}: {}",
                        device_id,
                        response.status()
                    );
                }
                Err(e) => {
                    error!("Failed to post snapshot for device {}: {}", device_id, e);
                }
            }
        }

        rounds += 1;
        if rounds % 10 == 0 {
            info!("Posted {} snapshot rounds", rounds);
        }

        tokio::time::sleep(Duration::from_secs(args.interval_secs)).await;
    }
}

fn generate_snapshot(rng: &mut impl Rng, device_id: i64) -> SnapshotRequest {
    let snapshots = METRIC_TYPES
        .iter()
        .map(|&(type_id, name)| SnapshotItem {
            device_metric_type_id: type_id,
            device_metric_type_name: name.to_string(),
            metric_value: match name {
                "RamUsage" | "CpuLoad" => {
                    if rng.gen_bool(0.05) {
                        rng.gen_range(90.0..100.0) // 5% spikes
                    } else {
                        rng.gen_range(10.0..70.0)
                    }
                }
                _ => rng.gen_range(0.5..250.0),
            },
        })
        .collect();

    SnapshotRequest {
        device_id,
        device_name: format!("sim-device-{device_id}"),
        snapshots,
        client_timestamp_utc: Utc::now().format("%d-%m-%Y %H:%M:%S").to_string(),
        client_timezone_mins: Local::now().offset().local_minus_utc() / 60,
    }
}
