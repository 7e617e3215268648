//! Per-IP usage statistics with best-effort snapshots.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Observed traffic for one IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpStats {
    /// Status code → occurrence count.
    pub statuses: HashMap<u16, u64>,
    /// First request timestamp, unix milliseconds.
    pub first_request_ms: u64,
    /// Most recent request timestamp, unix milliseconds.
    pub last_request_ms: u64,
}

impl IpStats {
    /// Total requests observed for this IP across all status codes.
    pub fn total(&self) -> u64 {
        self.statuses.values().sum()
    }
}

/// Thread-safe per-IP statistics table.
///
/// `record` is infallible and in-memory; a statistics failure can never
/// affect a client-visible outcome. Snapshots to disk are best-effort.
pub struct UsageRecorder {
    stats: DashMap<IpAddr, IpStats>,
    snapshot_path: Option<PathBuf>,
}

impl UsageRecorder {
    /// Create an empty recorder. A `None` path disables snapshots.
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            stats: DashMap::new(),
            snapshot_path,
        }
    }

    /// Load a previous snapshot if the file exists, otherwise start empty.
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let recorder = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let map: HashMap<IpAddr, IpStats> = serde_json::from_reader(reader)?;

            for (ip, stats) in map {
                recorder.stats.insert(ip, stats);
            }
            tracing::info!(
                entries = recorder.stats.len(),
                path = %path.display(),
                "Loaded usage statistics snapshot"
            );
        }
        Ok(recorder)
    }

    /// Record one completed request for `ip` with the given response status.
    pub fn record(&self, ip: IpAddr, status: u16) {
        let now = unix_millis();
        let mut entry = self.stats.entry(ip).or_insert_with(|| IpStats {
            statuses: HashMap::new(),
            first_request_ms: now,
            last_request_ms: now,
        });
        *entry.statuses.entry(status).or_insert(0) += 1;
        entry.last_request_ms = now;
    }

    /// Write the current table to the snapshot file, if one is configured.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.snapshot_path {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);

            let map: HashMap<IpAddr, IpStats> = self
                .stats
                .iter()
                .map(|r| (*r.key(), r.value().clone()))
                .collect();

            serde_json::to_writer_pretty(writer, &map)?;
            tracing::debug!(entries = map.len(), "Saved usage statistics snapshot");
        }
        Ok(())
    }

    /// Number of IPs with recorded traffic.
    pub fn ip_count(&self) -> usize {
        self.stats.len()
    }

    /// Total requests recorded across all IPs.
    pub fn total_requests(&self) -> u64 {
        self.stats.iter().map(|r| r.value().total()).sum()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
