//! Print collected usage statistics from a snapshot file.

use chrono::DateTime;
use clap::Parser;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::net::IpAddr;
use std::path::PathBuf;

use rpc_gateway::usage::IpStats;

#[derive(Parser)]
#[command(name = "usage-report")]
#[command(about = "Summarize per-IP usage statistics collected by the gateway", long_about = None)]
struct Cli {
    /// Path to the usage snapshot file.
    #[arg(short, long, default_value = "usage_stats.json")]
    file: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let file = File::open(&cli.file)?;
    let stats: HashMap<IpAddr, IpStats> = serde_json::from_reader(BufReader::new(file))?;

    let mut entries: Vec<(&IpAddr, &IpStats)> = stats.iter().collect();
    entries.sort_by_key(|(ip, _)| **ip);

    let mut total = 0u64;
    for (ip, stats) in entries {
        let mut statuses: Vec<(&u16, &u64)> = stats.statuses.iter().collect();
        statuses.sort_by_key(|(status, _)| **status);
        let breakdown = statuses
            .iter()
            .map(|(status, count)| format!("{status}:{count}"))
            .collect::<Vec<_>>()
            .join(" ");

        println!(
            "{:<40} {:>6}  [{}]  first {}  last {}",
            ip,
            stats.total(),
            breakdown,
            format_timestamp(stats.first_request_ms),
            format_timestamp(stats.last_request_ms),
        );
        total += stats.total();
    }

    println!("Total Requests: {total}");
    Ok(())
}

fn format_timestamp(ms: u64) -> String {
    DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}
