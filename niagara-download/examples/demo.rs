use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use niagara_download::{
    BatchRunner, DownloadConfig, DownloadTotals, FetchError, PointFetcher, PointRequest,
    TracingObserver, init_logging,
};

/// Pretends to be a station: most points have history, some are empty and a
/// few time out.
struct SimulatedStation;

#[async_trait]
impl PointFetcher for SimulatedStation {
    async fn fetch(&self, request: &PointRequest) -> Result<u64, FetchError> {
        let seed = request.point.bytes().fold(7u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64));
        tokio::time::sleep(Duration::from_millis(5 + seed % 40)).await;

        match seed % 20 {
            0 => Err(FetchError::Timeout),
            1 | 2 => Ok(seed % 40),
            _ => Ok(2_000 + seed % 50_000),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");

    let config = DownloadConfig::from_env().with_max_workers(16);
    let mut totals = DownloadTotals::new();

    for (district, count) in [("North Campus", 1_500), ("South Campus", 600)] {
        let points: Vec<PointRequest> = (0..count)
            .map(|i| {
                let point = format!("/{district}/AHU-{}/Point-{i}", i % 12);
                let url = format!("https://station.local/ord?history:{point}|bql:select *");
                PointRequest::new(point, url)
            })
            .collect();

        let runner = BatchRunner::new(Arc::new(SimulatedStation), config.clone())
            .with_district(district)
            .with_observer(Arc::new(TracingObserver));
        let stats = runner.run(points).await?;
        totals.push(district, stats);
    }

    println!();
    for line in totals.report_lines() {
        println!("{line}");
    }

    std::process::exit(totals.exit_code());
}
