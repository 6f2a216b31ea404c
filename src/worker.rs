use crate::assets::{AssetClient, PlatformAssets};
use crate::buffer::BufferTable;
use crate::compose::{compose_for_platform, resolve_placement, ComposeOptions};
use crate::error::Result;
use crate::platform::PlatformSpec;
use image::RgbImage;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

#[derive(Debug)]
pub enum WorkerEvent {
    Log(String),
    AssetsLoaded {
        code: String,
        table: BufferTable,
    },
    AssetsFailed {
        code: String,
        error: String,
    },
    ItemStarted(Uuid),
    ItemCompleted(Uuid, RgbImage),
    ItemFailed(Uuid, String),
    Finished {
        completed: usize,
        failed: usize,
    },
}

/// Everything needed to process one batch, detached from UI state.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub items: Vec<(Uuid, PathBuf)>,
    pub platform: PlatformSpec,
    pub product_type: String,
    pub manual: Option<(i64, i64)>,
    pub options: ComposeOptions,
}

fn send(events: &mpsc::UnboundedSender<WorkerEvent>, event: WorkerEvent) {
    let _ = events.send(event);
}

/// Fetches a platform's assets and reports its offset table.
pub async fn load_products(
    client: Arc<AssetClient>,
    platform: PlatformSpec,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    match client.load_platform(&platform).await {
        Ok(assets) => {
            send(
                &events,
                WorkerEvent::AssetsLoaded {
                    code: platform.code.clone(),
                    table: assets.buffers.clone(),
                },
            );
        }
        Err(e) => {
            error!("Failed to load assets for {}: {}", platform.code, e);
            send(
                &events,
                WorkerEvent::AssetsFailed {
                    code: platform.code.clone(),
                    error: e.to_string(),
                },
            );
        }
    }
}

/// Log line for the panel plus the short reason shown on the item card.
fn report_failure(
    events: &mpsc::UnboundedSender<WorkerEvent>,
    id: Uuid,
    log_message: String,
    reason: String,
) {
    send(events, WorkerEvent::Log(format!("❌ {}", log_message)));
    send(events, WorkerEvent::ItemFailed(id, reason));
}

fn process_one(path: &Path, assets: &PlatformAssets, job: &BatchJob) -> Result<RgbImage> {
    let product = image::open(path)?;
    let placement = resolve_placement(&assets.buffers, &job.product_type, job.manual)?;
    compose_for_platform(&product, assets, placement, &job.options)
}

/// Processes every item in order. Per-item errors are reported and the batch
/// continues; there are no retries.
pub async fn run_batch(
    client: Arc<AssetClient>,
    job: BatchJob,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    let job = Arc::new(job);
    let mut completed = 0;
    let mut failed = 0;

    let assets = match client.load_platform(&job.platform).await {
        Ok(assets) => assets,
        Err(e) => {
            let msg = format!("Could not load {} assets: {}", job.platform.code, e);
            error!("{}", msg);
            send(&events, WorkerEvent::Log(format!("❌ {}", msg)));
            for (id, _) in &job.items {
                send(&events, WorkerEvent::ItemFailed(*id, msg.clone()));
            }
            send(
                &events,
                WorkerEvent::Finished {
                    completed: 0,
                    failed: job.items.len(),
                },
            );
            return;
        }
    };

    for (id, path) in job.items.iter().cloned() {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        send(&events, WorkerEvent::ItemStarted(id));

        let task_assets = assets.clone();
        let task_job = job.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            process_one(&path, &task_assets, &task_job)
        })
        .await;

        match outcome {
            Ok(Ok(result)) => {
                completed += 1;
                info!("Processed {}", file_name);
                send(
                    &events,
                    WorkerEvent::Log(format!("✅ Processed: {}", file_name)),
                );
                send(&events, WorkerEvent::ItemCompleted(id, result));
            }
            Ok(Err(e)) => {
                failed += 1;
                let msg = format!("Error processing the image '{}': {}", file_name, e);
                error!("{}", msg);
                report_failure(&events, id, msg, e.to_string());
            }
            Err(join_error) => {
                failed += 1;
                let msg = format!("Worker task for '{}' panicked: {}", file_name, join_error);
                error!("{}", msg);
                report_failure(&events, id, msg, format!("internal error: {}", join_error));
            }
        }
    }

    info!("Batch finished: {} completed, {} failed", completed, failed);
    send(&events, WorkerEvent::Finished { completed, failed });
}
