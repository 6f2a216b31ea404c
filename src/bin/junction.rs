use clap::{Args, Parser, Subcommand};
use image_junction::analyzer::{layout_images, merge_images, Backdrop, ImageAnalyzer, Layout};
use image_junction::archive::{build_archive, DEFAULT_ARCHIVE_NAME};
use image_junction::assets::AssetClient;
use image_junction::batch::Batch;
use image_junction::compose::{ComposeOptions, LogoOverlay};
use image_junction::config::AppConfig;
use image_junction::platform::find_platform;
use image_junction::worker::{run_batch, BatchJob, WorkerEvent};
use image_junction::{JunctionError, Result};
use image::RgbImage;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Headless counterpart of the Image Junction window.
#[derive(Parser)]
#[command(name = "junction", version)]
struct Cli {
    /// Config file to read platforms and defaults from
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Composite product photos onto a platform template and write a ZIP
    Compose(ComposeArgs),
    /// Print the content bounding box of an image
    Bounds {
        file: PathBuf,
        #[arg(long)]
        tolerance: Option<u8>,
        /// Treat near-black instead of near-white as empty
        #[arg(long)]
        black: bool,
    },
    /// Concatenate images side by side or stacked
    Layout {
        #[arg(long, default_value = "horizontal")]
        direction: Layout,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Blend two images
    Blend {
        first: PathBuf,
        second: PathBuf,
        #[arg(long, default_value_t = 0.5)]
        alpha: f32,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct ComposeArgs {
    #[arg(short, long)]
    platform: Option<String>,
    /// Product type from the platform's offset table
    #[arg(long)]
    product: Option<String>,
    /// Manual top offset; requires --buffer2
    #[arg(long, requires = "buffer2", allow_negative_numbers = true)]
    buffer1: Option<i64>,
    /// Manual target height; requires --buffer1
    #[arg(long, requires = "buffer1")]
    buffer2: Option<i64>,
    #[arg(long)]
    tolerance: Option<u8>,
    #[arg(long)]
    quality: Option<u8>,
    #[arg(long)]
    logo: Option<PathBuf>,
    #[arg(long, default_value_t = 20)]
    logo_height: u32,
    #[arg(long, default_value_t = 10)]
    logo_x: i64,
    #[arg(long, default_value_t = 10)]
    logo_y: i64,
    #[arg(short, long, default_value = DEFAULT_ARCHIVE_NAME)]
    output: PathBuf,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

async fn compose(config: AppConfig, args: ComposeArgs) -> Result<()> {
    let code = args.platform.unwrap_or(config.selected_platform.clone());
    let platform = find_platform(&config.platforms, &code)?.clone();

    let manual = args.buffer1.zip(args.buffer2);
    let product_type = match (args.product, manual) {
        (Some(product), _) => product,
        (None, Some(_)) => String::new(),
        (None, None) => config
            .selected_product
            .clone()
            .ok_or_else(|| JunctionError::UnknownProduct("(none given)".to_string()))?,
    };

    let logo = match args.logo {
        Some(path) => Some(LogoOverlay {
            image: image::open(&path)?.to_rgba8(),
            height: args.logo_height,
            x: args.logo_x,
            y: args.logo_y,
        }),
        None => None,
    };

    let mut batch = Batch::new();
    for path in args.files {
        match image::image_dimensions(&path) {
            Ok((w, h)) => {
                if batch.add_file(path.clone(), w, h).is_none() {
                    warn!("Skipping duplicate {}", path.display());
                }
            }
            Err(e) => error!("Error processing the image '{}': {}", path.display(), e),
        }
    }

    let job = BatchJob {
        items: batch
            .items()
            .iter()
            .map(|item| (item.id, item.file_path.clone()))
            .collect(),
        platform: platform.clone(),
        product_type,
        manual,
        options: ComposeOptions {
            tolerance: args.tolerance.unwrap_or(config.tolerance),
            logo,
            ..ComposeOptions::default()
        },
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    run_batch(Arc::new(AssetClient::new()), job, tx).await;
    while let Some(event) = rx.recv().await {
        match event {
            WorkerEvent::ItemCompleted(id, result) => {
                if let Some(item) = batch.get_item_mut(id) {
                    item.complete(result);
                }
            }
            WorkerEvent::ItemFailed(id, message) => {
                if let Some(item) = batch.get_item_mut(id) {
                    item.fail(message);
                }
            }
            _ => {}
        }
    }

    let stats = batch.stats();
    let bytes = build_archive(
        batch
            .completed()
            .map(|(item, result)| (item.file_name.as_str(), result)),
        &platform.archive_suffix,
        args.quality.unwrap_or(config.jpeg_quality),
    )?;
    std::fs::write(&args.output, bytes)?;
    info!(
        "Wrote {} ({} images, {} failed)",
        args.output.display(),
        stats.completed,
        stats.failed
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);

    match cli.command {
        Command::Compose(args) => compose(config, args).await,
        Command::Bounds {
            file,
            tolerance,
            black,
        } => {
            let analyzer =
                ImageAnalyzer::open(&file)?.with_tolerance(tolerance.unwrap_or(config.tolerance));
            let backdrop = if black { Backdrop::Black } else { Backdrop::White };
            let bounds = analyzer
                .content_bounds(backdrop)
                .ok_or(JunctionError::BlankImage {
                    backdrop: backdrop.label(),
                })?;
            println!(
                "{} {} {} {}",
                bounds.left, bounds.top, bounds.right, bounds.bottom
            );
            Ok(())
        }
        Command::Layout {
            direction,
            output,
            files,
        } => {
            let images = files
                .iter()
                .map(|path| -> Result<RgbImage> { Ok(image::open(path)?.to_rgb8()) })
                .collect::<Result<Vec<_>>>()?;
            layout_images(&images, direction)?.save(&output)?;
            info!("Wrote {}", output.display());
            Ok(())
        }
        Command::Blend {
            first,
            second,
            alpha,
            output,
        } => {
            let merged = merge_images(&image::open(&first)?, &image::open(&second)?, alpha);
            merged.save(&output)?;
            info!("Wrote {}", output.display());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
