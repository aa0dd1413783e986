use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use sizer_core::config::ClientConfig;
use sizer_core::crop::{AutoFitFactory, CropGeometry};
use sizer_core::selection::FsLoader;
use sizer_core::upload::{DirectorySink, HttpTransport, SubmissionResult};
use sizer_core::workbench::Workbench;
use tracing::debug;

use super::{load_config, RatioArg};
use crate::summary::{print_result, print_upload_summary};

#[derive(Args)]
pub struct UploadArgs {
    /// Input image
    pub file: PathBuf,

    /// Aspect ratio: free, W:H or a number (default 16:9)
    #[arg(long)]
    pub ratio: Option<RatioArg>,

    /// Crop box as X,Y,W,H in image pixels (default: largest box of the ratio)
    #[arg(long)]
    pub crop: Option<CropGeometry>,

    /// Minimum output size in MB
    #[arg(long)]
    pub min_size: Option<String>,

    /// Target (maximum) output size in MB
    #[arg(long)]
    pub max_size: Option<String>,

    /// Directory the processed file is saved into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base URL of the processing service
    #[arg(long)]
    pub server: Option<String>,

    /// Client config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long)]
    pub timeout: Option<u64>,
}

fn resolve_config(args: &UploadArgs) -> Result<ClientConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(ref server) = args.server {
        config.server_url = server.clone();
    }
    if let Some(ref output) = args.output {
        config.output_dir = output.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    Ok(config)
}

pub async fn run(args: &UploadArgs) -> Result<()> {
    let config = resolve_config(args)?;
    debug!(?config, "Client config");

    let transport = HttpTransport::new(config.timeout()).context("Failed to build HTTP client")?;
    let sink = DirectorySink::new(&config.output_dir);
    let mut bench = Workbench::new(AutoFitFactory, transport, sink, &config);

    if let Some(ref min) = args.min_size {
        bench.form.min_size_mb = min.clone();
    }
    if let Some(ref max) = args.max_size {
        bench.form.target_size_mb = max.clone();
    }

    bench
        .select_file(&FsLoader, &args.file)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    if let Some(ref ratio) = args.ratio {
        let ratio = ratio.resolve(&mut bench.form)?;
        bench.set_ratio(ratio);
    }
    if let Some(crop) = args.crop {
        if let Some(widget) = bench.widget_mut() {
            widget.select(crop);
        }
    }
    bench.confirm();

    if let Some(file) = bench.selection().pending() {
        print_upload_summary(
            bench.upload().url(),
            file,
            &bench.form,
            bench.selector().label(),
        );
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Uploading...");

    let result = bench.submit().await;
    pb.finish_and_clear();

    let result = result?;
    print_result(&result);
    if let SubmissionResult::Failure { message } = result {
        bail!(message);
    }

    Ok(())
}
