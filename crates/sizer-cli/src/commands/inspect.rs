use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sizer_core::crop::{AutoFitFactory, CropSession};
use sizer_core::form::UploadForm;
use sizer_core::selection::{FileLoader, FileSelection, FsLoader};

use super::RatioArg;

#[derive(Args)]
pub struct InspectArgs {
    /// Input image
    pub file: PathBuf,

    /// Aspect ratio: free, W:H or a number (default 16:9)
    #[arg(long)]
    pub ratio: Option<RatioArg>,
}

pub async fn run(args: &InspectArgs) -> Result<()> {
    let file = FsLoader
        .load(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let bytes = file.len();

    let mut selection = FileSelection::new();
    let ticket = selection.begin(file.name.clone());
    let source = selection
        .complete(ticket, file)
        .context("File selection was superseded")?;

    let mut form = UploadForm::default();
    let mut session = CropSession::new(AutoFitFactory);
    session
        .open(source, &mut form)
        .with_context(|| format!("Cannot crop {}", args.file.display()))?;

    if let Some(ref ratio) = args.ratio {
        let ratio = ratio.resolve(&mut form)?;
        session.set_ratio(ratio, &mut form);
    }

    let (width, height) = session
        .widget()
        .map(|w| w.image_size())
        .unwrap_or_default();
    let mime = selection.pending().map(|f| f.mime.as_str()).unwrap_or_default();

    println!("File:        {}", args.file.display());
    println!("Type:        {}", mime);
    println!("Dimensions:  {}x{}", width, height);
    println!("Size:        {:.2} MB", bytes as f64 / (1024.0 * 1024.0));
    println!("{}", session.selector().display_text());

    if let Some(crop) = session.confirm(&mut form) {
        println!("Crop:        {}", crop);
    }
    if let Some(ratio) = form.target_ratio {
        println!("Target:      {:.4}", ratio);
    }

    Ok(())
}
